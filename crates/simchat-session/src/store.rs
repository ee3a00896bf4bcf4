use crate::config::SessionConfig;
use crate::session::Session;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Process-wide map from session id to conversation state.
///
/// Built once at startup and shared as `Arc<SessionStore>`. Nothing is
/// persisted: a restart loses every session. Each session sits behind its
/// own mutex, so two requests naming the same id run their turns one after
/// the other instead of interleaving history writes.
pub struct SessionStore {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the session for `id`, creating it seeded with the system
    /// prompt if it does not exist yet. Refreshes its last-activity time.
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        self.get_or_create_at(id, Utc::now()).await
    }

    /// [`get_or_create`](Self::get_or_create) with an explicit clock reading.
    pub async fn get_or_create_at(&self, id: &str, now: DateTime<Utc>) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                info!(session_id = %id, "Creating session");
                Arc::new(Mutex::new(Session::new(
                    id,
                    &self.config.system_prompt,
                    self.config.max_messages,
                )))
            })
            .clone();
        // A held lock means a turn is running; its pushes refresh the clock.
        if let Ok(mut guard) = session.try_lock() {
            guard.touch(now);
        }
        session
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Removes every session idle for longer than the configured TTL.
    /// Sessions locked by an in-flight turn are kept. Returns how many were
    /// removed.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    /// [`sweep`](Self::sweep) with an explicit clock reading.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::seconds(self.config.idle_ttl_secs as i64);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => now.signed_duration_since(guard.last_activity()) <= ttl,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Swept idle sessions");
        } else {
            debug!(remaining = sessions.len(), "Session sweep found nothing idle");
        }
        removed
    }

    /// Spawns the periodic sweep. The task lives as long as the runtime.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let period = self.config.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                store.sweep().await;
            }
        })
    }
}
