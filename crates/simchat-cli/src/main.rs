mod config;

use clap::{Parser, Subcommand};
use config::SimchatConfig;
use simchat_agent::{ChatRunner, LlmClient};
use simchat_functions::FunctionRegistry;
use simchat_gateway::GatewayServer;
use simchat_session::SessionStore;
use simchat_sim::{load_wallet, SimClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simchat", about = "Chat and wallet front ends for the Sim blockchain API")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "simchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Inspect the model-callable functions
    Functions {
        #[command(subcommand)]
        action: FunctionsAction,
    },
    /// Print the wallet dashboard for an address as JSON
    Wallet {
        address: String,
        #[arg(long, default_value = "tokens")]
        tab: String,
    },
}

#[derive(Subcommand)]
enum FunctionsAction {
    /// List registered functions
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "Failed to load .env");
        }
    }

    let mut config = SimchatConfig::load(&cli.config)?;
    config.apply_env(|name| std::env::var(name).ok());

    match cli.command {
        Commands::Serve { host, port } => {
            config.require_sim_key()?;
            if config.model.api_key.is_empty() {
                warn!("{} is not set; model requests will be rejected", config::MODEL_KEY_ENV);
            }
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            let sim = SimClient::new(config.sim);
            let registry = Arc::new(FunctionRegistry::new(sim.clone()));
            let runner = Arc::new(ChatRunner::new(LlmClient::new(config.model), registry));

            let sessions = SessionStore::new(config.session);
            let sweeper = sessions.spawn_sweeper();

            let app = GatewayServer::build(runner, sessions, sim);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("simchat listening on {addr}");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            sweeper.abort();
            info!("simchat stopped");
        }
        Commands::Functions { action } => match action {
            FunctionsAction::List => {
                let registry = FunctionRegistry::new(SimClient::new(config.sim));
                println!("Registered functions:");
                for f in registry.descriptors() {
                    println!("  {} — {}", f.name, f.description);
                    let schema = registry.schema_for(&f.name).map(|s| &s.params[..]);
                    for p in schema.unwrap_or_default() {
                        let required = if p.required { " (required)" } else { "" };
                        match &p.default {
                            Some(default) => println!(
                                "    {}: {}{required}, default {default}",
                                p.name,
                                p.kind.json_name()
                            ),
                            None => println!("    {}: {}{required}", p.name, p.kind.json_name()),
                        }
                    }
                }
                println!("\nTotal: {} function(s)", registry.function_count());
            }
        },
        Commands::Wallet { address, tab } => {
            config.require_sim_key()?;
            let view = load_wallet(&SimClient::new(config.sim), &address, &tab).await;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
