#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Conversation loop tests with a scripted model and a mocked Sim API.

use async_trait::async_trait;
use serde_json::{json, Value};
use simchat_agent::{ChatRunner, LlmBackend, LlmClient, LlmResponse, ModelConfig};
use simchat_core::{Message, Role, SimchatError, SimchatResult, ToolCall};
use simchat_functions::{FunctionDescriptor, FunctionRegistry};
use simchat_session::Session;
use simchat_sim::{SimClient, SimConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replays canned responses and records the history it was shown.
struct ScriptedBackend {
    responses: Mutex<VecDeque<SimchatResult<LlmResponse>>>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<SimchatResult<LlmResponse>>) -> (Self, Arc<Mutex<Vec<Vec<Message>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let backend = Self {
            responses: Mutex::new(responses.into()),
            seen: Arc::clone(&seen),
        };
        (backend, seen)
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[FunctionDescriptor],
        max_tokens: u32,
    ) -> SimchatResult<LlmResponse> {
        assert_eq!(tools.len(), 7);
        assert_eq!(max_tokens, 1000);
        self.seen.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SimchatError::Agent("script exhausted".into())))
    }
}

fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.into(),
        name: name.into(),
        arguments,
    }
}

fn runner(server_uri: &str, backend: ScriptedBackend) -> ChatRunner {
    let client = SimClient::new(SimConfig {
        base_url: server_uri.to_string(),
        ..SimConfig::new("test-key")
    });
    ChatRunner::new(
        LlmClient::from_backend(Box::new(backend), 1000),
        Arc::new(FunctionRegistry::new(client)),
    )
}

fn session() -> Session {
    Session::new("s-1", "You are a blockchain assistant.", 20)
}

#[tokio::test]
async fn test_plain_reply_makes_one_model_call() {
    let server = MockServer::start().await;
    let (backend, seen) = ScriptedBackend::new(vec![Ok(LlmResponse::Done("Hello!".into()))]);
    let runner = runner(&server.uri(), backend);
    let mut session = session();

    let turn = runner.run(&mut session, "hi").await.unwrap();
    assert_eq!(turn.reply, "Hello!");
    assert!(turn.function_calls.is_empty());
    assert_eq!(seen.lock().unwrap().len(), 1);

    let roles: Vec<Role> = session.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::System, Role::User, Role::Assistant]);
}

#[tokio::test]
async fn test_function_call_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/evm/balances/0xd8da6bf26964af9d7eed9e03e53415d37aa96045"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balances": [
            {"symbol": "ETH", "amount": "1", "value_usd": 3000.0, "chain": "ethereum"}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let (backend, seen) = ScriptedBackend::new(vec![
        Ok(LlmResponse::ToolUse {
            content: None,
            tool_calls: vec![call(
                "call_1",
                "get_token_balances",
                json!({"address": "0xd8da6bf26964af9d7eed9e03e53415d37aa96045"}),
            )],
        }),
        Ok(LlmResponse::Done("You hold 1 ETH.".into())),
    ]);
    let runner = runner(&server.uri(), backend);
    let mut session = session();

    let turn = runner
        .run(&mut session, "What tokens does vitalik.eth hold?")
        .await
        .unwrap();

    assert_eq!(turn.reply, "You hold 1 ETH.");
    assert_eq!(turn.function_calls.len(), 1);
    assert_eq!(turn.function_calls[0].id, "call_1");
    assert_eq!(turn.function_calls[0].result["total_balances"], 1);

    let roles: Vec<Role> = session.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [
            Role::System,
            Role::User,
            Role::Assistant,
            Role::Tool,
            Role::Assistant
        ]
    );
    assert_eq!(session.messages[3].tool_call_id.as_deref(), Some("call_1"));

    // The second model request sees the tool result.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].last().unwrap().role, Role::Tool);
}

#[tokio::test]
async fn test_calls_run_in_order_and_failures_are_embedded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/evm/supported-chains"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (backend, _seen) = ScriptedBackend::new(vec![
        Ok(LlmResponse::ToolUse {
            content: Some("Let me check.".into()),
            tool_calls: vec![
                call("a", "get_supported_chains", json!({})),
                call("b", "get_everything", json!({})),
                call("c", "get_wallet_activity", json!({})),
            ],
        }),
        Ok(LlmResponse::Done("Something went wrong upstream.".into())),
    ]);
    let runner = runner(&server.uri(), backend);
    let mut session = session();

    let turn = runner.run(&mut session, "chains?").await.unwrap();
    let ids: Vec<&str> = turn.function_calls.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(
        turn.function_calls[0].result["error"],
        "API request failed: Internal Server Error"
    );
    assert_eq!(
        turn.function_calls[1].result["error"],
        "Unknown function: get_everything"
    );
    assert_eq!(
        turn.function_calls[2].result["error"],
        "Missing required parameter: address"
    );

    let tool_ids: Vec<&str> = session
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(tool_ids, ["a", "b", "c"]);
    assert_eq!(session.messages[2].content, "Let me check.");
}

#[tokio::test]
async fn test_second_tool_request_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/evm/supported-chains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chains": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (backend, seen) = ScriptedBackend::new(vec![
        Ok(LlmResponse::ToolUse {
            content: None,
            tool_calls: vec![call("a", "get_supported_chains", json!({}))],
        }),
        Ok(LlmResponse::ToolUse {
            content: Some("Here are the chains.".into()),
            tool_calls: vec![call("b", "get_supported_chains", json!({}))],
        }),
    ]);
    let runner = runner(&server.uri(), backend);
    let mut session = session();

    let turn = runner.run(&mut session, "chains?").await.unwrap();
    assert_eq!(turn.reply, "Here are the chains.");
    assert_eq!(turn.function_calls.len(), 1);
    assert_eq!(seen.lock().unwrap().len(), 2);

    let last = session.messages.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(!last.has_tool_calls());
}

#[tokio::test]
async fn test_model_error_propagates() {
    let server = MockServer::start().await;
    let (backend, _seen) =
        ScriptedBackend::new(vec![Err(SimchatError::Agent("model unavailable".into()))]);
    let runner = runner(&server.uri(), backend);
    let mut session = session();

    let err = runner.run(&mut session, "hi").await.unwrap_err();
    assert!(err.to_string().contains("model unavailable"));
    // The user message stays in history.
    assert_eq!(session.messages.last().unwrap().role, Role::User);
}

#[tokio::test]
async fn test_history_stays_capped_across_turns() {
    let server = MockServer::start().await;
    let responses = (0..15)
        .map(|i| Ok(LlmResponse::Done(format!("reply {i}"))))
        .collect();
    let (backend, _seen) = ScriptedBackend::new(responses);
    let runner = runner(&server.uri(), backend);
    let mut session = session();

    for i in 0..15 {
        runner.run(&mut session, &format!("msg {i}")).await.unwrap();
    }
    assert_eq!(session.messages.len(), 20);
    assert_eq!(session.messages[0].role, Role::System);
    assert_eq!(session.messages.last().unwrap().content, "reply 14");
}

#[tokio::test]
async fn test_many_calls_in_one_turn_keep_the_question_for_the_final_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/evm/supported-chains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chains": []})))
        .expect(4)
        .mount(&server)
        .await;

    let calls = ["a", "b", "c", "d"]
        .iter()
        .map(|id| call(id, "get_supported_chains", json!({})))
        .collect();
    let (backend, seen) = ScriptedBackend::new(vec![
        Ok(LlmResponse::ToolUse {
            content: None,
            tool_calls: calls,
        }),
        Ok(LlmResponse::Done("Four lookups done.".into())),
    ]);
    let runner = runner(&server.uri(), backend);
    let mut session = Session::new("s-1", "You are a blockchain assistant.", 5);

    let turn = runner.run(&mut session, "which chains?").await.unwrap();
    assert_eq!(turn.function_calls.len(), 4);

    // The final request carries the whole turn even though it exceeds the cap.
    let seen = seen.lock().unwrap();
    let final_request = &seen[1];
    assert_eq!(final_request.len(), 7);
    assert_eq!(final_request[1].role, Role::User);
    assert_eq!(final_request[1].content, "which chains?");
    assert_eq!(final_request.last().unwrap().tool_call_id.as_deref(), Some("d"));

    // Storing the turn evicts the tool group whole; nothing orphaned remains.
    let stored: Vec<(Role, &str)> = session
        .messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        stored,
        [
            (Role::System, "You are a blockchain assistant."),
            (Role::Assistant, "Four lookups done.")
        ]
    );
}

#[tokio::test]
async fn test_failed_final_call_leaves_no_partial_tool_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/evm/supported-chains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chains": []})))
        .mount(&server)
        .await;

    let (backend, _seen) = ScriptedBackend::new(vec![
        Ok(LlmResponse::ToolUse {
            content: None,
            tool_calls: vec![call("a", "get_supported_chains", json!({}))],
        }),
        Err(SimchatError::Agent("model unavailable".into())),
    ]);
    let runner = runner(&server.uri(), backend);
    let mut session = session();

    assert!(runner.run(&mut session, "chains?").await.is_err());
    let roles: Vec<Role> = session.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::System, Role::User]);
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_openai_backend_request_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1",
            "max_tokens": 1000,
            "tool_choice": "auto",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi there"}, "finish_reason": "stop"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ModelConfig {
        api_key: "sk-test".into(),
        api_base_url: Some(server.uri()),
        ..ModelConfig::default()
    };
    let registry = FunctionRegistry::new(SimClient::new(SimConfig::new("k")));
    let runner = ChatRunner::new(LlmClient::new(config), Arc::new(registry));

    let mut session = session();
    let turn = runner.run(&mut session, "hello").await.unwrap();
    assert_eq!(turn.reply, "Hi there");
}

#[tokio::test]
async fn test_openai_backend_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let config = ModelConfig {
        api_base_url: Some(server.uri()),
        ..ModelConfig::default()
    };
    let registry = FunctionRegistry::new(SimClient::new(SimConfig::new("k")));
    let runner = ChatRunner::new(LlmClient::new(config), Arc::new(registry));

    let err = runner.run(&mut session(), "hello").await.unwrap_err();
    assert!(matches!(err, SimchatError::Agent(_)));
    assert!(err.to_string().contains("401"));
}

#[test]
fn test_model_config_from_toml() {
    let config: ModelConfig = toml::from_str(
        r#"
        provider = "groq"
        model_id = "llama-3.3-70b-versatile"
        temperature = 0.2
        "#,
    )
    .unwrap();
    assert_eq!(config.base_url(), "https://api.groq.com/openai");
    assert_eq!(config.max_tokens, 1000);
    assert_eq!(config.temperature, Some(0.2));
}

#[tokio::test]
async fn test_sim_query_from_model_arguments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/evm/collectibles/0xabc"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"collectibles": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (backend, _seen) = ScriptedBackend::new(vec![
        Ok(LlmResponse::ToolUse {
            content: None,
            tool_calls: vec![call("n", "get_nft_collectibles", json!({"address": "0xabc"}))],
        }),
        Ok(LlmResponse::Done("No NFTs.".into())),
    ]);
    let runner = runner(&server.uri(), backend);
    let turn = runner.run(&mut session(), "nfts?").await.unwrap();
    assert_eq!(turn.function_calls[0].arguments, json!({"address": "0xabc"}));
}
