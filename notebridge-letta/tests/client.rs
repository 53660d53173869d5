use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notebridge_core::{AgentBackend, GatewayError};
use notebridge_letta::{LettaClient, LettaConfig};

fn client(server: &MockServer) -> LettaClient {
    let config = LettaConfig::new(SecretString::new("test-key".to_string()))
        .api_base(server.uri())
        .project("lab")
        .template_version("clever-jade-worm:latest");
    LettaClient::new(config).unwrap()
}

#[tokio::test]
async fn create_agent_posts_to_template_and_reads_agents_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/templates/lab/clever-jade-worm:latest/agents"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"agents": [{"id": "agent-42"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.can_create_agents());
    let agent_id = client.create_agent(Some("nb-1")).await.unwrap();
    assert_eq!(agent_id, "agent-42");
}

#[tokio::test]
async fn create_agent_falls_back_to_location_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/templates/lab/clever-jade-worm:latest/agents"))
        .respond_with(
            ResponseTemplate::new(201).insert_header("Location", "/v1/agents/agent-from-header/"),
        )
        .mount(&server)
        .await;

    let agent_id = client(&server).create_agent(None).await.unwrap();
    assert_eq!(agent_id, "agent-from-header");
}

#[tokio::test]
async fn create_agent_without_any_id_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .mount(&server)
        .await;

    let err = client(&server).create_agent(None).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(message) if message.contains("no agent id")));
}

#[tokio::test]
async fn create_agent_without_template_is_unconfigured() {
    let config = LettaConfig::new(SecretString::new("test-key".to_string()));
    let client = LettaClient::new(config).unwrap();

    assert!(client.is_configured());
    assert!(!client.can_create_agents());
    let err = client.create_agent(None).await.unwrap_err();
    assert!(matches!(err, GatewayError::Unconfigured));
}

#[tokio::test]
async fn missing_api_key_is_unconfigured() {
    let client = LettaClient::new(LettaConfig::default()).unwrap();

    assert!(!client.is_configured());
    let err = client.send_message("agent-1", "hello").await.unwrap_err();
    assert!(matches!(err, GatewayError::Unconfigured));
}

#[tokio::test]
async fn send_message_returns_assistant_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/agents/agent-7/messages"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "NOTEBOOK:\n{}"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {"message_type": "reasoning_message", "reasoning": "thinking"},
                {"message_type": "assistant_message", "content": "{\"confidence\": 0.5}"}
            ],
            "usage": {"total_tokens": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .send_message("agent-7", "NOTEBOOK:\n{}")
        .await
        .unwrap();
    assert_eq!(reply, "{\"confidence\": 0.5}");
}

#[tokio::test]
async fn send_message_joins_content_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/agents/agent-7/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {"message_type": "assistant_message", "content": [
                    {"type": "text", "text": "{\"a\": "},
                    {"type": "text", "text": "1}"}
                ]},
                {"message_type": "assistant_message", "content": "done"}
            ]
        })))
        .mount(&server)
        .await;

    let reply = client(&server).send_message("agent-7", "hi").await.unwrap();
    assert_eq!(reply, "{\"a\": 1}\ndone");
}

#[tokio::test]
async fn reply_without_assistant_message_is_unparseable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{"message_type": "tool_call_message", "tool_call": {}}]
        })))
        .mount(&server)
        .await;

    let err = client(&server).send_message("agent-7", "hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::Unparseable(_)));
}

#[tokio::test]
async fn maps_api_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/agents/agent-7/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("agent crashed"))
        .mount(&server)
        .await;

    let err = client(&server).send_message("agent-7", "hi").await.unwrap_err();
    match err {
        GatewayError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "agent crashed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_platform_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"messages": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = LettaConfig::new(SecretString::new("test-key".to_string()))
        .api_base(server.uri())
        .timeout(Duration::from_millis(50));
    let client = LettaClient::new(config).unwrap();

    let err = client.send_message("agent-7", "hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(duration) if duration == Duration::from_millis(50)));
}
