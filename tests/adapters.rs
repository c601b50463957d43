//! Tool and chat-model adapter tests using wiremock mock server.

use std::time::Duration;

use opencode_client::{
    AssistantTool, ChatMessage, ChatModel, Client, Config, Error, ModelSelector, ToolSpec,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for_server(server: &MockServer) -> Client {
    Client::new(Config {
        base_url: Some(server.uri()),
        ..Default::default()
    })
    .expect("client creation should succeed")
}

#[tokio::test]
async fn assistant_tool_returns_trimmed_reply_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/s1/message"))
        .and(body_json(json!({
            "parts": [{ "type": "text", "text": "2+2?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parts": [{ "type": "text", "text": "  4\n" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = AssistantTool::new(client_for_server(&server)).with_session("s1");
    let reply = tool.call("2+2?").await.expect("call should succeed");
    assert_eq!(reply, "4");
}

#[tokio::test]
async fn assistant_tool_runs_in_an_ephemeral_session_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "tmp1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/tmp1/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parts": [{ "type": "text", "text": "done" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/session/tmp1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tool = AssistantTool::new(client_for_server(&server))
        .with_name("helper")
        .with_model(ModelSelector::new("anthropic", "claude-sonnet-4"));
    let reply = tool.call("go").await.expect("call should succeed");
    assert_eq!(reply, "done");
}

#[tokio::test]
async fn chat_completion_renders_the_transcript_into_one_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/s1/message"))
        .and(body_json(json!({
            "parts": [{
                "type": "text",
                "text": "System: Be terse.\n\nUser: hello"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parts": [{ "type": "text", "text": "hi" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = ChatModel::new(client_for_server(&server)).with_session("s1");
    let completion = model
        .complete(&[ChatMessage::system("Be terse."), ChatMessage::user("hello")])
        .await
        .expect("completion should succeed");
    assert_eq!(completion.content, "hi");
    assert!(completion.tool_calls.is_empty());
}

#[tokio::test]
async fn chat_completion_parses_tool_calls_from_the_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/s1/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parts": [{
                "type": "text",
                "text": "On it: {\"tool\": \"search\", \"args\": {\"query\": \"rust\"}}"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = ChatModel::new(client_for_server(&server)).with_session("s1");
    let completion = model
        .complete(&[ChatMessage::user("find rust docs")])
        .await
        .expect("completion should succeed");
    assert_eq!(completion.tool_calls.len(), 1);
    assert_eq!(completion.tool_calls[0].tool, "search");
    assert_eq!(completion.tool_calls[0].args, json!({ "query": "rust" }));
}

#[tokio::test]
async fn chat_completion_sends_bound_tools_as_a_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/s1/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parts": [{ "type": "text", "text": "ok" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = ChatModel::new(client_for_server(&server))
        .with_session("s1")
        .with_tools(vec![ToolSpec {
            name: "search".into(),
            description: "Web search".into(),
            parameters: json!({ "type": "object" }),
        }]);
    model
        .complete(&[ChatMessage::user("hello")])
        .await
        .expect("completion should succeed");

    let requests = server
        .received_requests()
        .await
        .expect("should be able to read received requests");
    let body: serde_json::Value =
        serde_json::from_slice(&requests[0].body).expect("body should be json");
    let system = body["system"].as_str().expect("system should be set");
    assert!(system.contains("- search: Web search"));
    assert!(system.contains(r#"{"tool": "<name>", "args": {...}}"#));
}

#[tokio::test]
async fn chat_completion_times_out_client_side() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/s1/message"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "parts": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let model = ChatModel::new(client_for_server(&server))
        .with_session("s1")
        .with_timeout(Duration::from_millis(50));
    let err = model
        .complete(&[ChatMessage::user("slow")])
        .await
        .expect_err("slow reply should time out");
    match err {
        Error::Timeout(duration) => assert_eq!(duration, Duration::from_millis(50)),
        other => panic!("expected timeout error, got {:?}", other),
    }
}
