use colloquy_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAICompatibleClient};
use mockito::Matcher;
use serde_json::json;

fn request() -> ChatRequest {
    ChatRequest::new(
        "llama-32-8b-instruct",
        vec![Message::system("Be brief."), Message::user("Hi")],
    )
}

#[test]
fn test_builder_requires_base_url() {
    let result = OpenAICompatibleClient::builder().api_key("k").build();

    assert!(result.is_err());
    assert!(result.err().unwrap().to_string().contains("Base URL"));
}

#[tokio::test]
async fn test_chat_returns_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama-32-8b-instruct",
            "stream": false,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hi"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"},
                    {"index": 1, "message": {"role": "assistant", "content": "Ignored"}, "finish_reason": "stop"}
                ],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAICompatibleClient::new(server.url()).unwrap();
    let response = client.chat(request()).await.unwrap();

    assert_eq!(response.content, "Hello!");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 15);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_sends_bearer_token_and_options() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::PartialJson(json!({"temperature": 0.25, "max_tokens": 32})))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
        .create_async()
        .await;

    let client = OpenAICompatibleClient::builder()
        .base_url(format!("{}/", server.url()))
        .api_key("secret")
        .build()
        .unwrap();
    let options = ChatOptions::new().temperature(0.25).max_tokens(32);
    let response = client.chat(request().with_options(options)).await.unwrap();

    assert_eq!(response.content, "ok");
    assert!(response.usage.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_fails_on_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("model loading")
        .create_async()
        .await;

    let client = OpenAICompatibleClient::new(server.url()).unwrap();
    let err = client.chat(request()).await.unwrap_err().to_string();

    assert!(err.contains("503"));
    assert!(err.contains("model loading"));
}

#[tokio::test]
async fn test_chat_fails_on_empty_choices() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let client = OpenAICompatibleClient::new(server.url()).unwrap();
    let err = client.chat(request()).await.unwrap_err().to_string();

    assert!(err.contains("no choices"));
}

#[tokio::test]
async fn test_chat_fails_on_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let client = OpenAICompatibleClient::new(server.url()).unwrap();

    assert!(client.chat(request()).await.is_err());
}

#[tokio::test]
async fn test_chat_fails_when_content_missing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
        .create_async()
        .await;

    let client = OpenAICompatibleClient::new(server.url()).unwrap();
    let err = client.chat(request()).await.unwrap_err().to_string();

    assert!(err.contains("without content"));
}

#[tokio::test]
async fn test_chat_fails_when_server_unreachable() {
    // Port 9 (discard) is not expected to serve HTTP.
    let client = OpenAICompatibleClient::new("http://127.0.0.1:9").unwrap();

    assert!(client.chat(request()).await.is_err());
}
