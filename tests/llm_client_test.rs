use newsreel::llm::{extract_json, ChatCompletionsClient, LlmClient, LlmClientConfig};

fn client_for(server: &mockito::Server, timeout_seconds: u64) -> ChatCompletionsClient {
    ChatCompletionsClient::new(LlmClientConfig {
        endpoint: server.url(),
        temperature: 0.7,
        max_tokens: 256,
        timeout_seconds,
    })
}

#[tokio::test]
async fn generate_returns_message_content() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "model": "mistral:instruct",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "This is a test response"
                    },
                    "finish_reason": "stop"
                }],
                "usage": {
                    "prompt_tokens": 10,
                    "completion_tokens": 5,
                    "total_tokens": 15
                }
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server, 10);
    let result = client.generate("mistral:instruct", "Test prompt").await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap(), "This is a test response");

    mock.assert_async().await;
}

#[tokio::test]
async fn api_error_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body(r#"{"error": "model not loaded"}"#)
        .create_async()
        .await;

    let client = client_for(&server, 10);
    let result = client.generate("mistral:instruct", "Test").await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("500"));

    mock.assert_async().await;
}

#[tokio::test]
async fn response_without_choices_is_an_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model": "mistral:instruct", "choices": []}"#)
        .create_async()
        .await;

    let client = client_for(&server, 10);
    let result = client.generate("mistral:instruct", "Test").await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("no choices"));
}

#[tokio::test]
async fn slow_response_times_out() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(b"too late")
        })
        .create_async()
        .await;

    let client = client_for(&server, 1);
    let result = client.generate("mistral:instruct", "Test").await;

    // The bounded timeout turns the stalled call into a stage-level error
    assert!(result.is_err());
}

#[test]
fn extract_json_handles_fenced_blocks() {
    let text = "Here you go:\n```json\n{\"is_relevant\": true}\n```\nHope that helps.";
    assert_eq!(
        extract_json(text).as_deref(),
        Some(r#"{"is_relevant": true}"#)
    );
}

#[test]
fn extract_json_handles_bare_braces_with_preamble() {
    let text = "Sure! {\"summary\": \"short\"} -- done";
    assert_eq!(
        extract_json(text).as_deref(),
        Some(r#"{"summary": "short"}"#)
    );
}

#[test]
fn extract_json_returns_none_without_json() {
    assert!(extract_json("no structured output here").is_none());
}
