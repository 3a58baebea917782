//! Chat client behaviour against a mocked `/chat` endpoint

use std::time::Duration;

use serde_json::json;
use shopchat::client::ChatClient;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

fn client_for(server: &MockServer) -> ChatClient {
    ChatClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_sequential_sends_keep_submission_order() {
    let server = MockServer::start().await;
    // The first reply is the slow one
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({"message": "first"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"botMessage": "reply one"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({"message": "second"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"botMessage": "reply two"}))
                .set_delay(Duration::from_millis(10)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.send("first").await.unwrap();
    client.send("second").await.unwrap();

    let turns = client.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].user, "first");
    assert_eq!(turns[0].assistant, "reply one");
    assert_eq!(turns[1].user, "second");
    assert_eq!(turns[1].assistant, "reply two");
}

#[tokio::test]
async fn test_context_flag_follows_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({"message": "hello", "context": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"botMessage": "hi"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({"message": "and boots?", "context": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"botMessage": "yes"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    assert!(!client.transcript().has_prior_context());

    let turn = client.send("hello").await.unwrap();
    assert_eq!(turn.assistant, "hi");
    assert!(client.transcript().has_prior_context());

    client.send("and boots?").await.unwrap();
    assert_eq!(client.transcript().len(), 2);
}

#[tokio::test]
async fn test_empty_message_is_sent_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({"message": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"botMessage": "How can I help?"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let turn = client.send("").await.unwrap();
    assert_eq!(turn.user, "");
    assert_eq!(turn.assistant, "How can I help?");
}

#[tokio::test]
async fn test_server_error_leaves_transcript_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"error": "Embedding service unavailable"})))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.send("hello").await.unwrap_err();

    assert!(err.to_string().contains("502"));
    assert!(client.transcript().is_empty());
    assert!(!client.transcript().has_prior_context());
}

#[tokio::test]
async fn test_rendered_transcript_is_escaped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"botMessage": "<b>Boots</b> & more"})),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.send("<script>alert(1)</script>").await.unwrap();

    let html = client.transcript().render_html();
    assert!(!html.contains("<script>"));
    assert!(!html.contains("<b>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("&lt;b&gt;Boots&lt;/b&gt; &amp; more"));
}
