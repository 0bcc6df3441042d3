use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use upchat_core::relay::{ChatRelay, RelayError};
use upchat_interaction::HttpRelayClient;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpRelayClient {
    HttpRelayClient::new(format!("{}/chat", server.uri()))
}

#[tokio::test]
async fn test_reply_and_intent_are_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({
            "message": "ค่าเทอมเท่าไหร่",
            "userId": "1700000000123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "ค่าเทอม 15,000 บาทค่ะ",
            "intent": "tuition_fee"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .send("ค่าเทอมเท่าไหร่", 1_700_000_000_123, &CancellationToken::new())
        .await
        .expect("relay should answer");

    assert_eq!(reply.text, "ค่าเทอม 15,000 บาทค่ะ");
    assert_eq!(reply.intent, "tuition_fee");
}

#[tokio::test]
async fn test_non_2xx_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Error connecting to Dialogflow"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send("hello", 1, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RelayError::Status {
            status: 500,
            body: "Error connecting to Dialogflow".to_string()
        }
    );
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send("hello", 1, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_relay_is_transport_error() {
    let client = HttpRelayClient::new("http://127.0.0.1:1/chat");
    let err = client
        .send("hello", 1, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_cancellation_returns_before_slow_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "text": "late", "intent": "x" }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = client.send("hello", 1, &token).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_already_cancelled_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let err = client_for(&server).send("hello", 1, &token).await.unwrap_err();
    assert_eq!(err, RelayError::Cancelled);
}
