//! HTTP email dispatcher tests against a mock email function.

use leasehold_core::dispatch::{EmailDispatcher, EmailMessage};
use leasehold_core::error::LeaseholdError;
use leasehold_mail::{HttpEmailDispatcher, MailConfig};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message() -> EmailMessage {
    EmailMessage {
        to: "jane@x.com".into(),
        subject: "You're invited".into(),
        html: "<p>hi</p>".into(),
    }
}

fn config(server: &MockServer, api_key: Option<&str>) -> MailConfig {
    MailConfig {
        function_url: format!("{}/functions/v1/send-email", server.uri()),
        api_key: api_key.map(Into::into),
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn posts_message_as_json_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/send-email"))
        .and(header("authorization", "Bearer service-key"))
        .and(body_json(serde_json::json!({
            "to": "jane@x.com",
            "subject": "You're invited",
            "html": "<p>hi</p>",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = HttpEmailDispatcher::new(&config(&server, Some("service-key"))).unwrap();
    dispatcher.send(message()).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_a_delivery_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let dispatcher = HttpEmailDispatcher::new(&config(&server, None)).unwrap();
    let err = dispatcher.send(message()).await.unwrap_err();

    match err {
        LeaseholdError::EmailDelivery(msg) => {
            assert!(msg.contains("502"));
            assert!(msg.contains("upstream down"));
        }
        other => panic!("expected EmailDelivery, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_function_is_a_delivery_error() {
    let dispatcher = HttpEmailDispatcher::new(&MailConfig {
        function_url: "http://127.0.0.1:9/send-email".into(),
        api_key: None,
        timeout_secs: 1,
    })
    .unwrap();

    let err = dispatcher.send(message()).await.unwrap_err();
    assert!(matches!(err, LeaseholdError::EmailDelivery(_)));
}

#[test]
fn malformed_function_url_is_rejected() {
    let result = HttpEmailDispatcher::new(&MailConfig {
        function_url: "::not a url::".into(),
        ..MailConfig::default()
    });
    assert!(result.is_err());
}
