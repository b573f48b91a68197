use propass_notify::{EmailSender, EmailSenderConfig, NotificationSender, TemplateKind};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn sender(server: &MockServer) -> EmailSender {
    EmailSender::new(EmailSenderConfig {
        api_key: "re_test_123".to_string(),
        api_base_url: server.uri(),
        from_address: "activate@propass.app".to_string(),
        app_base_url: "https://app.propass.app".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn accepted_email_returns_true() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "email_1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ok = sender(&server)
        .send("driver@example.com", "abc123", TemplateKind::Purchase)
        .await
        .unwrap();
    assert!(ok);
}

#[tokio::test]
async fn rejected_email_returns_false_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid recipient"))
        .mount(&server)
        .await;

    let ok = sender(&server)
        .send("not-an-address", "abc123", TemplateKind::Resend)
        .await
        .unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn body_carries_activation_link_and_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    sender(&server)
        .send("driver@example.com", "deadbeef", TemplateKind::Resend)
        .await
        .unwrap();

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["to"][0], "driver@example.com");
    assert!(body["html"]
        .as_str()
        .unwrap()
        .contains("https://app.propass.app/activate?token=deadbeef"));
}

#[test]
fn missing_api_key_rejected() {
    let result = EmailSender::new(EmailSenderConfig {
        api_key: String::new(),
        api_base_url: "https://api.resend.com".to_string(),
        from_address: "activate@propass.app".to_string(),
        app_base_url: "https://app.propass.app".to_string(),
    });
    assert!(result.is_err());
}
