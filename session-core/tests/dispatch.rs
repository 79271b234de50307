//! HTTP-level tests of the dispatch layer against a mock server

use protocol_core::Payment;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use session_core::{Error, Session, SessionConfig};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> Session {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Session::with_config(SessionConfig::new("test-token").with_endpoint(server.uri())).unwrap()
}

#[tokio::test]
async fn requests_carry_bearer_and_accept_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/user"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user_id": "U1"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let user = session.user().await.unwrap().unwrap();
    assert_eq!(user.user_id, "U1");
}

#[tokio::test]
async fn void_call_succeeds_and_discards_any_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ignored": "payload"})))
        .mount(&server)
        .await;

    let session = session_for(&server);
    session.set_transactions_visited(None, true).await.unwrap();
}

#[tokio::test]
async fn lookup_404_is_absence_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/accounts/A1.5"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert!(session.account("A1.5").await.unwrap().is_none());
}

#[tokio::test]
async fn bad_request_surfaces_server_fields_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/sync"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "missing_parameter",
            "error_description": "Parameter state is missing"
        })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let error = session
        .trigger_sync(&Default::default())
        .await
        .unwrap_err();
    match error {
        Error::BadRequest { code, message } => {
            assert_eq!(code, "missing_parameter");
            assert_eq!(message, "Parameter state is missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_fixed_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/accounts"))
        .respond_with(ResponseTemplate::new(401).set_body_string("irrelevant body"))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let error = session.accounts().await.unwrap_err();
    assert!(matches!(error, Error::AccessDenied));
    assert_eq!(error.code(), "access_denied");
    assert_eq!(error.message(), Some("Access Denied"));
}

#[tokio::test]
async fn other_statuses_map_to_server_error_without_parsing_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/accounts"))
        .respond_with(
            ResponseTemplate::new(503).set_body_string("<html>maintenance page</html>"),
        )
        .mount(&server)
        .await;

    let session = session_for(&server);
    let error = session.accounts().await.unwrap_err();
    assert!(matches!(error, Error::ServerError));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn enveloped_list_unwraps_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [
                {"account_id": "A1.1", "name": "Giro"},
                {"account_id": "A1.2", "name": "Depot"}
            ]
        })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let accounts = session.accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].account_id, "A1.1");
    assert_eq!(accounts[1].account_id, "A1.2");
}

#[tokio::test]
async fn empty_envelope_and_empty_body_both_yield_empty_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payments": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/securities"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert!(session.payments(None).await.unwrap().is_empty());
    assert!(session.securities(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_payment_posts_to_the_owning_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/accounts/A1.2/payments"))
        .and(body_partial_json(json!({"name": "Alice", "amount": 47.11})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payment_id": "P1.1",
            "account_id": "A1.2",
            "name": "Alice",
            "amount": 47.11,
            "currency": "EUR"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let payment = Payment {
        payment_id: None,
        account_id: Some("A1.2".into()),
        payment_type: Some("Transfer".into()),
        name: Some("Alice".into()),
        account_number: Some("4711951501".into()),
        bank_code: Some("90090042".into()),
        bank_name: None,
        amount: Some(dec!(47.11)),
        currency: Some("EUR".into()),
        purpose: Some("Lunch".into()),
        submission_timestamp: None,
        creation_timestamp: None,
        modification_timestamp: None,
    };

    let created = session.add_payment(&payment).await.unwrap().unwrap();
    assert_eq!(created.payment_id.as_deref(), Some("P1.1"));
    assert_eq!(created.amount, Some(dec!(47.11)));
}

#[tokio::test]
async fn cancelled_request_delivers_nothing_while_others_complete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"unreachable": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let dispatcher = session.dispatcher();

    let slow = dispatcher.dispatch::<Value>(reqwest::Method::GET, "/rest/slow", None);
    let fast = dispatcher.dispatch::<Value>(reqwest::Method::GET, "/rest/fast", None);

    // Cancelling consumes the handle: neither success nor error can ever
    // be observed for the slow request.
    slow.cancel();

    let value = fast.wait().await.unwrap().unwrap();
    assert_eq!(value, json!({"ok": true}));
}

#[tokio::test]
async fn timeout_surfaces_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user_id": "U1"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = SessionConfig::new("test-token")
        .with_endpoint(server.uri())
        .with_timeout(Duration::from_millis(100));
    let session = Session::with_config(config).unwrap();

    let error = session.user().await.unwrap_err();
    assert!(matches!(error, Error::Transport(_)));
    assert!(error.is_retryable());
}
