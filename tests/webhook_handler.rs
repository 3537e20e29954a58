use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
};
use serde_json::json;

use calculo_certo::handlers::webhook::receive_webhook;
use calculo_certo::services::webhook_worker::PaymentNotification;

mod support;

const SECRET: &str = "test-secret";
// HMAC-SHA256("test-secret", "id:987654;request-id:req-42;ts:1700000000;")
const DIGEST: &str = "03ae3416636678303bdb3d6fb0bbe5ee8b879fa20387d5104baff1c41c2f2a79";

fn payment_body(id: serde_json::Value) -> Bytes {
    Bytes::from(
        json!({ "type": "payment", "action": "payment.updated", "data": { "id": id } }).to_string(),
    )
}

fn signed_headers(v1: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-signature",
        HeaderValue::from_str(&format!("ts=1700000000,v1={v1}")).unwrap(),
    );
    headers.insert("x-request-id", HeaderValue::from_static("req-42"));
    headers
}

#[tokio::test]
async fn valid_signature_acks_and_enqueues_payment() {
    let (state, mut rx) = support::build_state(Some(SECRET), Arc::new(support::FakeGateway::default()));

    let response = receive_webhook(State(state), signed_headers(DIGEST), payment_body(json!(987654))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        rx.try_recv().expect("notificação na fila"),
        PaymentNotification {
            payment_id: "987654".into(),
            request_id: Some("req-42".into()),
        }
    );
}

#[tokio::test]
async fn string_id_signs_the_same_manifest() {
    let (state, mut rx) = support::build_state(Some(SECRET), Arc::new(support::FakeGateway::default()));

    let response = receive_webhook(State(state), signed_headers(DIGEST), payment_body(json!("987654"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(rx.try_recv().unwrap().payment_id, "987654");
}

#[tokio::test]
async fn tampered_signature_is_rejected_without_side_effects() {
    let (state, mut rx) = support::build_state(Some(SECRET), Arc::new(support::FakeGateway::default()));

    let mut tampered = DIGEST.to_string();
    tampered.replace_range(0..1, "1");

    let response = receive_webhook(State(state), signed_headers(&tampered), payment_body(json!(987654))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(support::body_json(response).await, json!({ "error": "Invalid signature" }));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn different_payment_id_breaks_the_signature() {
    let (state, mut rx) = support::build_state(Some(SECRET), Arc::new(support::FakeGateway::default()));

    let response = receive_webhook(State(state), signed_headers(DIGEST), payment_body(json!(987655))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn missing_signature_header_is_rejected_when_secret_is_set() {
    let (state, mut rx) = support::build_state(Some(SECRET), Arc::new(support::FakeGateway::default()));

    let response = receive_webhook(State(state), HeaderMap::new(), payment_body(json!(987654))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn without_secret_verification_is_skipped() {
    let (state, mut rx) = support::build_state(None, Arc::new(support::FakeGateway::default()));

    let response = receive_webhook(State(state), HeaderMap::new(), payment_body(json!(42))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let job = rx.try_recv().unwrap();
    assert_eq!(job.payment_id, "42");
    assert_eq!(job.request_id, None);
}

#[tokio::test]
async fn non_payment_notifications_are_acked_and_ignored() {
    let (state, mut rx) = support::build_state(None, Arc::new(support::FakeGateway::default()));

    let body = Bytes::from(json!({ "type": "merchant_order", "data": { "id": "77" } }).to_string());
    let response = receive_webhook(State(state), HeaderMap::new(), body).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unparsable_body_is_acked() {
    let (state, mut rx) = support::build_state(None, Arc::new(support::FakeGateway::default()));

    let response = receive_webhook(State(state), HeaderMap::new(), Bytes::from_static(b"not json")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn payment_without_id_is_acked_and_ignored() {
    let (state, mut rx) = support::build_state(None, Arc::new(support::FakeGateway::default()));

    let body = Bytes::from(json!({ "type": "payment", "data": {} }).to_string());
    let response = receive_webhook(State(state), HeaderMap::new(), body).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn full_queue_still_acks() {
    let (state, mut rx) = support::build_state(None, Arc::new(support::FakeGateway::default()));

    // Enche a fila sem consumir
    while state
        .notifications
        .try_send(PaymentNotification {
            payment_id: "1".into(),
            request_id: None,
        })
        .is_ok()
    {}

    let response = receive_webhook(State(state), HeaderMap::new(), payment_body(json!(2))).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Só as notificações de preenchimento estão na fila
    while let Ok(job) = rx.try_recv() {
        assert_eq!(job.payment_id, "1");
    }
}
