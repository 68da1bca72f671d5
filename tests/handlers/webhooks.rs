#[path = "../common/mod.rs"]
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use tower::ServiceExt;

fn webhook_request(payload: &[u8], signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(payload.to_vec())).unwrap()
}

async fn deliver(state: &AppState, payload: &[u8]) -> (StatusCode, String) {
    let signature = stripe_signature_header(payload);
    let response = app(state)
        .oneshot(webhook_request(payload, Some(&signature)))
        .await
        .unwrap();
    let status = response.status();
    (status, body_text(response).await)
}

fn order(state: &AppState, session_id: &str) -> Order {
    state
        .backend()
        .get_order_by_session(session_id)
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_completed_marks_order_paid() {
    for state in [create_test_app_state(), create_memory_app_state()] {
        create_pending_order(&state.backend(), "cs_test_paid");

        let payload = session_event("checkout.session.completed", "cs_test_paid", Some("a@b.co"));
        let (status, body) = deliver(&state, &payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
        let order = order(&state, "cs_test_paid");
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.customer_email.as_deref(), Some("a@b.co"));
    }
}

#[tokio::test]
async fn test_failure_events_mark_order_failed() {
    for event_type in [
        "checkout.session.async_payment_failed",
        "checkout.session.expired",
    ] {
        let state = create_test_app_state();
        create_pending_order(&state.backend(), "cs_test_failed");

        let (status, _) = deliver(&state, &session_event(event_type, "cs_test_failed", None)).await;

        assert_eq!(status, StatusCode::OK, "{}", event_type);
        assert_eq!(order(&state, "cs_test_failed").status, OrderStatus::Failed);
    }
}

#[tokio::test]
async fn test_async_success_marks_order_paid() {
    let state = create_memory_app_state();
    create_pending_order(&state.backend(), "cs_test_async");

    let payload = session_event("checkout.session.async_payment_succeeded", "cs_test_async", None);
    let (status, _) = deliver(&state, &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(order(&state, "cs_test_async").status, OrderStatus::Paid);
}

#[tokio::test]
async fn test_redelivery_is_idempotent() {
    let state = create_test_app_state();
    create_pending_order(&state.backend(), "cs_test_dup");
    let payload = session_event("checkout.session.completed", "cs_test_dup", Some("a@b.co"));

    deliver(&state, &payload).await;
    let first = order(&state, "cs_test_dup");
    let (status, _) = deliver(&state, &payload).await;
    let second = order(&state, "cs_test_dup");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second.status, OrderStatus::Paid);
    assert_eq!(second.customer_email, first.customer_email);
    assert_eq!(second.items, first.items);
    assert_eq!(second.amount_total, first.amount_total);
}

#[tokio::test]
async fn test_terminal_order_is_not_regressed() {
    let state = create_test_app_state();
    create_pending_order(&state.backend(), "cs_test_terminal");

    deliver(
        &state,
        &session_event("checkout.session.completed", "cs_test_terminal", None),
    )
    .await;
    let (status, _) = deliver(
        &state,
        &session_event("checkout.session.expired", "cs_test_terminal", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "acknowledged so the provider stops retrying");
    assert_eq!(order(&state, "cs_test_terminal").status, OrderStatus::Paid);
}

#[tokio::test]
async fn test_unknown_session_is_noop() {
    let state = create_test_app_state();

    let payload = session_event("checkout.session.completed", "cs_test_unknown", None);
    let (status, body) = deliver(&state, &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert!(state.backend().list_orders().unwrap().is_empty());
}

#[tokio::test]
async fn test_unrelated_event_is_ignored() {
    let state = create_test_app_state();
    create_pending_order(&state.backend(), "cs_test_other");

    let payload = br#"{"id":"evt_1","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
    let (status, body) = deliver(&state, payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert_eq!(order(&state, "cs_test_other").status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let state = create_test_app_state();
    create_pending_order(&state.backend(), "cs_test_nosig");

    let payload = session_event("checkout.session.completed", "cs_test_nosig", None);
    let response = app(&state)
        .oneshot(webhook_request(&payload, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(order(&state, "cs_test_nosig").status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_invalid_signature_never_mutates() {
    for state in [create_test_app_state(), create_memory_app_state()] {
        create_pending_order(&state.backend(), "cs_test_forged");

        let payload = session_event("checkout.session.completed", "cs_test_forged", Some("x@y.z"));
        let timestamp = current_timestamp();
        let forged = format!(
            "t={},v1={}",
            timestamp,
            compute_stripe_signature(&payload, "wrong_secret", &timestamp)
        );

        let response = app(&state)
            .oneshot(webhook_request(&payload, Some(&forged)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Signature verification failed");

        let order = order(&state, "cs_test_forged");
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.customer_email.is_none());
    }
}

#[tokio::test]
async fn test_malformed_signature_header_is_rejected() {
    let state = create_test_app_state();
    let payload = session_event("checkout.session.completed", "cs_test_x", None);

    let response = app(&state)
        .oneshot(webhook_request(&payload, Some("garbage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Signature verification failed");
}

#[tokio::test]
async fn test_signed_but_invalid_json_is_bad_request() {
    let state = create_test_app_state();
    let (status, body) = deliver(&state, b"not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid JSON");
}

#[tokio::test]
async fn test_unconfigured_webhook_secret() {
    let mut state = create_test_app_state();
    state.stripe.webhook_secret = None;

    let payload = session_event("checkout.session.completed", "cs_test_cfg", None);
    let response = app(&state)
        .oneshot(webhook_request(&payload, Some("t=1,v1=abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Stripe webhook is not configured");
}
