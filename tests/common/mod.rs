//! Test utilities and fixtures for Pricewar integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde_json::Value;

pub use pricewar::config::StripeSettings;
pub use pricewar::db::{AppState, DbPool, init_db, queries};
pub use pricewar::models::*;
pub use pricewar::store::{Backend, MemoryStore, Repository};

pub const ADMIN_TOKEN: &str = "admin-test-token";
pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const BASE_URL: &str = "http://localhost:4000";

/// Single-connection in-memory pool, so every checkout sees the same database.
pub fn create_test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }
    pool
}

fn test_stripe_settings() -> StripeSettings {
    StripeSettings {
        secret_key: Some("sk_test_xxx".to_string()),
        webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        ..StripeSettings::default()
    }
}

/// App state backed by SQLite.
pub fn create_test_app_state() -> AppState {
    AppState {
        db: Some(create_test_pool()),
        memory: Arc::new(MemoryStore::new()),
        base_url: BASE_URL.to_string(),
        stripe: test_stripe_settings(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        http_client: reqwest::Client::new(),
    }
}

/// App state with no database configured, so the memory store is live.
pub fn create_memory_app_state() -> AppState {
    AppState {
        db: None,
        ..create_test_app_state()
    }
}

/// Both backends, for tests that must hold regardless of storage.
pub fn all_backends() -> Vec<(&'static str, Backend)> {
    vec![
        ("sqlite", Backend::Sqlite(create_test_pool())),
        ("memory", Backend::Memory(Arc::new(MemoryStore::new()))),
    ]
}

pub fn app(state: &AppState) -> Router {
    pricewar::handlers::router(state.clone())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// A request carrying the admin cookie.
pub fn admin_request(method: &str, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", format!("admin_token={}", ADMIN_TOKEN));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Get current Unix timestamp as a string (for webhook signature tests)
pub fn current_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

pub fn compute_stripe_signature(payload: &[u8], secret: &str, timestamp: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// A valid `stripe-signature` header for `payload`.
pub fn stripe_signature_header(payload: &[u8]) -> String {
    let timestamp = current_timestamp();
    let signature = compute_stripe_signature(payload, WEBHOOK_SECRET, &timestamp);
    format!("t={},v1={}", timestamp, signature)
}

/// A Stripe event body for a checkout session.
pub fn session_event(event_type: &str, session_id: &str, email: Option<&str>) -> Vec<u8> {
    let body = serde_json::json!({
        "id": "evt_test",
        "type": event_type,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "customer_details": email.map(|e| serde_json::json!({ "email": e })),
            }
        }
    });
    serde_json::to_vec(&body).unwrap()
}

/// Insert a pending order directly into the store.
pub fn create_pending_order(backend: &Backend, session_id: &str) -> Order {
    let now = queries::now();
    let order = Order {
        id: pricewar::id::EntityType::Order.gen_id(),
        items: vec![OrderItem {
            product_id: "pw_prod_test".to_string(),
            name: "Towel".to_string(),
            price: 1999,
            quantity: 2,
            image_url: None,
        }],
        currency: "cad".to_string(),
        amount_subtotal: 3998,
        amount_total: 3998,
        status: OrderStatus::Pending,
        external_session_id: session_id.to_string(),
        customer_email: None,
        created_at: now,
        updated_at: now,
    };
    backend.insert_order(&order).unwrap();
    order
}

pub fn create_test_product(backend: &Backend, name: &str, category: &str, price: f64) -> Product {
    backend
        .repo::<Product>()
        .create(CreateProduct {
            name: Some(name.to_string()),
            category_slug: Some(category.to_string()),
            price: Some(price),
            ..Default::default()
        })
        .unwrap()
}
