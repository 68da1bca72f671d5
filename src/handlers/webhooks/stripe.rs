use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::db::AppState;
use crate::error::{AppError, msg};
use crate::payments::WebhookVerifier;
use crate::webhooks::process_webhook;

/// Plain-text status pair, the response convention Stripe expects.
pub type WebhookResult = (StatusCode, &'static str);

fn extract_signature(headers: &HeaderMap) -> Result<&str, WebhookResult> {
    headers
        .get("stripe-signature")
        .ok_or((StatusCode::BAD_REQUEST, "Missing stripe-signature header"))?
        .to_str()
        .map_err(|e| {
            tracing::debug!("Invalid UTF-8 in Stripe signature header: {}", e);
            (StatusCode::BAD_REQUEST, "Invalid signature header")
        })
}

/// `POST /api/webhooks/stripe`. The body stays raw bytes until the signature
/// has been verified.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult {
    let Some(secret) = state.stripe.webhook_secret.as_deref() else {
        tracing::error!("{}", msg::WEBHOOK_NOT_CONFIGURED);
        return (StatusCode::INTERNAL_SERVER_ERROR, msg::WEBHOOK_NOT_CONFIGURED);
    };

    let signature = match extract_signature(&headers) {
        Ok(s) => s,
        Err(result) => return result,
    };

    let verifier = WebhookVerifier::new(secret);
    match process_webhook(&verifier, &state.backend(), &body, signature) {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(AppError::SignatureVerification(e)) => {
            tracing::warn!("Stripe webhook rejected: {}", e);
            (StatusCode::BAD_REQUEST, "Signature verification failed")
        }
        Err(AppError::Json(e)) => {
            tracing::error!("Failed to parse Stripe webhook: {}", e);
            (StatusCode::BAD_REQUEST, "Invalid JSON")
        }
        Err(e) => {
            tracing::error!("Stripe webhook processing failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}
