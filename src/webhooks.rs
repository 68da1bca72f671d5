//! Applies payment provider events to persisted orders.
//!
//! Events are correlated by checkout session id and written as a set-to-value
//! status, so redelivery of the same event leaves the order unchanged apart
//! from `updatedAt`.

use crate::error::{AppError, Result};
use crate::models::{OrderStatus, StatusUpdate};
use crate::payments::{StripeCheckoutSession, StripeWebhookEvent, WebhookVerifier};
use crate::store::Backend;

/// A verified event reduced to what the order store cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    SessionStatus {
        session_id: String,
        status: OrderStatus,
        customer_email: Option<String>,
    },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Ignored,
    Updated {
        session_id: String,
        result: StatusUpdate,
    },
}

/// Order status asserted by a Stripe event type, if it concerns orders.
pub fn status_for_event(event_type: &str) -> Option<OrderStatus> {
    match event_type {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            Some(OrderStatus::Paid)
        }
        "checkout.session.async_payment_failed" | "checkout.session.expired" => {
            Some(OrderStatus::Failed)
        }
        _ => None,
    }
}

/// Parse a raw event body. Only call this on a verified payload.
pub fn parse_event(body: &[u8]) -> Result<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(body)?;
    let Some(status) = status_for_event(&event.event_type) else {
        tracing::debug!("Ignoring Stripe event type {}", event.event_type);
        return Ok(WebhookEvent::Ignored);
    };

    let session: StripeCheckoutSession = serde_json::from_value(event.data.object)?;
    Ok(WebhookEvent::SessionStatus {
        customer_email: session.email().map(str::to_string),
        session_id: session.id,
        status,
    })
}

pub fn apply_event(backend: &Backend, event: &WebhookEvent) -> Result<WebhookOutcome> {
    let WebhookEvent::SessionStatus {
        session_id,
        status,
        customer_email,
    } = event
    else {
        return Ok(WebhookOutcome::Ignored);
    };

    let result = backend.update_order_status(session_id, *status, customer_email.as_deref())?;
    match result {
        StatusUpdate::Applied => {
            tracing::info!("Order for session {} is now {}", session_id, status.as_ref());
        }
        StatusUpdate::NotFound => {
            tracing::info!("No order for session {}, skipping", session_id);
        }
        StatusUpdate::Conflict(current) => {
            tracing::warn!(
                "Order for session {} is already {}, ignoring {}",
                session_id,
                current.as_ref(),
                status.as_ref()
            );
        }
    }

    Ok(WebhookOutcome::Updated {
        session_id: session_id.clone(),
        result,
    })
}

/// Verify, parse and apply a delivery. Nothing is read or written before the
/// signature checks out.
pub fn process_webhook(
    verifier: &WebhookVerifier,
    backend: &Backend,
    body: &[u8],
    signature: &str,
) -> Result<WebhookOutcome> {
    if !verifier.verify(body, signature)? {
        return Err(AppError::SignatureVerification(
            "signature mismatch".into(),
        ));
    }
    let event = parse_event(body)?;
    apply_event(backend, &event)
}
