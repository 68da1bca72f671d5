use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::StripeSettings;
use crate::error::{AppError, Result, msg};

use super::{CheckoutSession, CheckoutSessionRequest, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct CreateCheckoutSessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_base: String,
    timeout: Option<Duration>,
}

impl StripeClient {
    /// Fails with a configuration error when no secret key is set.
    pub fn new(client: Client, settings: &StripeSettings) -> Result<Self> {
        let secret_key = settings
            .secret_key
            .clone()
            .ok_or_else(|| AppError::Configuration(msg::STRIPE_NOT_CONFIGURED.into()))?;
        Ok(Self {
            client,
            secret_key,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            timeout: settings.timeout,
        })
    }

    fn checkout_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            let key = |field: &str| format!("line_items[{}]{}", i, field);
            form.push((key("[price_data][currency]"), request.currency.clone()));
            form.push((key("[price_data][unit_amount]"), item.unit_amount.to_string()));
            form.push((key("[price_data][product_data][name]"), item.name.clone()));
            form.push((key("[quantity]"), item.quantity.to_string()));
            form.push((key("[adjustable_quantity][enabled]"), "true".to_string()));
            form.push((key("[adjustable_quantity][minimum]"), "1".to_string()));
        }

        if let Some(ref email) = request.customer_email {
            form.push(("customer_email".to_string(), email.clone()));
        }

        form
    }
}

impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession> {
        let mut builder = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&Self::checkout_form(request));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorResponse>(&error_text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(error_text);
            tracing::warn!("Stripe checkout session rejected ({}): {}", status, message);
            return Err(AppError::Payment(message));
        }

        let session: CreateCheckoutSessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Payment(format!("Failed to parse Stripe response: {}", e)))?;

        let url = session
            .url
            .ok_or_else(|| AppError::Payment("Stripe session has no redirect URL".into()))?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

/// Verifies `stripe-signature` headers against the webhook signing secret.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    /// Maximum age of a webhook timestamp before it's rejected (in seconds).
    const TIMESTAMP_TOLERANCE_SECS: i64 = 300;
    /// Allowed clock skew for timestamps from the future.
    const FUTURE_SKEW_SECS: i64 = 60;

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Hex HMAC-SHA256 over `"{timestamp}.{payload}"`.
    pub fn compute_signature(&self, timestamp: &str, payload: &[u8]) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| AppError::Internal(msg::INVALID_WEBHOOK_SECRET.into()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// `Ok(false)` for a well-formed header that does not verify; `Err` for a
    /// malformed one. Any `v1` entry may match, as Stripe sends one per
    /// active secret during rotation.
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<bool> {
        // Stripe signature format: t=timestamp,v1=signature[,v1=...]
        let mut timestamp = None;
        let mut candidates = Vec::new();

        for part in signature.split(',').map(str::trim) {
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(s) = part.strip_prefix("v1=") {
                candidates.push(s);
            }
        }

        let timestamp_str = timestamp
            .ok_or_else(|| AppError::SignatureVerification(msg::INVALID_SIGNATURE_FORMAT.into()))?;
        if candidates.is_empty() {
            return Err(AppError::SignatureVerification(
                msg::INVALID_SIGNATURE_FORMAT.into(),
            ));
        }

        let timestamp: i64 = timestamp_str.parse().map_err(|_| {
            AppError::SignatureVerification(msg::INVALID_TIMESTAMP_IN_SIGNATURE.into())
        })?;

        let Some(age) = chrono::Utc::now().timestamp().checked_sub(timestamp) else {
            tracing::warn!("Stripe webhook rejected: timestamp out of range ({})", timestamp);
            return Ok(false);
        };
        if age > Self::TIMESTAMP_TOLERANCE_SECS {
            tracing::warn!(
                "Stripe webhook rejected: timestamp too old (age={}s, max={}s)",
                age,
                Self::TIMESTAMP_TOLERANCE_SECS
            );
            return Ok(false);
        }
        if age < -Self::FUTURE_SKEW_SECS {
            tracing::warn!("Stripe webhook rejected: timestamp in the future (age={}s)", age);
            return Ok(false);
        }

        let expected = self.compute_signature(timestamp_str, payload)?;
        let expected_bytes = expected.as_bytes();

        // Signature length is not secret, so the length check may short-circuit.
        Ok(candidates.iter().any(|provided| {
            let provided_bytes = provided.as_bytes();
            expected_bytes.len() == provided_bytes.len()
                && bool::from(expected_bytes.ct_eq(provided_bytes))
        }))
    }
}

/// Generic Stripe webhook event. `data.object` is parsed based on `event_type`.
#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

// ============ checkout.session.* ============

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<StripeCustomerDetails>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl StripeCheckoutSession {
    /// Email collected on the hosted page, falling back to the prefilled one.
    pub fn email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
            .filter(|e| !e.trim().is_empty())
    }
}
