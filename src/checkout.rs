//! Turns cart contents into a hosted checkout session plus a pending order.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::db::queries::now;
use crate::error::{AppError, Result, msg};
use crate::id::EntityType;
use crate::models::{Order, OrderItem, OrderStatus};
use crate::money;
use crate::payments::{CheckoutSessionRequest, LineItem, PaymentGateway};
use crate::store::Backend;

pub const DEFAULT_CURRENCY: &str = "cad";

/// A checkout line. `price` is already in minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `POST /api/checkout/session`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Result of a successful checkout initiation.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub url: String,
    pub session_id: String,
    /// The pending order, if it was persisted.
    pub order: Option<Order>,
}

impl CheckoutRequest {
    /// Build a request from a client cart, converting each major-unit price
    /// to minor units exactly once.
    pub fn from_cart(cart: &Cart, currency: &str, customer_email: Option<String>) -> Result<Self> {
        let items = cart
            .items()
            .iter()
            .map(|line| {
                let price = money::to_minor_units(line.price.unwrap_or(0.0))
                    .ok_or_else(|| AppError::BadRequest(msg::INVALID_PRICE.into()))?;
                Ok(CheckoutItem {
                    product_id: line.id.clone(),
                    name: line.name.clone(),
                    price,
                    quantity: i64::from(line.qty),
                    image_url: line.image_url.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            currency: Some(currency.to_string()),
            items,
            customer_email,
        })
    }

    /// Lowercased currency code, defaulting to CAD.
    pub fn currency(&self) -> String {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_lowercase()
    }

    fn customer_email(&self) -> Option<String> {
        self.customer_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }

    /// Validate and convert into order lines.
    pub fn order_items(&self) -> Result<Vec<OrderItem>> {
        if self.items.is_empty() {
            return Err(AppError::EmptyCart);
        }
        self.items
            .iter()
            .map(|item| {
                let quantity = u32::try_from(item.quantity)
                    .ok()
                    .filter(|q| *q >= 1)
                    .ok_or_else(|| AppError::BadRequest(msg::INVALID_QUANTITY.into()))?;
                if item.price < 0 {
                    return Err(AppError::BadRequest(msg::INVALID_PRICE.into()));
                }
                Ok(OrderItem {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    price: item.price,
                    quantity,
                    image_url: item.image_url.clone(),
                })
            })
            .collect()
    }
}

/// Sum of `price * quantity` in minor units.
pub fn subtotal(items: &[OrderItem]) -> Result<i64> {
    items
        .iter()
        .try_fold(0i64, |acc, item| acc.checked_add(item.line_total()?))
        .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))
}

/// Create a hosted checkout session and record a pending order for it.
///
/// The order write is best-effort: a failure is logged and the redirect URL is
/// still returned, since the webhook treats a missing order as a no-op.
pub async fn initiate_checkout<G: PaymentGateway>(
    gateway: &G,
    backend: &Backend,
    base_url: &str,
    request: &CheckoutRequest,
) -> Result<CheckoutOutcome> {
    let items = request.order_items()?;
    let currency = request.currency();
    let customer_email = request.customer_email();
    let amount_subtotal = subtotal(&items)?;

    let session_request = CheckoutSessionRequest {
        currency: currency.clone(),
        line_items: items
            .iter()
            .map(|item| LineItem {
                name: item.name.clone(),
                unit_amount: item.price,
                quantity: item.quantity,
            })
            .collect(),
        success_url: format!(
            "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
            base_url
        ),
        cancel_url: format!("{}/checkout/cancel", base_url),
        customer_email: customer_email.clone(),
    };

    let session = gateway.create_checkout_session(&session_request).await?;
    tracing::info!(
        "Created checkout session {} ({} lines, {} {})",
        session.id,
        items.len(),
        amount_subtotal,
        currency
    );

    let now = now();
    let order = Order {
        id: EntityType::Order.gen_id(),
        items,
        currency,
        amount_subtotal,
        amount_total: amount_subtotal,
        status: OrderStatus::Pending,
        external_session_id: session.id.clone(),
        customer_email,
        created_at: now,
        updated_at: now,
    };

    let order = match backend.insert_order(&order) {
        Ok(()) => Some(order),
        Err(e) => {
            tracing::warn!(
                "Failed to persist pending order for session {}: {}",
                session.id,
                e
            );
            None
        }
    };

    Ok(CheckoutOutcome {
        url: session.url,
        session_id: session.id,
        order,
    })
}
