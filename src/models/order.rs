use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    /// Whether a provider event asserting `target` may be written over this
    /// status. Pending moves anywhere; terminal states only accept themselves,
    /// which makes redelivery an idempotent overwrite.
    pub fn accepts(self, target: OrderStatus) -> bool {
        self == OrderStatus::Pending || self == target
    }
}

/// Line snapshot embedded in an order. `price` is in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<i64> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub items: Vec<OrderItem>,
    pub currency: String,
    pub amount_subtotal: i64,
    pub amount_total: i64,
    pub status: OrderStatus,
    /// Provider checkout session id; the correlation key for webhooks.
    pub external_session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Outcome of applying a provider status event to the order store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The order now carries the requested status.
    Applied,
    /// The order is terminal with a different status; nothing was written.
    Conflict(OrderStatus),
    /// No order matches the session id.
    NotFound,
}
