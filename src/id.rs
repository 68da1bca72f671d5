//! Prefixed ID generation for storefront entities.
//!
//! All IDs use a `pw_` brand prefix so they never collide with payment
//! provider IDs (Stripe's `cs_`, `pi_`, `cus_`, etc.).
//!
//! Format: `pw_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use rand::{Rng, distributions::Alphanumeric};
use uuid::Uuid;

const ALL_PREFIXES: &[&str] = &["pw_cat_", "pw_prod_", "pw_deal_", "pw_ord_"];

/// Validate that a string is a well-formed storefront ID.
///
/// A cheap check to reject garbage before touching the store.
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Category,
    Product,
    Deal,
    Order,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Category => "pw_cat",
            Self::Product => "pw_prod",
            Self::Deal => "pw_deal",
            Self::Order => "pw_ord",
        }
    }

    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}

/// Placeholder slug such as `prod-x7k2q` for records created without one.
pub fn random_slug(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{}", prefix, suffix)
}
