mod category;
mod deal;
mod order;
mod product;

pub use category::*;
pub use deal::*;
pub use order::*;
pub use product::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a double Option field where:
/// - Field absent in JSON → None (leave unchanged)
/// - Field present with null → Some(None) (clear)
/// - Field present with value → Some(Some(value)) (set)
pub(crate) fn deserialize_optional_nullable<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(Some(value))
}

/// Treat an absent or blank string as missing.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
