//! Client-held shopping cart.
//!
//! [`Cart`] is a pure state container: every operation is a synchronous
//! in-memory transition. Persistence lives behind [`storage::CartStorage`] and
//! is applied by [`PersistentCart`], which writes the whole cart through to
//! storage after every mutating call.

pub mod storage;

use serde::{Deserialize, Serialize};

use crate::money;

pub use storage::{CartStorage, FileStorage, MemoryStorage, CART_STORAGE_KEY};

/// One cart line, keyed by product id. `price` is in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub qty: u32,
}

/// Product snapshot passed to [`Cart::add`]; the cart owns the quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl NewCartItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image_url: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Add `qty` of a product. An existing line for the same id is incremented
    /// rather than duplicated. A zero quantity is treated as one.
    pub fn add(&mut self, item: NewCartItem, qty: u32) {
        let qty = qty.max(1);
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.qty = existing.qty.saturating_add(qty);
            return;
        }
        self.items.push(CartItem {
            id: item.id,
            name: item.name,
            price: item.price,
            image_url: item.image_url,
            qty,
        });
    }

    /// Drop the line entirely. Returns whether a line was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Set a line's quantity, clamped to a minimum of 1. Unknown ids are ignored.
    pub fn set_qty(&mut self, id: &str, qty: i64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.qty = u32::try_from(qty.max(1)).unwrap_or(u32::MAX);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all lines.
    pub fn count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.qty)).sum()
    }

    /// Sum of `price * qty` in major units; a missing price counts as zero.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.price.unwrap_or(0.0) * f64::from(i.qty))
            .sum()
    }

    /// Exact total in minor units, converting each line price once.
    /// Returns `None` if any price cannot be represented.
    pub fn total_minor(&self) -> Option<i64> {
        self.items.iter().try_fold(0i64, |acc, i| {
            let unit = money::to_minor_units(i.price.unwrap_or(0.0))?;
            acc.checked_add(unit.checked_mul(i64::from(i.qty))?)
        })
    }

    /// Hydrate from a stored JSON snapshot. Corrupt data yields an empty cart;
    /// lines with a zero quantity are lifted to one.
    pub fn from_snapshot(raw: &str) -> Self {
        match serde_json::from_str::<Cart>(raw) {
            Ok(mut cart) => {
                for item in &mut cart.items {
                    item.qty = item.qty.max(1);
                }
                cart
            }
            Err(e) => {
                tracing::debug!("Discarding unreadable cart snapshot: {}", e);
                Cart::default()
            }
        }
    }

    pub fn snapshot(&self) -> String {
        // Serializing plain strings, numbers and options cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }
}

/// A [`Cart`] bound to a storage adapter. Loads once on construction and
/// flushes after every mutation.
pub struct PersistentCart<S: CartStorage> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> PersistentCart<S> {
    /// Hydrate from storage. Missing or corrupt data starts an empty cart.
    pub fn load(storage: S) -> Self {
        let cart = storage
            .get(CART_STORAGE_KEY)
            .map(|raw| Cart::from_snapshot(&raw))
            .unwrap_or_default();
        Self { cart, storage }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn add(&mut self, item: NewCartItem, qty: u32) {
        self.cart.add(item, qty);
        self.flush();
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.cart.remove(id);
        self.flush();
        removed
    }

    pub fn set_qty(&mut self, id: &str, qty: i64) {
        self.cart.set_qty(id, qty);
        self.flush();
    }

    /// Empty the cart and drop its stored snapshot.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.storage.remove(CART_STORAGE_KEY);
    }

    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    pub fn total(&self) -> f64 {
        self.cart.total()
    }

    fn flush(&self) {
        self.storage.set(CART_STORAGE_KEY, &self.cart.snapshot());
    }
}

impl<S: CartStorage> std::fmt::Debug for PersistentCart<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCart")
            .field("cart", &self.cart)
            .finish()
    }
}
