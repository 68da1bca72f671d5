//! Pricewar - storefront backend: catalogue, cart, hosted checkout and
//! payment webhooks over SQLite or an in-memory fallback.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod middleware;
pub mod models;
pub mod money;
pub mod payments;
pub mod seed;
pub mod store;
pub mod webhooks;
