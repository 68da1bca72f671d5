mod from_row;
pub mod queries;
mod schema;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::StripeSettings;
use crate::store::{Backend, MemoryStore};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// SQLite pool, present only when a database is configured.
    pub db: Option<DbPool>,
    /// Fallback store used whenever `db` is `None`.
    pub memory: Arc<MemoryStore>,
    /// Base URL for checkout redirects (e.g., https://shop.example.com)
    pub base_url: String,
    pub stripe: StripeSettings,
    /// Expected admin cookie value. `None` disables the admin API.
    pub admin_token: Option<String>,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Resolve the storage backend for this call.
    pub fn backend(&self) -> Backend {
        match &self.db {
            Some(pool) => Backend::Sqlite(pool.clone()),
            None => Backend::Memory(self.memory.clone()),
        }
    }
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
