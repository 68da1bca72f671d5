//! Storage abstraction over the SQLite database and the in-memory fallback.
//!
//! Callers go through [`Repository`] for catalogue CRUD and through
//! [`Backend`] for orders, and never branch on which backend is live.

mod memory;

pub use memory::MemoryStore;

use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use rusqlite::Connection;
use serde::{Serialize, de::DeserializeOwned};

use crate::db::{DbPool, queries};
use crate::error::{Result, msg};
use crate::id::{EntityType, is_valid_prefixed_id};
use crate::models::*;

use memory::{read, write};

/// The storage selected for a single call.
#[derive(Clone)]
pub enum Backend {
    Sqlite(DbPool),
    Memory(Arc<MemoryStore>),
}

impl Backend {
    pub fn is_memory(&self) -> bool {
        matches!(self, Backend::Memory(_))
    }

    pub fn repo<E: Entity>(&self) -> Repository<E> {
        Repository {
            backend: self.clone(),
            _entity: PhantomData,
        }
    }

    pub fn insert_order(&self, order: &Order) -> Result<()> {
        match self {
            Backend::Sqlite(pool) => queries::insert_order(&*pool.get()?, order),
            Backend::Memory(store) => store.insert_order(order),
        }
    }

    /// Orders newest first.
    pub fn list_orders(&self) -> Result<Vec<Order>> {
        match self {
            Backend::Sqlite(pool) => queries::list_orders(&*pool.get()?),
            Backend::Memory(store) => store.list_orders(),
        }
    }

    pub fn get_order_by_session(&self, session_id: &str) -> Result<Option<Order>> {
        match self {
            Backend::Sqlite(pool) => queries::get_order_by_session(&*pool.get()?, session_id),
            Backend::Memory(store) => store.get_order_by_session(session_id),
        }
    }

    /// Apply a provider status. The customer email is only recorded on `paid`.
    pub fn update_order_status(
        &self,
        session_id: &str,
        status: OrderStatus,
        customer_email: Option<&str>,
    ) -> Result<StatusUpdate> {
        let customer_email = customer_email.filter(|_| status == OrderStatus::Paid);
        match self {
            Backend::Sqlite(pool) => {
                queries::update_order_status(&*pool.get()?, session_id, status, customer_email)
            }
            Backend::Memory(store) => {
                store.update_order_status(session_id, status, customer_email)
            }
        }
    }
}

/// A catalogue record managed through [`Repository`].
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    type Create: DeserializeOwned + Send;
    type Update: DeserializeOwned + Send;

    const KIND: EntityType;
    const NOT_FOUND: &'static str;

    fn id(&self) -> &str;
    fn check_create(_input: &Self::Create) -> Result<()> {
        Ok(())
    }
    fn check_update(patch: &Self::Update) -> Result<()>;
    fn build(id: String, input: Self::Create, now: i64) -> Self;
    fn merge(&mut self, patch: Self::Update, now: i64);

    fn memory(store: &MemoryStore) -> &RwLock<Vec<Self>>;

    fn sql_list(conn: &Connection) -> Result<Vec<Self>>;
    fn sql_get(conn: &Connection, id: &str) -> Result<Option<Self>>;
    fn sql_insert(conn: &Connection, record: &Self) -> Result<()>;
    fn sql_replace(conn: &Connection, record: &Self) -> Result<bool>;
    fn sql_delete(conn: &Connection, id: &str) -> Result<bool>;
}

/// Uniform CRUD over whichever backend is live.
pub struct Repository<E: Entity> {
    backend: Backend,
    _entity: PhantomData<E>,
}

impl<E: Entity> Repository<E> {
    /// All records in creation order.
    pub fn list(&self) -> Result<Vec<E>> {
        match &self.backend {
            Backend::Sqlite(pool) => E::sql_list(&*pool.get()?),
            Backend::Memory(store) => Ok(read(E::memory(store))?.clone()),
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<E>> {
        if !is_valid_prefixed_id(id) {
            return Ok(None);
        }
        match &self.backend {
            Backend::Sqlite(pool) => E::sql_get(&*pool.get()?, id),
            Backend::Memory(store) => Ok(read(E::memory(store))?
                .iter()
                .find(|r| r.id() == id)
                .cloned()),
        }
    }

    /// Insert a new record under a fresh id with server-side timestamps.
    pub fn create(&self, input: E::Create) -> Result<E> {
        E::check_create(&input)?;
        let record = E::build(E::KIND.gen_id(), input, queries::now());
        match &self.backend {
            Backend::Sqlite(pool) => E::sql_insert(&*pool.get()?, &record)?,
            Backend::Memory(store) => write(E::memory(store))?.push(record.clone()),
        }
        Ok(record)
    }

    /// Merge `patch` over the stored record. `None` when the id is unknown.
    pub fn update(&self, id: &str, patch: E::Update) -> Result<Option<E>> {
        E::check_update(&patch)?;
        if !is_valid_prefixed_id(id) {
            return Ok(None);
        }
        let now = queries::now();
        match &self.backend {
            Backend::Sqlite(pool) => {
                let conn = pool.get()?;
                let Some(mut record) = E::sql_get(&conn, id)? else {
                    return Ok(None);
                };
                record.merge(patch, now);
                if !E::sql_replace(&conn, &record)? {
                    return Ok(None);
                }
                Ok(Some(record))
            }
            Backend::Memory(store) => {
                let mut records = write(E::memory(store))?;
                let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
                    return Ok(None);
                };
                record.merge(patch, now);
                Ok(Some(record.clone()))
            }
        }
    }

    /// Returns whether a record was actually deleted.
    pub fn remove(&self, id: &str) -> Result<bool> {
        if !is_valid_prefixed_id(id) {
            return Ok(false);
        }
        match &self.backend {
            Backend::Sqlite(pool) => E::sql_delete(&*pool.get()?, id),
            Backend::Memory(store) => {
                let mut records = write(E::memory(store))?;
                let before = records.len();
                records.retain(|r| r.id() != id);
                Ok(records.len() < before)
            }
        }
    }
}

impl Entity for Category {
    type Create = CreateCategory;
    type Update = UpdateCategory;

    const KIND: EntityType = EntityType::Category;
    const NOT_FOUND: &'static str = msg::CATEGORY_NOT_FOUND;

    fn id(&self) -> &str {
        &self.id
    }
    fn check_update(patch: &UpdateCategory) -> Result<()> {
        patch.validate()
    }
    fn build(id: String, input: CreateCategory, now: i64) -> Self {
        Category::new(id, input, now)
    }
    fn merge(&mut self, patch: UpdateCategory, now: i64) {
        self.apply(patch, now)
    }
    fn memory(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.categories
    }
    fn sql_list(conn: &Connection) -> Result<Vec<Self>> {
        queries::list_categories(conn)
    }
    fn sql_get(conn: &Connection, id: &str) -> Result<Option<Self>> {
        queries::get_category_by_id(conn, id)
    }
    fn sql_insert(conn: &Connection, record: &Self) -> Result<()> {
        queries::insert_category(conn, record)
    }
    fn sql_replace(conn: &Connection, record: &Self) -> Result<bool> {
        queries::replace_category(conn, record)
    }
    fn sql_delete(conn: &Connection, id: &str) -> Result<bool> {
        queries::delete_category(conn, id)
    }
}

impl Entity for Product {
    type Create = CreateProduct;
    type Update = UpdateProduct;

    const KIND: EntityType = EntityType::Product;
    const NOT_FOUND: &'static str = msg::PRODUCT_NOT_FOUND;

    fn id(&self) -> &str {
        &self.id
    }
    fn check_create(input: &CreateProduct) -> Result<()> {
        input.validate()
    }
    fn check_update(patch: &UpdateProduct) -> Result<()> {
        patch.validate()
    }
    fn build(id: String, input: CreateProduct, now: i64) -> Self {
        Product::new(id, input, now)
    }
    fn merge(&mut self, patch: UpdateProduct, now: i64) {
        self.apply(patch, now)
    }
    fn memory(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.products
    }
    fn sql_list(conn: &Connection) -> Result<Vec<Self>> {
        queries::list_products(conn)
    }
    fn sql_get(conn: &Connection, id: &str) -> Result<Option<Self>> {
        queries::get_product_by_id(conn, id)
    }
    fn sql_insert(conn: &Connection, record: &Self) -> Result<()> {
        queries::insert_product(conn, record)
    }
    fn sql_replace(conn: &Connection, record: &Self) -> Result<bool> {
        queries::replace_product(conn, record)
    }
    fn sql_delete(conn: &Connection, id: &str) -> Result<bool> {
        queries::delete_product(conn, id)
    }
}

impl Entity for Deal {
    type Create = CreateDeal;
    type Update = UpdateDeal;

    const KIND: EntityType = EntityType::Deal;
    const NOT_FOUND: &'static str = msg::DEAL_NOT_FOUND;

    fn id(&self) -> &str {
        &self.id
    }
    fn check_update(patch: &UpdateDeal) -> Result<()> {
        patch.validate()
    }
    fn build(id: String, input: CreateDeal, now: i64) -> Self {
        Deal::new(id, input, now)
    }
    fn merge(&mut self, patch: UpdateDeal, now: i64) {
        self.apply(patch, now)
    }
    fn memory(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.deals
    }
    fn sql_list(conn: &Connection) -> Result<Vec<Self>> {
        queries::list_deals(conn)
    }
    fn sql_get(conn: &Connection, id: &str) -> Result<Option<Self>> {
        queries::get_deal_by_id(conn, id)
    }
    fn sql_insert(conn: &Connection, record: &Self) -> Result<()> {
        queries::insert_deal(conn, record)
    }
    fn sql_replace(conn: &Connection, record: &Self) -> Result<bool> {
        queries::replace_deal(conn, record)
    }
    fn sql_delete(conn: &Connection, id: &str) -> Result<bool> {
        queries::delete_deal(conn, id)
    }
}
