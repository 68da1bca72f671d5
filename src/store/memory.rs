use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::queries::now;
use crate::error::{AppError, Result};
use crate::models::{Category, Deal, Order, OrderStatus, Product, StatusUpdate};

/// Process-lifetime fallback used when no database is configured.
///
/// Built once at startup and shared through `AppState`; every clone of the
/// state sees the same collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(super) categories: RwLock<Vec<Category>>,
    pub(super) products: RwLock<Vec<Product>>,
    pub(super) deals: RwLock<Vec<Deal>>,
    orders: RwLock<Vec<Order>>,
}

pub(super) fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
}

pub(super) fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: &Order) -> Result<()> {
        let mut orders = write(&self.orders)?;
        if orders
            .iter()
            .any(|o| o.external_session_id == order.external_session_id)
        {
            return Err(AppError::Internal(format!(
                "duplicate order for session {}",
                order.external_session_id
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    /// Orders newest first.
    pub fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(read(&self.orders)?.iter().rev().cloned().collect())
    }

    pub fn get_order_by_session(&self, session_id: &str) -> Result<Option<Order>> {
        Ok(read(&self.orders)?
            .iter()
            .find(|o| o.external_session_id == session_id)
            .cloned())
    }

    pub fn update_order_status(
        &self,
        session_id: &str,
        status: OrderStatus,
        customer_email: Option<&str>,
    ) -> Result<StatusUpdate> {
        let mut orders = write(&self.orders)?;
        let Some(order) = orders
            .iter_mut()
            .find(|o| o.external_session_id == session_id)
        else {
            return Ok(StatusUpdate::NotFound);
        };

        if !order.status.accepts(status) {
            return Ok(StatusUpdate::Conflict(order.status));
        }

        order.status = status;
        if order.customer_email.is_none() {
            order.customer_email = customer_email.map(str::to_string);
        }
        order.updated_at = now();
        Ok(StatusUpdate::Applied)
    }
}
