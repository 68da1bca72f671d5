use chrono::Utc;
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    CATEGORY_COLS, DEAL_COLS, ORDER_COLS, PRODUCT_COLS, query_all, query_one,
};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Categories ============

/// All categories in creation order.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM categories ORDER BY created_at ASC, rowid ASC",
            CATEGORY_COLS
        ),
        &[],
    )
}

pub fn get_category_by_id(conn: &Connection, id: &str) -> Result<Option<Category>> {
    query_one(
        conn,
        &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLS),
        &[&id],
    )
}

pub fn insert_category(conn: &Connection, category: &Category) -> Result<()> {
    conn.execute(
        "INSERT INTO categories (id, label, slug, image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            &category.id,
            &category.label,
            &category.slug,
            &category.image_url,
            category.created_at,
            category.updated_at,
        ],
    )?;
    Ok(())
}

/// Overwrite every mutable column. Returns false when the row is gone.
pub fn replace_category(conn: &Connection, category: &Category) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE categories SET label = ?1, slug = ?2, image_url = ?3, updated_at = ?4
         WHERE id = ?5",
        params![
            &category.label,
            &category.slug,
            &category.image_url,
            category.updated_at,
            &category.id,
        ],
    )?;
    Ok(updated > 0)
}

pub fn delete_category(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Products ============

/// All products in creation order.
pub fn list_products(conn: &Connection) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM products ORDER BY created_at ASC, rowid ASC",
            PRODUCT_COLS
        ),
        &[],
    )
}

pub fn get_product_by_id(conn: &Connection, id: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLS),
        &[&id],
    )
}

pub fn insert_product(conn: &Connection, product: &Product) -> Result<()> {
    conn.execute(
        "INSERT INTO products (id, name, slug, category_slug, price, image_url, description, featured, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            &product.id,
            &product.name,
            &product.slug,
            &product.category_slug,
            product.price,
            &product.image_url,
            &product.description,
            product.featured as i32,
            product.created_at,
            product.updated_at,
        ],
    )?;
    Ok(())
}

pub fn replace_product(conn: &Connection, product: &Product) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE products SET name = ?1, slug = ?2, category_slug = ?3, price = ?4, image_url = ?5,
             description = ?6, featured = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            &product.name,
            &product.slug,
            &product.category_slug,
            product.price,
            &product.image_url,
            &product.description,
            product.featured as i32,
            product.updated_at,
            &product.id,
        ],
    )?;
    Ok(updated > 0)
}

pub fn delete_product(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Deals ============

pub fn list_deals(conn: &Connection) -> Result<Vec<Deal>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM deals ORDER BY created_at ASC, rowid ASC",
            DEAL_COLS
        ),
        &[],
    )
}

pub fn get_deal_by_id(conn: &Connection, id: &str) -> Result<Option<Deal>> {
    query_one(
        conn,
        &format!("SELECT {} FROM deals WHERE id = ?1", DEAL_COLS),
        &[&id],
    )
}

pub fn insert_deal(conn: &Connection, deal: &Deal) -> Result<()> {
    conn.execute(
        "INSERT INTO deals (id, title, description, category, expires, image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &deal.id,
            &deal.title,
            &deal.description,
            &deal.category,
            &deal.expires,
            &deal.image_url,
            deal.created_at,
            deal.updated_at,
        ],
    )?;
    Ok(())
}

pub fn replace_deal(conn: &Connection, deal: &Deal) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE deals SET title = ?1, description = ?2, category = ?3, expires = ?4, image_url = ?5,
             updated_at = ?6
         WHERE id = ?7",
        params![
            &deal.title,
            &deal.description,
            &deal.category,
            &deal.expires,
            &deal.image_url,
            deal.updated_at,
            &deal.id,
        ],
    )?;
    Ok(updated > 0)
}

pub fn delete_deal(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM deals WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Orders ============

pub fn insert_order(conn: &Connection, order: &Order) -> Result<()> {
    let items_json = serde_json::to_string(&order.items)?;
    conn.execute(
        "INSERT INTO orders (id, items, currency, amount_subtotal, amount_total, status, external_session_id, customer_email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            &order.id,
            &items_json,
            &order.currency,
            order.amount_subtotal,
            order.amount_total,
            order.status.as_ref(),
            &order.external_session_id,
            &order.customer_email,
            order.created_at,
            order.updated_at,
        ],
    )?;
    Ok(())
}

/// Orders newest first.
pub fn list_orders(conn: &Connection) -> Result<Vec<Order>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
            ORDER_COLS
        ),
        &[],
    )
}

pub fn get_order_by_session(conn: &Connection, session_id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM orders WHERE external_session_id = ?1",
            ORDER_COLS
        ),
        &[&session_id],
    )
}

/// Move an order to `status` if its current status allows it.
///
/// The guard lives in the WHERE clause so concurrent deliveries cannot
/// regress a terminal order. An existing customer email is never replaced.
pub fn update_order_status(
    conn: &Connection,
    session_id: &str,
    status: OrderStatus,
    customer_email: Option<&str>,
) -> Result<StatusUpdate> {
    let updated = conn.execute(
        "UPDATE orders SET status = ?1, customer_email = COALESCE(customer_email, ?2), updated_at = ?3
         WHERE external_session_id = ?4 AND (status = 'pending' OR status = ?1)",
        params![status.as_ref(), customer_email, now(), session_id],
    )?;
    if updated > 0 {
        return Ok(StatusUpdate::Applied);
    }

    Ok(match get_order_by_session(conn, session_id)? {
        Some(existing) => StatusUpdate::Conflict(existing.status),
        None => StatusUpdate::NotFound,
    })
}
