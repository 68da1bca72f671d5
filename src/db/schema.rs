use rusqlite::Connection;

/// Initialize the storefront schema. Idempotent.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;

        -- Categories. Slug uniqueness is a caller concern, so no UNIQUE here.
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            slug TEXT NOT NULL,
            image_url TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_categories_slug ON categories(slug);

        -- Products. category_slug is a soft reference (no FOREIGN KEY).
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            category_slug TEXT NOT NULL,
            price REAL NOT NULL DEFAULT 0,
            image_url TEXT,
            description TEXT,
            featured INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_slug);
        CREATE INDEX IF NOT EXISTS idx_products_featured ON products(featured) WHERE featured = 1;

        CREATE TABLE IF NOT EXISTS deals (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT,
            expires TEXT,
            image_url TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Orders. Items are an embedded JSON array; amounts are minor units.
        -- Rows are never deleted; status is overwritten in place.
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            items TEXT NOT NULL,
            currency TEXT NOT NULL,
            amount_subtotal INTEGER NOT NULL,
            amount_total INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'paid', 'failed')),
            external_session_id TEXT NOT NULL UNIQUE,
            customer_email TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);
        "#,
    )
}
