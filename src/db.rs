// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Camlot", "camlot"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("camlot.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

/// Create every table if missing. Also used by tests on in-memory databases.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS brands(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS orders(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        description TEXT NOT NULL,
        exchange_rate TEXT NOT NULL,   -- 1 source unit = rate target units
        tax_rate TEXT NOT NULL,
        customs_fee TEXT NOT NULL DEFAULT '0',
        shipping_fee TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_orders_date ON orders(date);

    CREATE TABLE IF NOT EXISTS items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        reference TEXT UNIQUE,
        brand_id INTEGER,
        kind TEXT NOT NULL DEFAULT 'other'
            CHECK(kind IN ('body','lens','complete','other')),
        status TEXT NOT NULL DEFAULT 'listed'
            CHECK(status IN ('listed','sold','kept','discarded')),
        cost TEXT NOT NULL,
        target_cost TEXT NOT NULL DEFAULT '0', -- snapshot at save time
        tax TEXT NOT NULL DEFAULT '0',         -- snapshot at save time
        customs_share TEXT NOT NULL DEFAULT '0',
        shipping_share TEXT NOT NULL DEFAULT '0',
        domestic_shipping TEXT NOT NULL DEFAULT '0',
        sale_price TEXT,
        target_price TEXT NOT NULL DEFAULT '0',
        FOREIGN KEY(order_id) REFERENCES orders(id) ON DELETE CASCADE,
        FOREIGN KEY(brand_id) REFERENCES brands(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_items_order ON items(order_id);
    CREATE INDEX IF NOT EXISTS idx_items_name ON items(name);
    "#,
    )?;
    Ok(())
}
