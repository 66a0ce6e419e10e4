// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::models::Brand;
use crate::utils::{optional, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?.trim();
            add_brand(conn, name)?;
            println!("Added brand '{}'", name);
        }
        Some(("list", sub)) => {
            let data = list_brands(conn, optional(sub, "search"))?
                .into_iter()
                .map(|b| vec![b.name])
                .collect();
            println!("{}", pretty_table(&["Brand"], data));
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?.trim();
            let n = conn.execute("DELETE FROM brands WHERE name=?1", params![name])?;
            if n == 0 {
                return Err(LedgerError::NotFound(format!("Brand '{}'", name)).into());
            }
            println!("Removed brand '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn add_brand(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Required("brand name").into());
    }
    conn.execute("INSERT INTO brands(name) VALUES (?1)", params![name])
        .with_context(|| format!("Add brand '{}' (names are unique)", name))?;
    Ok(conn.last_insert_rowid())
}

pub fn list_brands(conn: &Connection, search: Option<&str>) -> Result<Vec<Brand>> {
    let pat = format!("%{}%", search.unwrap_or(""));
    let mut stmt = conn.prepare("SELECT id, name FROM brands WHERE name LIKE ?1 ORDER BY name")?;
    let rows = stmt.query_map(params![pat], |r| {
        Ok(Brand {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
