// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, ensure_non_negative};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parse a money amount and reject negatives.
pub fn parse_money(field: &'static str, s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    Ok(ensure_non_negative(field, d)?)
}

/// Decimal stored as TEXT in one of our tables.
pub fn stored_decimal(raw: &str, what: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid stored {} '{}'", what, raw))
}

/// A required clap argument. clap enforces presence, so a miss here means
/// the handler and the command definition disagree.
pub fn required<'a>(m: &'a clap::ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("missing argument --{}", id))
}

pub fn optional<'a>(m: &'a clap::ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d, ccy)
}

pub fn fmt_opt(d: Option<Decimal>) -> String {
    d.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_brand(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM brands WHERE name=?1")?;
    let id: Option<i64> = stmt
        .query_row(params![name.trim()], |r| r.get(0))
        .optional()?;
    Ok(id.ok_or_else(|| LedgerError::NotFound(format!("Brand '{}'", name.trim())))?)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
