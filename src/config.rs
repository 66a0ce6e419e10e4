// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stored settings: listing branding, page size and currency labels.

use crate::error::LedgerError;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub const KEYS: [&str; 6] = [
    "site_title",
    "list_per_page",
    "source_currency",
    "target_currency",
    "target_minor_units",
    "default_tax_rate",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub site_title: String,
    pub list_per_page: usize,
    pub source_currency: String,
    pub target_currency: String,
    pub target_minor_units: u32,
    pub default_tax_rate: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_title: "Camlot".to_string(),
            list_per_page: 25,
            source_currency: "EUR".to_string(),
            target_currency: "JPY".to_string(),
            target_minor_units: 0,
            default_tax_rate: Decimal::new(21, 2),
        }
    }
}

impl Settings {
    /// Defaults overlaid with whatever is stored. A stored value that no
    /// longer validates is an error rather than a silent fallback.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        for key in KEYS {
            if let Some(raw) = get_raw(conn, key)? {
                s.apply(key, &raw)
                    .with_context(|| format!("Stored setting {} is invalid", key))?;
            }
        }
        Ok(s)
    }

    pub fn value_of(&self, key: &str) -> Result<String, LedgerError> {
        Ok(match key {
            "site_title" => self.site_title.clone(),
            "list_per_page" => self.list_per_page.to_string(),
            "source_currency" => self.source_currency.clone(),
            "target_currency" => self.target_currency.clone(),
            "target_minor_units" => self.target_minor_units.to_string(),
            "default_tax_rate" => self.default_tax_rate.to_string(),
            _ => return Err(LedgerError::UnknownSetting(key.to_string())),
        })
    }

    fn apply(&mut self, key: &str, raw: &str) -> Result<(), LedgerError> {
        let invalid = |reason: &str| LedgerError::InvalidSetting {
            key: key.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "site_title" => {
                if raw.trim().is_empty() {
                    return Err(invalid("must not be empty"));
                }
                self.site_title = raw.trim().to_string();
            }
            "list_per_page" => {
                let n: usize = raw.trim().parse().map_err(|_| invalid("expected a number"))?;
                if n == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.list_per_page = n;
            }
            "source_currency" | "target_currency" => {
                let ccy = raw.trim().to_uppercase();
                if ccy.len() != 3 || !ccy.chars().all(|c| c.is_ascii_uppercase()) {
                    return Err(invalid("expected a three-letter currency code"));
                }
                if key == "source_currency" {
                    self.source_currency = ccy;
                } else {
                    self.target_currency = ccy;
                }
            }
            "target_minor_units" => {
                let n: u32 = raw.trim().parse().map_err(|_| invalid("expected a number"))?;
                if n > 4 {
                    return Err(invalid("at most 4 decimal places"));
                }
                self.target_minor_units = n;
            }
            "default_tax_rate" => {
                let d: Decimal = raw.trim().parse().map_err(|_| invalid("expected a decimal"))?;
                if d.is_sign_negative() && !d.is_zero() {
                    return Err(invalid("must not be negative"));
                }
                self.default_tax_rate = d;
            }
            _ => return Err(LedgerError::UnknownSetting(key.to_string())),
        }
        Ok(())
    }
}

fn get_raw(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

/// Validate and store one setting, returning the normalised value.
pub fn set(conn: &Connection, key: &str, raw: &str) -> Result<String> {
    let mut s = Settings::load(conn)?;
    s.apply(key, raw)?;
    let value = s.value_of(key)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    tracing::info!(key, value = %value, "setting updated");
    Ok(value)
}
