// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::items::{ItemFilter, item_rows, query_items};
use crate::utils::required;
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("items", sub)) => export_items(conn, sub),
        _ => Ok(()),
    }
}

fn export_items(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.trim().to_lowercase();
    let out = required(sub, "out")?.trim();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let filter = ItemFilter::from_matches(sub)?;
    let rows = item_rows(conn, &query_items(conn, &filter, None)?)?;

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "id",
            "order_id",
            "order",
            "name",
            "reference",
            "brand",
            "kind",
            "status",
            "cost",
            "target_cost",
            "tax",
            "customs_share",
            "shipping_share",
            "domestic_shipping",
            "total_cost",
            "sale_price",
            "target_price",
            "profit",
        ])?;
        let opt = |d: Option<rust_decimal::Decimal>| d.map(|v| v.to_string()).unwrap_or_default();
        for r in &rows {
            wtr.write_record([
                r.id.to_string(),
                r.order_id.to_string(),
                r.order.clone(),
                r.name.clone(),
                r.reference.clone().unwrap_or_default(),
                r.brand.clone().unwrap_or_default(),
                r.kind.to_string(),
                r.status.to_string(),
                r.cost.to_string(),
                r.target_cost.to_string(),
                r.tax.to_string(),
                r.customs_share.to_string(),
                r.shipping_share.to_string(),
                r.domestic_shipping.to_string(),
                r.total_cost.to_string(),
                opt(r.sale_price),
                r.target_price.to_string(),
                opt(r.profit),
            ])?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    }
    println!("Exported {} item(s) to {}", rows.len(), out);
    Ok(())
}
