// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::items::{item_rows, items_for_order, save_item_with};
use crate::config::Settings;
use crate::error::{
    LedgerError, RATE_LIMIT, TAX_RATE_LIMIT, ensure_below, ensure_money, ensure_non_negative,
};
use crate::models::{ItemDraft, Order, OrderDraft};
use crate::utils::{
    fmt_opt, maybe_print_json, optional, parse_date, parse_decimal, parse_money, pretty_table,
    required, stored_decimal,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let id = order_id_arg(sub)?;
            let n = delete_order(conn, id)?;
            println!("Removed order {} and {} item(s)", id, n);
        }
        Some(("refresh", sub)) => {
            let id = order_id_arg(sub)?;
            let n = refresh_items(conn, id)?;
            println!("Re-saved {} item(s) of order {} with current rates", n, id);
        }
        _ => {}
    }
    Ok(())
}

fn order_id_arg(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id")
        .copied()
        .context("missing order id")
}

pub fn validate_order(d: &OrderDraft) -> Result<(), LedgerError> {
    if d.description.trim().is_empty() {
        return Err(LedgerError::Required("description"));
    }
    if d.exchange_rate <= rust_decimal::Decimal::ZERO {
        return Err(LedgerError::NonPositiveRate(d.exchange_rate));
    }
    ensure_below("exchange rate", d.exchange_rate, RATE_LIMIT)?;
    ensure_non_negative("tax rate", d.tax_rate)?;
    ensure_below("tax rate", d.tax_rate, TAX_RATE_LIMIT)?;
    ensure_money("customs fee", d.customs_fee)?;
    ensure_money("shipping fee", d.shipping_fee)?;
    Ok(())
}

pub fn create_order(conn: &Connection, d: &OrderDraft) -> Result<i64> {
    validate_order(d)?;
    conn.execute(
        "INSERT INTO orders(date, description, exchange_rate, tax_rate, customs_fee, shipping_fee)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            d.date.to_string(),
            d.description.trim(),
            d.exchange_rate.to_string(),
            d.tax_rate.to_string(),
            d.customs_fee.to_string(),
            d.shipping_fee.to_string()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(order = id, "order created");
    Ok(id)
}

/// Rewrites the order row only. Items keep the rate snapshot taken when they
/// were last saved; `refresh_items` brings them up to date.
pub fn update_order(conn: &Connection, id: i64, d: &OrderDraft) -> Result<()> {
    validate_order(d)?;
    let n = conn.execute(
        "UPDATE orders SET date=?1, description=?2, exchange_rate=?3, tax_rate=?4,
                customs_fee=?5, shipping_fee=?6
         WHERE id=?7",
        params![
            d.date.to_string(),
            d.description.trim(),
            d.exchange_rate.to_string(),
            d.tax_rate.to_string(),
            d.customs_fee.to_string(),
            d.shipping_fee.to_string(),
            id
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::NotFound(format!("Order {}", id)).into());
    }
    Ok(())
}

pub fn get_order(conn: &Connection, id: i64) -> Result<Order> {
    let row: Option<(String, String, String, String, String, String)> = conn
        .query_row(
            "SELECT date, description, exchange_rate, tax_rate, customs_fee, shipping_fee
             FROM orders WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                ))
            },
        )
        .optional()?;
    let (date, description, rate, tax, customs, shipping) =
        row.ok_or_else(|| LedgerError::NotFound(format!("Order {}", id)))?;
    Ok(Order {
        id,
        date: parse_date(&date)?,
        description,
        exchange_rate: stored_decimal(&rate, "exchange rate")?,
        tax_rate: stored_decimal(&tax, "tax rate")?,
        customs_fee: stored_decimal(&customs, "customs fee")?,
        shipping_fee: stored_decimal(&shipping, "shipping fee")?,
    })
}

/// Returns the number of items removed along with the order.
pub fn delete_order(conn: &Connection, id: i64) -> Result<i64> {
    let items: i64 = conn.query_row(
        "SELECT COUNT(*) FROM items WHERE order_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    let n = conn.execute("DELETE FROM orders WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::NotFound(format!("Order {}", id)).into());
    }
    tracing::info!(order = id, items, "order deleted");
    Ok(items)
}

/// Re-run the save hook on every item of the order inside one transaction.
pub fn refresh_items(conn: &mut Connection, id: i64) -> Result<usize> {
    let target_dp = Settings::load(conn)?.target_minor_units;
    let tx = conn.transaction()?;
    get_order(&tx, id)?;
    let items = items_for_order(&tx, id)?;
    for item in &items {
        save_item_with(&tx, Some(item.id), &ItemDraft::from(item), target_dp)?;
    }
    tx.commit()?;
    tracing::info!(order = id, items = items.len(), "rate snapshots refreshed");
    Ok(items.len())
}

#[derive(Debug, Serialize)]
pub struct OrderRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub exchange_rate: String,
    pub tax_rate: String,
    pub customs_fee: String,
    pub shipping_fee: String,
    pub items: i64,
}

pub fn list_orders(conn: &Connection) -> Result<Vec<OrderRow>> {
    let mut stmt = conn.prepare(
        "SELECT o.id, o.date, o.description, o.exchange_rate, o.tax_rate, o.customs_fee,
                o.shipping_fee, COUNT(i.id)
         FROM orders o LEFT JOIN items i ON i.order_id=o.id
         GROUP BY o.id ORDER BY o.date DESC, o.id DESC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(OrderRow {
            id: r.get(0)?,
            date: r.get(1)?,
            description: r.get(2)?,
            exchange_rate: r.get(3)?,
            tax_rate: r.get(4)?,
            customs_fee: r.get(5)?,
            shipping_fee: r.get(6)?,
            items: r.get(7)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let d = OrderDraft {
        date: parse_date(required(sub, "date")?)?,
        description: required(sub, "description")?.trim().to_string(),
        exchange_rate: parse_decimal(required(sub, "rate")?)?,
        tax_rate: match optional(sub, "tax-rate") {
            Some(s) => parse_money("tax rate", s)?,
            None => settings.default_tax_rate,
        },
        customs_fee: optional(sub, "customs")
            .map(|s| parse_money("customs fee", s))
            .transpose()?
            .unwrap_or_default(),
        shipping_fee: optional(sub, "shipping")
            .map(|s| parse_money("shipping fee", s))
            .transpose()?
            .unwrap_or_default(),
    };
    let id = create_order(conn, &d)?;
    println!(
        "Added order {} '{}' ({} @ {} {}/{})",
        id,
        d.description,
        d.date,
        d.exchange_rate,
        settings.target_currency,
        settings.source_currency
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = order_id_arg(sub)?;
    let mut d = OrderDraft::from(&get_order(conn, id)?);
    if let Some(s) = optional(sub, "date") {
        d.date = parse_date(s)?;
    }
    if let Some(s) = optional(sub, "description") {
        d.description = s.to_string();
    }
    if let Some(s) = optional(sub, "rate") {
        d.exchange_rate = parse_decimal(s)?;
    }
    if let Some(s) = optional(sub, "tax-rate") {
        d.tax_rate = parse_money("tax rate", s)?;
    }
    if let Some(s) = optional(sub, "customs") {
        d.customs_fee = parse_money("customs fee", s)?;
    }
    if let Some(s) = optional(sub, "shipping") {
        d.shipping_fee = parse_money("shipping fee", s)?;
    }
    update_order(conn, id, &d)?;
    println!("Updated order {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = list_orders(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let settings = Settings::load(conn)?;
        let rows = data
            .iter()
            .map(|o| {
                vec![
                    o.id.to_string(),
                    o.date.clone(),
                    o.description.clone(),
                    o.exchange_rate.clone(),
                    o.tax_rate.clone(),
                    o.customs_fee.clone(),
                    o.shipping_fee.clone(),
                    o.items.to_string(),
                ]
            })
            .collect();
        println!("{} · Orders", settings.site_title);
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Rate", "Tax", "Customs", "Shipping", "Items"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct OrderDetail {
    order: Order,
    items: Vec<crate::commands::items::ItemRow>,
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = order_id_arg(sub)?;
    let order = get_order(conn, id)?;
    let items = item_rows(conn, &items_for_order(conn, id)?)?;
    let detail = OrderDetail { order, items };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &detail)? {
        return Ok(());
    }
    let settings = Settings::load(conn)?;
    let o = &detail.order;
    println!(
        "Order {} · {} · {}\nRate {} {}/{} · Tax {} · Customs {:.2} · Shipping {:.2}",
        o.id,
        o.date,
        o.description,
        o.exchange_rate,
        settings.target_currency,
        settings.source_currency,
        o.tax_rate,
        o.customs_fee,
        o.shipping_fee
    );
    let rows = detail
        .items
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.kind.to_string(),
                format!("{:.2}", r.cost),
                r.target_cost.to_string(),
                format!("{:.2}", r.tax),
                format!("{:.2}", r.customs_share),
                format!("{:.2}", r.shipping_share),
                format!("{:.2}", r.total_cost),
                fmt_opt(r.profit),
            ]
        })
        .collect();
    let target_hdr = format!("Cost ({})", settings.target_currency);
    println!(
        "{}",
        pretty_table(
            &[
                "ID",
                "Name",
                "Kind",
                "Cost",
                &target_hdr,
                "Tax",
                "Customs",
                "Shipping",
                "Total",
                "Profit"
            ],
            rows
        )
    );
    Ok(())
}
