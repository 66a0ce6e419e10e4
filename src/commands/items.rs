// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::orders::get_order;
use crate::config::Settings;
use crate::error::{LedgerError, ensure_money};
use crate::models::{Item, ItemDraft, ItemKind, ItemStatus};
use crate::pricing::rate_snapshot;
use crate::utils::{
    fmt_opt, id_for_brand, maybe_print_json, optional, parse_money, pretty_table, required,
    stored_decimal,
};
use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

const ITEM_COLUMNS: &str = "i.id, i.order_id, i.name, i.reference, i.brand_id, i.kind, i.status, \
     i.cost, i.target_cost, i.tax, i.customs_share, i.shipping_share, i.domestic_shipping, \
     i.sale_price, i.target_price";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let id = item_id_arg(sub)?;
            let n = conn.execute("DELETE FROM items WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(LedgerError::NotFound(format!("Item {}", id)).into());
            }
            println!("Removed item {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn item_id_arg(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id").copied().context("missing item id")
}

pub fn validate_item(d: &ItemDraft) -> Result<(), LedgerError> {
    if d.name.trim().is_empty() {
        return Err(LedgerError::Required("item name"));
    }
    ensure_money("cost", d.cost)?;
    ensure_money("domestic shipping", d.domestic_shipping)?;
    ensure_money("target price", d.target_price)?;
    if let Some(p) = d.sale_price {
        ensure_money("sale price", p)?;
    }
    Ok(())
}

/// Insert (`id == None`) or update an item, first recomputing the target
/// currency cost and tax from the owning order's current rates.
pub fn save_item(conn: &Connection, id: Option<i64>, d: &ItemDraft) -> Result<i64> {
    let target_dp = Settings::load(conn)?.target_minor_units;
    save_item_with(conn, id, d, target_dp)
}

pub fn save_item_with(
    conn: &Connection,
    id: Option<i64>,
    d: &ItemDraft,
    target_dp: u32,
) -> Result<i64> {
    validate_item(d)?;
    let order = get_order(conn, d.order_id)?;
    let snap = rate_snapshot(d.cost, order.exchange_rate, order.tax_rate, target_dp)?;
    let reference = d
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let id = match id {
        None => {
            conn.execute(
                "INSERT INTO items(order_id, name, reference, brand_id, kind, status, cost,
                                   target_cost, tax, domestic_shipping, sale_price, target_price)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    d.order_id,
                    d.name.trim(),
                    reference,
                    d.brand_id,
                    d.kind.as_str(),
                    d.status.as_str(),
                    d.cost.to_string(),
                    snap.target_cost.to_string(),
                    snap.tax.to_string(),
                    d.domestic_shipping.to_string(),
                    d.sale_price.map(|p| p.to_string()),
                    d.target_price.to_string()
                ],
            )
            .with_context(|| format!("Save item '{}'", d.name.trim()))?;
            conn.last_insert_rowid()
        }
        Some(id) => {
            // Shares belong to the pool of the order they were distributed
            // from; moving an item to another order clears them.
            let n = conn
                .execute(
                    "UPDATE items SET
                        customs_share = CASE WHEN order_id=?1 THEN customs_share ELSE '0' END,
                        shipping_share = CASE WHEN order_id=?1 THEN shipping_share ELSE '0' END,
                        order_id=?1, name=?2, reference=?3, brand_id=?4, kind=?5, status=?6,
                        cost=?7, target_cost=?8, tax=?9, domestic_shipping=?10,
                        sale_price=?11, target_price=?12
                     WHERE id=?13",
                    params![
                        d.order_id,
                        d.name.trim(),
                        reference,
                        d.brand_id,
                        d.kind.as_str(),
                        d.status.as_str(),
                        d.cost.to_string(),
                        snap.target_cost.to_string(),
                        snap.tax.to_string(),
                        d.domestic_shipping.to_string(),
                        d.sale_price.map(|p| p.to_string()),
                        d.target_price.to_string(),
                        id
                    ],
                )
                .with_context(|| format!("Save item {}", id))?;
            if n == 0 {
                return Err(LedgerError::NotFound(format!("Item {}", id)).into());
            }
            id
        }
    };
    tracing::debug!(
        item = id,
        order = order.id,
        target_cost = %snap.target_cost,
        tax = %snap.tax,
        "item saved"
    );
    Ok(id)
}

fn item_from_row(r: &Row<'_>) -> Result<Item> {
    let kind: String = r.get(5)?;
    let status: String = r.get(6)?;
    let dec = |idx: usize, what: &str| -> Result<Decimal> {
        let raw: String = r.get(idx)?;
        stored_decimal(&raw, what)
    };
    let sale_price: Option<String> = r.get(13)?;
    Ok(Item {
        id: r.get(0)?,
        order_id: r.get(1)?,
        name: r.get(2)?,
        reference: r.get(3)?,
        brand_id: r.get(4)?,
        kind: kind.parse::<ItemKind>()?,
        status: status.parse::<ItemStatus>()?,
        cost: dec(7, "cost")?,
        target_cost: dec(8, "target cost")?,
        tax: dec(9, "tax")?,
        customs_share: dec(10, "customs share")?,
        shipping_share: dec(11, "shipping share")?,
        domestic_shipping: dec(12, "domestic shipping")?,
        sale_price: sale_price
            .map(|s| stored_decimal(&s, "sale price"))
            .transpose()?,
        target_price: dec(14, "target price")?,
    })
}

pub fn get_item(conn: &Connection, id: i64) -> Result<Item> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM items i WHERE i.id=?1", ITEM_COLUMNS))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => item_from_row(r),
        None => Err(LedgerError::NotFound(format!("Item {}", id)).into()),
    }
}

pub fn items_for_order(conn: &Connection, order_id: i64) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM items i WHERE i.order_id=?1 ORDER BY i.name, i.id",
        ITEM_COLUMNS
    ))?;
    let mut rows = stmt.query(params![order_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(item_from_row(r)?);
    }
    Ok(out)
}

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub order_id: Option<i64>,
    pub brand: Option<String>,
    pub kind: Option<ItemKind>,
    pub status: Option<ItemStatus>,
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            order_id: m.get_one::<i64>("order").copied(),
            brand: optional(m, "brand").map(str::to_string),
            kind: optional(m, "kind").map(str::parse).transpose()?,
            status: optional(m, "status").map(str::parse).transpose()?,
            search: optional(m, "search").map(str::to_string),
        })
    }
}

const ITEM_JOINS: &str = "FROM items i
     JOIN orders o ON i.order_id=o.id
     LEFT JOIN brands b ON i.brand_id=b.id
     WHERE 1=1";

fn filter_clause(filter: &ItemFilter) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(order_id) = filter.order_id {
        sql.push_str(" AND i.order_id=?");
        values.push(Value::Integer(order_id));
    }
    if let Some(brand) = &filter.brand {
        sql.push_str(" AND b.name=?");
        values.push(Value::Text(brand.clone()));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND i.kind=?");
        values.push(Value::Text(kind.as_str().to_string()));
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND i.status=?");
        values.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(search) = &filter.search {
        sql.push_str(" AND (i.name LIKE ? OR i.reference LIKE ? OR o.description LIKE ?)");
        let pat = format!("%{}%", search);
        for _ in 0..3 {
            values.push(Value::Text(pat.clone()));
        }
    }
    (sql, values)
}

/// Items matching `filter`, ordered by name. `page` is `(page_number,
/// per_page)` with 1-based page numbers.
pub fn query_items(
    conn: &Connection,
    filter: &ItemFilter,
    page: Option<(usize, usize)>,
) -> Result<Vec<Item>> {
    let (clause, mut values) = filter_clause(filter);
    let mut sql = format!("SELECT {} {}{} ORDER BY i.name, i.id", ITEM_COLUMNS, ITEM_JOINS, clause);
    if let Some((page, per_page)) = page {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        sql.push_str(" LIMIT ? OFFSET ?");
        values.push(Value::Integer(i64::try_from(per_page)?));
        values.push(Value::Integer(i64::try_from(offset)?));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(values.iter()))?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(item_from_row(r)?);
    }
    Ok(out)
}

pub fn count_items(conn: &Connection, filter: &ItemFilter) -> Result<usize> {
    let (clause, values) = filter_clause(filter);
    let n: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {}{}", ITEM_JOINS, clause),
        rusqlite::params_from_iter(values.iter()),
        |r| r.get(0),
    )?;
    Ok(usize::try_from(n)?)
}

/// An item flattened for display and export, with derived values filled in.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRow {
    pub id: i64,
    pub order_id: i64,
    pub order: String,
    pub name: String,
    pub reference: Option<String>,
    pub brand: Option<String>,
    pub kind: ItemKind,
    pub status: ItemStatus,
    pub cost: Decimal,
    pub target_cost: Decimal,
    pub tax: Decimal,
    pub customs_share: Decimal,
    pub shipping_share: Decimal,
    pub domestic_shipping: Decimal,
    pub total_cost: Decimal,
    pub sale_price: Option<Decimal>,
    pub target_price: Decimal,
    pub profit: Option<Decimal>,
}

pub fn item_rows(conn: &Connection, items: &[Item]) -> Result<Vec<ItemRow>> {
    let mut brands: HashMap<i64, String> = HashMap::new();
    let mut stmt = conn.prepare("SELECT id, name FROM brands")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    for row in rows {
        let (id, name) = row?;
        brands.insert(id, name);
    }
    let mut orders: HashMap<i64, String> = HashMap::new();
    let mut stmt = conn.prepare("SELECT id, description FROM orders")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    for row in rows {
        let (id, desc) = row?;
        orders.insert(id, desc);
    }

    Ok(items
        .iter()
        .map(|it| ItemRow {
            id: it.id,
            order_id: it.order_id,
            order: orders.get(&it.order_id).cloned().unwrap_or_default(),
            name: it.name.clone(),
            reference: it.reference.clone(),
            brand: it.brand_id.and_then(|b| brands.get(&b).cloned()),
            kind: it.kind,
            status: it.status,
            cost: it.cost,
            target_cost: it.target_cost,
            tax: it.tax,
            customs_share: it.customs_share,
            shipping_share: it.shipping_share,
            domestic_shipping: it.domestic_shipping,
            total_cost: it.total_acquisition_cost(),
            sale_price: it.sale_price,
            target_price: it.target_price,
            profit: it.profit(),
        })
        .collect())
}

fn apply_fields(conn: &Connection, sub: &clap::ArgMatches, d: &mut ItemDraft) -> Result<()> {
    if let Some(order_id) = sub.get_one::<i64>("order") {
        d.order_id = *order_id;
    }
    if let Some(s) = optional(sub, "name") {
        d.name = s.to_string();
    }
    if let Some(s) = optional(sub, "cost") {
        d.cost = parse_money("cost", s)?;
    }
    if let Some(s) = optional(sub, "kind") {
        d.kind = s.parse()?;
    }
    if let Some(s) = optional(sub, "status") {
        d.status = s.parse()?;
    }
    if let Some(s) = optional(sub, "brand") {
        d.brand_id = Some(id_for_brand(conn, s)?);
    }
    if let Some(s) = optional(sub, "ref") {
        d.reference = Some(s.to_string());
    }
    if let Some(s) = optional(sub, "sale-price") {
        d.sale_price = Some(parse_money("sale price", s)?);
    }
    if let Some(s) = optional(sub, "target-price") {
        d.target_price = parse_money("target price", s)?;
    }
    if let Some(s) = optional(sub, "domestic-shipping") {
        d.domestic_shipping = parse_money("domestic shipping", s)?;
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let order_id = sub
        .get_one::<i64>("order")
        .copied()
        .context("missing --order")?;
    let name = required(sub, "name")?;
    let cost = parse_money("cost", required(sub, "cost")?)?;
    let mut d = ItemDraft::new(order_id, name.trim(), cost);
    apply_fields(conn, sub, &mut d)?;
    let id = save_item(conn, None, &d)?;
    let item = get_item(conn, id)?;
    let settings = Settings::load(conn)?;
    println!(
        "Added item {} '{}' to order {}: {:.2} {} -> {} {} (tax {:.2})",
        id,
        item.name,
        item.order_id,
        item.cost,
        settings.source_currency,
        item.target_cost,
        settings.target_currency,
        item.tax
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = item_id_arg(sub)?;
    let current = get_item(conn, id)?;
    let mut d = ItemDraft::from(&current);
    apply_fields(conn, sub, &mut d)?;
    if sub.get_flag("clear-sale-price") {
        d.sale_price = None;
    }
    if sub.get_flag("clear-brand") {
        d.brand_id = None;
    }
    if sub.get_flag("clear-ref") {
        d.reference = None;
    }
    save_item(conn, Some(id), &d)?;
    println!("Updated item {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let filter = ItemFilter::from_matches(sub)?;
    let page = sub.get_one::<usize>("page").copied().unwrap_or(1).max(1);
    let total = count_items(conn, &filter)?;
    let items = query_items(conn, &filter, Some((page, settings.list_per_page)))?;
    let data = item_rows(conn, &items)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let pages = total.div_ceil(settings.list_per_page).max(1);
    let rows = data
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.brand.clone().unwrap_or_default(),
                r.name.clone(),
                r.order.clone(),
                r.kind.to_string(),
                r.status.to_string(),
                format!("{:.2}", r.total_cost),
                format!("{:.2}", r.target_price),
                fmt_opt(r.sale_price),
                r.profit
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "on sale".to_string()),
            ]
        })
        .collect();
    let ccy = &settings.source_currency;
    let total_hdr = format!("Total cost ({})", ccy);
    let target_hdr = format!("Target ({})", ccy);
    let sale_hdr = format!("Sale ({})", ccy);
    let profit_hdr = format!("Profit ({})", ccy);
    println!(
        "{} · Items (page {}/{}, {} total)",
        settings.site_title, page, pages, total
    );
    println!(
        "{}",
        pretty_table(
            &[
                "ID",
                "Brand",
                "Name",
                "Order",
                "Kind",
                "Status",
                &total_hdr,
                &target_hdr,
                &sale_hdr,
                &profit_hdr
            ],
            rows
        )
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = item_id_arg(sub)?;
    let item = get_item(conn, id)?;
    let rows = item_rows(conn, std::slice::from_ref(&item))?;
    let Some(row) = rows.into_iter().next() else {
        return Err(LedgerError::NotFound(format!("Item {}", id)).into());
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &row)? {
        return Ok(());
    }
    let settings = Settings::load(conn)?;
    let src = &settings.source_currency;
    let data = vec![
        vec!["Name".into(), row.name.clone()],
        vec!["Order".into(), format!("{} ({})", row.order, row.order_id)],
        vec!["Brand".into(), row.brand.clone().unwrap_or_default()],
        vec!["Reference".into(), row.reference.clone().unwrap_or_default()],
        vec!["Kind".into(), row.kind.to_string()],
        vec!["Status".into(), row.status.to_string()],
        vec!["Cost".into(), crate::utils::fmt_money(&row.cost, src)],
        vec![
            format!("Cost ({})", settings.target_currency),
            row.target_cost.to_string(),
        ],
        vec!["Tax".into(), crate::utils::fmt_money(&row.tax, src)],
        vec!["Customs share".into(), crate::utils::fmt_money(&row.customs_share, src)],
        vec!["Shipping share".into(), crate::utils::fmt_money(&row.shipping_share, src)],
        vec![
            "Domestic shipping".into(),
            crate::utils::fmt_money(&row.domestic_shipping, src),
        ],
        vec!["Total cost".into(), crate::utils::fmt_money(&row.total_cost, src)],
        vec!["Target price".into(), crate::utils::fmt_money(&row.target_price, src)],
        vec!["Sale price".into(), fmt_opt(row.sale_price)],
        vec!["Profit".into(), fmt_opt(row.profit)],
    ];
    println!("{}", pretty_table(&["Field", "Value"], data));
    Ok(())
}
