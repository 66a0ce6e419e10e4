// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::items::{ItemFilter, query_items};
use crate::config::Settings;
use crate::models::Item;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("totals", sub)) => totals_cmd(conn, sub)?,
        Some(("orders", sub)) => orders_cmd(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub items: usize,
    pub total_cost: Decimal,
    pub sale: Decimal,
    pub target: Decimal,
    pub profit: Decimal,
}

impl Totals {
    fn add(&mut self, item: &Item) {
        self.items += 1;
        self.total_cost += item.total_acquisition_cost();
        self.sale += item.sale_price.unwrap_or_default();
        self.target += item.target_price;
    }
}

/// Sums over every item matching `filter`. Profit is summed sale minus
/// summed total cost, so unsold items count against it.
pub fn totals(conn: &Connection, filter: &ItemFilter) -> Result<Totals> {
    let mut t = Totals::default();
    for item in query_items(conn, filter, None)? {
        t.add(&item);
    }
    t.profit = t.sale - t.total_cost;
    Ok(t)
}

fn totals_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = ItemFilter::from_matches(sub)?;
    let t = totals(conn, &filter)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        return Ok(());
    }
    let settings = Settings::load(conn)?;
    let ccy = &settings.source_currency;
    let rows = vec![
        vec!["Items".to_string(), t.items.to_string()],
        vec![format!("Total cost ({})", ccy), format!("{:.2}", t.total_cost)],
        vec![format!("Sale ({})", ccy), format!("{:.2}", t.sale)],
        vec![format!("Target ({})", ccy), format!("{:.2}", t.target)],
        vec![format!("Profit ({})", ccy), format!("{:.2}", t.profit)],
    ];
    println!("{} · Totals", settings.site_title);
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub items: usize,
    pub cost: Decimal,
    pub customs_distributed: Decimal,
    pub shipping_distributed: Decimal,
    pub total_cost: Decimal,
    pub sale: Decimal,
    pub profit: Decimal,
}

/// Per-order rollup, newest order id first.
pub fn order_summaries(conn: &Connection) -> Result<Vec<OrderSummary>> {
    let mut by_order: BTreeMap<i64, OrderSummary> = BTreeMap::new();
    for item in query_items(conn, &ItemFilter::default(), None)? {
        let s = by_order.entry(item.order_id).or_insert(OrderSummary {
            order_id: item.order_id,
            items: 0,
            cost: Decimal::ZERO,
            customs_distributed: Decimal::ZERO,
            shipping_distributed: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            sale: Decimal::ZERO,
            profit: Decimal::ZERO,
        });
        s.items += 1;
        s.cost += item.cost;
        s.customs_distributed += item.customs_share;
        s.shipping_distributed += item.shipping_share;
        s.total_cost += item.total_acquisition_cost();
        s.sale += item.sale_price.unwrap_or_default();
        s.profit = s.sale - s.total_cost;
    }
    Ok(by_order.into_values().rev().collect())
}

fn orders_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = order_summaries(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|s| {
            vec![
                s.order_id.to_string(),
                s.items.to_string(),
                format!("{:.2}", s.cost),
                format!("{:.2}", s.customs_distributed),
                format!("{:.2}", s.shipping_distributed),
                format!("{:.2}", s.total_cost),
                format!("{:.2}", s.sale),
                format!("{:.2}", s.profit),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Order", "Items", "Cost", "Customs", "Shipping", "Total", "Sale", "Profit"],
            rows
        )
    );
    Ok(())
}
