// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::orders::get_order;
use crate::error::LedgerError;
use crate::pricing::apportion;
use crate::utils::{required, stored_decimal};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::str::FromStr;

/// A fee paid once per order and shared out across its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Customs,
    Shipping,
}

impl Pool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::Customs => "customs",
            Pool::Shipping => "shipping",
        }
    }

    fn update_sql(&self) -> &'static str {
        match self {
            Pool::Customs => "UPDATE items SET customs_share=?1 WHERE id=?2",
            Pool::Shipping => "UPDATE items SET shipping_share=?1 WHERE id=?2",
        }
    }
}

impl FromStr for Pool {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customs" => Ok(Pool::Customs),
            "shipping" => Ok(Pool::Shipping),
            _ => Err(LedgerError::UnknownChoice {
                kind: "pool",
                value: s.to_string(),
            }),
        }
    }
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let pools = match required(m, "pool")? {
        "all" => vec![Pool::Customs, Pool::Shipping],
        other => vec![other.parse::<Pool>()?],
    };
    let order_ids: Vec<i64> = m
        .get_many::<i64>("orders")
        .context("missing order ids")?
        .copied()
        .collect();
    for order_id in order_ids {
        for pool in &pools {
            let n = distribute(conn, order_id, *pool)?;
            if n == 0 {
                println!("Order {}: no items to share {} with", order_id, pool.as_str());
            } else {
                println!(
                    "Order {}: {} fee distributed over {} item(s)",
                    order_id,
                    pool.as_str(),
                    n
                );
            }
        }
    }
    Ok(())
}

/// Split the order's `pool` fee across its items by cost share and store
/// each item's part. All rows are written in one transaction; any failure
/// leaves every item as it was.
///
/// Returns the number of items updated. Orders without items, or whose
/// items all cost nothing, are left untouched and return 0.
pub fn distribute(conn: &mut Connection, order_id: i64, pool: Pool) -> Result<usize> {
    let order = get_order(conn, order_id)?;
    let amount = match pool {
        Pool::Customs => order.customs_fee,
        Pool::Shipping => order.shipping_fee,
    };

    let tx = conn.transaction()?;
    let (ids, costs) = {
        let mut stmt = tx.prepare("SELECT id, cost FROM items WHERE order_id=?1 ORDER BY id")?;
        let mut rows = stmt.query(params![order_id])?;
        let mut ids = Vec::new();
        let mut costs: Vec<Decimal> = Vec::new();
        while let Some(r) = rows.next()? {
            let raw: String = r.get(1)?;
            ids.push(r.get::<_, i64>(0)?);
            costs.push(stored_decimal(&raw, "cost")?);
        }
        (ids, costs)
    };

    let Some(shares) = apportion(amount, &costs)? else {
        if !ids.is_empty() {
            tracing::warn!(
                order = order_id,
                pool = pool.as_str(),
                "items sum to zero cost; nothing to apportion against"
            );
        }
        return Ok(0);
    };

    {
        let mut update = tx.prepare_cached(pool.update_sql())?;
        for (id, share) in ids.iter().zip(&shares) {
            update.execute(params![share.to_string(), id])?;
        }
    }
    tx.commit()?;
    tracing::info!(
        order = order_id,
        pool = pool.as_str(),
        amount = %amount,
        items = ids.len(),
        "pool distributed"
    );
    Ok(ids.len())
}
