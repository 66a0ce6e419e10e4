// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::items::items_for_order;
use crate::commands::orders::get_order;
use crate::pricing::rate_snapshot;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    let mut stmt = conn.prepare("SELECT id FROM orders ORDER BY id")?;
    let ids = stmt.query_map([], |r| r.get::<_, i64>(0))?;
    for id in ids {
        let order = get_order(conn, id?)?;
        let items = items_for_order(conn, order.id)?;

        // 1) Rate snapshots taken before the order's rates were edited.
        // Compared at the stored scale so a later target_minor_units change
        // does not flag every item.
        for item in &items {
            let dp = item.target_cost.scale();
            let now = rate_snapshot(item.cost, order.exchange_rate, order.tax_rate, dp)?;
            if now.target_cost != item.target_cost || now.tax != item.tax {
                issues.push(Issue {
                    kind: "stale_rate_snapshot",
                    detail: format!(
                        "item {} '{}': stored {} / tax {}, current rates give {} / tax {}",
                        item.id, item.name, item.target_cost, item.tax, now.target_cost, now.tax
                    ),
                });
            }
        }

        if items.is_empty() {
            continue;
        }
        let total_cost: Decimal = items.iter().map(|i| i.cost).sum();
        let has_pool = !order.customs_fee.is_zero() || !order.shipping_fee.is_zero();
        if total_cost.is_zero() {
            if has_pool {
                issues.push(Issue {
                    kind: "zero_cost_order",
                    detail: format!(
                        "order {}: items cost nothing, pooled fees cannot be apportioned",
                        order.id
                    ),
                });
            }
            continue;
        }

        // 2) Pools that were never distributed, or changed since
        // Rounded shares may drift by half a cent per item.
        let tolerance = Decimal::new(5, 3) * Decimal::from(items.len());
        let pools = [
            (
                "customs",
                order.customs_fee,
                items.iter().map(|i| i.customs_share).sum::<Decimal>(),
            ),
            (
                "shipping",
                order.shipping_fee,
                items.iter().map(|i| i.shipping_share).sum::<Decimal>(),
            ),
        ];
        for (name, pool, distributed) in pools {
            if (pool - distributed).abs() > tolerance {
                issues.push(Issue {
                    kind: "undistributed_pool",
                    detail: format!(
                        "order {}: {} fee {:.2}, distributed {:.2}",
                        order.id, name, pool, distributed
                    ),
                });
            }
        }
    }
    Ok(issues)
}
