// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure cost arithmetic: rate snapshots taken when an item is saved and the
//! proportional split of pooled order fees. Nothing here touches SQLite.

use crate::error::LedgerError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of the source currency (tax, apportioned shares).
pub const MONEY_DP: u32 = 2;

/// Round half-up to `dp` places. Money in this ledger is never negative,
/// so away-from-zero is half-up.
pub fn round_money(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSnapshot {
    pub target_cost: Decimal,
    pub tax: Decimal,
}

/// Cost in the target currency and tax owed, from the order rates in force
/// when the item is saved.
pub fn rate_snapshot(
    cost: Decimal,
    exchange_rate: Decimal,
    tax_rate: Decimal,
    target_dp: u32,
) -> Result<RateSnapshot, LedgerError> {
    let target = cost
        .checked_mul(exchange_rate)
        .ok_or(LedgerError::Overflow("target currency cost"))?;
    let tax = cost
        .checked_mul(tax_rate)
        .ok_or(LedgerError::Overflow("tax"))?;
    Ok(RateSnapshot {
        target_cost: round_money(target, target_dp),
        tax: round_money(tax, MONEY_DP),
    })
}

/// Split `pool` across `weights` in proportion to each weight's share of the
/// total. Every share is rounded on its own; the rounded shares are not
/// reconciled against the pool.
///
/// Returns `None` when there is nothing to split against: no weights, or
/// weights summing to zero.
pub fn apportion(pool: Decimal, weights: &[Decimal]) -> Result<Option<Vec<Decimal>>, LedgerError> {
    if weights.is_empty() {
        return Ok(None);
    }
    let mut total = Decimal::ZERO;
    for w in weights {
        total = total
            .checked_add(*w)
            .ok_or(LedgerError::Overflow("order cost total"))?;
    }
    if total.is_zero() {
        return Ok(None);
    }

    let mut shares = Vec::with_capacity(weights.len());
    for w in weights {
        let share = pool
            .checked_mul(*w)
            .and_then(|v| v.checked_div(total))
            .ok_or(LedgerError::Overflow("apportioned share"))?;
        shares.push(round_money(share, MONEY_DP));
    }
    Ok(Some(shares))
}
