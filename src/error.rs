// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain errors raised before anything touches the database.
///
/// Command handlers work in `anyhow::Result`; these convert into it with `?`
/// and keep a stable message for the CLI.
#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: Decimal },

    #[error("{0} is required")]
    Required(&'static str),

    #[error("exchange rate must be greater than zero (got {0})")]
    NonPositiveRate(Decimal),

    #[error("Unknown {kind} '{value}'")]
    UnknownChoice { kind: &'static str, value: String },

    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("Invalid value '{value}' for setting {key}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("{field} must be below {limit} (got {value})")]
    TooLarge {
        field: &'static str,
        value: Decimal,
        limit: Decimal,
    },
}

/// Money amounts hold at most 8 integer digits (10 digits, 2 decimals).
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
/// Exchange rates hold at most 6 integer digits (10 digits, 4 decimals).
pub const RATE_LIMIT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Tax rates hold at most 3 integer digits (5 digits, 2 decimals).
pub const TAX_RATE_LIMIT: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

pub fn ensure_non_negative(field: &'static str, value: Decimal) -> Result<Decimal, LedgerError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LedgerError::Negative { field, value });
    }
    Ok(value)
}

pub fn ensure_below(
    field: &'static str,
    value: Decimal,
    limit: Decimal,
) -> Result<Decimal, LedgerError> {
    if value.abs() >= limit {
        return Err(LedgerError::TooLarge {
            field,
            value,
            limit,
        });
    }
    Ok(value)
}

/// Non-negative and within [`MONEY_LIMIT`].
pub fn ensure_money(field: &'static str, value: Decimal) -> Result<Decimal, LedgerError> {
    ensure_non_negative(field, value)?;
    ensure_below(field, value, MONEY_LIMIT)
}
