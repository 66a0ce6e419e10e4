// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

/// One purchase batch. Rates and pooled fees are shared by all its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub exchange_rate: Decimal, // 1 source unit = rate target units
    pub tax_rate: Decimal,
    pub customs_fee: Decimal,
    pub shipping_fee: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Body,
    Lens,
    Complete,
    Other,
}

impl ItemKind {
    pub const ALL: [&'static str; 4] = ["body", "lens", "complete", "other"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Body => "body",
            ItemKind::Lens => "lens",
            ItemKind::Complete => "complete",
            ItemKind::Other => "other",
        }
    }
}

impl FromStr for ItemKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "body" => Ok(ItemKind::Body),
            "lens" => Ok(ItemKind::Lens),
            "complete" => Ok(ItemKind::Complete),
            "other" => Ok(ItemKind::Other),
            _ => Err(LedgerError::UnknownChoice {
                kind: "item kind",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Listed,
    Sold,
    Kept,
    Discarded,
}

impl ItemStatus {
    pub const ALL: [&'static str; 4] = ["listed", "sold", "kept", "discarded"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Listed => "listed",
            ItemStatus::Sold => "sold",
            ItemStatus::Kept => "kept",
            ItemStatus::Discarded => "discarded",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listed" => Ok(ItemStatus::Listed),
            "sold" => Ok(ItemStatus::Sold),
            "kept" => Ok(ItemStatus::Kept),
            "discarded" => Ok(ItemStatus::Discarded),
            _ => Err(LedgerError::UnknownChoice {
                kind: "item status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchased unit. `target_cost` and `tax` are snapshots of the owning
/// order's rates at the last save; the two shares are only written by
/// distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub reference: Option<String>,
    pub brand_id: Option<i64>,
    pub kind: ItemKind,
    pub status: ItemStatus,
    pub cost: Decimal,
    pub target_cost: Decimal,
    pub tax: Decimal,
    pub customs_share: Decimal,
    pub shipping_share: Decimal,
    pub domestic_shipping: Decimal,
    pub sale_price: Option<Decimal>,
    pub target_price: Decimal,
}

impl Item {
    pub fn total_acquisition_cost(&self) -> Decimal {
        self.cost + self.tax + self.shipping_share + self.customs_share + self.domestic_shipping
    }

    /// Domestic shipping is charged against the sale a second time on top
    /// of being part of the acquisition cost.
    pub fn profit(&self) -> Option<Decimal> {
        self.sale_price
            .map(|price| price - self.total_acquisition_cost() - self.domestic_shipping)
    }
}

/// Editable fields of an item. Everything derived from the order is filled
/// in by the save hook.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub order_id: i64,
    pub name: String,
    pub reference: Option<String>,
    pub brand_id: Option<i64>,
    pub kind: ItemKind,
    pub status: ItemStatus,
    pub cost: Decimal,
    pub domestic_shipping: Decimal,
    pub sale_price: Option<Decimal>,
    pub target_price: Decimal,
}

impl ItemDraft {
    pub fn new(order_id: i64, name: impl Into<String>, cost: Decimal) -> Self {
        Self {
            order_id,
            name: name.into(),
            reference: None,
            brand_id: None,
            kind: ItemKind::Other,
            status: ItemStatus::Listed,
            cost,
            domestic_shipping: Decimal::ZERO,
            sale_price: None,
            target_price: Decimal::ZERO,
        }
    }
}

impl From<&Item> for ItemDraft {
    fn from(item: &Item) -> Self {
        Self {
            order_id: item.order_id,
            name: item.name.clone(),
            reference: item.reference.clone(),
            brand_id: item.brand_id,
            kind: item.kind,
            status: item.status,
            cost: item.cost,
            domestic_shipping: item.domestic_shipping,
            sale_price: item.sale_price,
            target_price: item.target_price,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub date: NaiveDate,
    pub description: String,
    pub exchange_rate: Decimal,
    pub tax_rate: Decimal,
    pub customs_fee: Decimal,
    pub shipping_fee: Decimal,
}

impl From<&Order> for OrderDraft {
    fn from(o: &Order) -> Self {
        Self {
            date: o.date,
            description: o.description.clone(),
            exchange_rate: o.exchange_rate,
            tax_rate: o.tax_rate,
            customs_fee: o.customs_fee,
            shipping_fee: o.shipping_fee,
        }
    }
}
