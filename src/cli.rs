// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{ItemKind, ItemStatus};
use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

/// Filters shared by `item list`, `report totals` and `export items`.
fn item_filter_args() -> [Arg; 5] {
    [
        Arg::new("order")
            .long("order")
            .value_parser(value_parser!(i64))
            .help("Only items of this order id"),
        Arg::new("brand").long("brand").help("Only items of this brand"),
        Arg::new("kind")
            .long("kind")
            .value_parser(ItemKind::ALL)
            .help("Only items of this kind"),
        Arg::new("status")
            .long("status")
            .value_parser(ItemStatus::ALL)
            .help("Only items with this status"),
        Arg::new("search")
            .long("search")
            .help("Match item name, reference or order description"),
    ]
}

/// Order fields. `required` is used for `order add`; `order edit` takes the
/// same flags as optional patches.
fn order_field_args(required: bool) -> [Arg; 6] {
    [
        Arg::new("date")
            .long("date")
            .required(required)
            .help("Order date YYYY-MM-DD"),
        Arg::new("description")
            .long("description")
            .required(required)
            .help("Short description of the batch"),
        Arg::new("rate")
            .long("rate")
            .required(required)
            .help("Exchange rate: 1 source unit = RATE target units"),
        Arg::new("tax-rate")
            .long("tax-rate")
            .help("Tax rate as a fraction, e.g. 0.21"),
        Arg::new("customs")
            .long("customs")
            .help("Pooled customs fee for the whole order"),
        Arg::new("shipping")
            .long("shipping")
            .help("Pooled grouped-shipping fee for the whole order"),
    ]
}

fn item_field_args() -> [Arg; 8] {
    [
        Arg::new("name").long("name").help("Item name"),
        Arg::new("cost")
            .long("cost")
            .help("Acquisition cost in source currency"),
        Arg::new("kind")
            .long("kind")
            .value_parser(ItemKind::ALL)
            .help("What the item is"),
        Arg::new("status")
            .long("status")
            .value_parser(ItemStatus::ALL)
            .help("Sale status"),
        Arg::new("brand").long("brand").help("Brand name (must exist)"),
        Arg::new("ref")
            .long("ref")
            .help("External purchase reference, unique"),
        Arg::new("sale-price")
            .long("sale-price")
            .help("Price the item sold for"),
        Arg::new("target-price")
            .long("target-price")
            .help("Objective sale price"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("camlot")
        .version(crate_version!())
        .about("Bulk camera order ledger: landed costs, apportioned fees and profit")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("brand")
                .about("Manage brands")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true).help("Brand name")),
                )
                .subcommand(
                    Command::new("list").arg(Arg::new("search").long("search")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true))),
        )
        .subcommand(
            Command::new("order")
                .about("Manage purchase orders")
                .subcommand(Command::new("add").args(order_field_args(true)))
                .subcommand(
                    Command::new("edit")
                        .about("Edit an order; item rate snapshots are left as they are")
                        .arg(id_arg("Order id"))
                        .args(order_field_args(false)),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("show")
                        .arg(id_arg("Order id"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an order and all of its items")
                        .arg(id_arg("Order id")),
                )
                .subcommand(
                    Command::new("refresh")
                        .about("Re-save every item so it picks up the order's current rates")
                        .arg(id_arg("Order id")),
                ),
        )
        .subcommand(
            Command::new("item")
                .about("Manage items")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .args(item_field_args().map(|a| {
                            let needed = matches!(a.get_id().as_str(), "name" | "cost");
                            a.required(needed)
                        }))
                        .arg(Arg::new("domestic-shipping").long("domestic-shipping")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("Item id"))
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .value_parser(value_parser!(i64))
                                .help("Move the item to another order"),
                        )
                        .args(item_field_args())
                        .arg(Arg::new("domestic-shipping").long("domestic-shipping"))
                        .arg(
                            Arg::new("clear-sale-price")
                                .long("clear-sale-price")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("sale-price"),
                        )
                        .arg(
                            Arg::new("clear-brand")
                                .long("clear-brand")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("brand"),
                        )
                        .arg(
                            Arg::new("clear-ref")
                                .long("clear-ref")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("ref"),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .args(item_filter_args())
                        .arg(
                            Arg::new("page")
                                .long("page")
                                .value_parser(value_parser!(usize))
                                .help("Page number, 1-based"),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(id_arg("Item id"))
                        .args(json_args()),
                )
                .subcommand(Command::new("rm").arg(id_arg("Item id"))),
        )
        .subcommand(
            Command::new("distribute")
                .about("Apportion pooled order fees across items by cost share")
                .arg(
                    Arg::new("pool")
                        .long("pool")
                        .required(true)
                        .value_parser(["customs", "shipping", "all"]),
                )
                .arg(
                    Arg::new("orders")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(i64))
                        .help("Order ids"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregates")
                .subcommand(
                    Command::new("totals")
                        .args(item_filter_args())
                        .args(json_args()),
                )
                .subcommand(Command::new("orders").args(json_args())),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("items")
                    .arg(Arg::new("format").long("format").required(true))
                    .arg(Arg::new("out").long("out").required(true))
                    .args(item_filter_args()),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Stored settings")
                .subcommand(Command::new("list"))
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Consistency checks"))
}
