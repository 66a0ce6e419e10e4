// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use camlot::commands::{items, orders, settings};
use camlot::config::{self, Settings};
use camlot::error::LedgerError;
use camlot::models::{ItemDraft, OrderDraft};
use camlot::{cli, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn defaults_when_nothing_stored() {
    let conn = setup();
    let s = Settings::load(&conn).unwrap();
    assert_eq!(s, Settings::default());
    assert_eq!(s.list_per_page, 25);
    assert_eq!(s.default_tax_rate, dec!(0.21));
    assert_eq!(s.target_currency, "JPY");
}

#[test]
fn set_normalises_and_persists() {
    let conn = setup();
    assert_eq!(config::set(&conn, "target_currency", " usd ").unwrap(), "USD");
    assert_eq!(config::set(&conn, "list_per_page", "10").unwrap(), "10");
    let s = Settings::load(&conn).unwrap();
    assert_eq!(s.target_currency, "USD");
    assert_eq!(s.list_per_page, 10);
}

#[test]
fn invalid_values_are_rejected() {
    let conn = setup();
    assert!(config::set(&conn, "target_currency", "YEN!").is_err());
    assert!(config::set(&conn, "list_per_page", "0").is_err());
    assert!(config::set(&conn, "default_tax_rate", "-0.1").is_err());
    let err = config::set(&conn, "theme", "dark").unwrap_err();
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::UnknownSetting("theme".into()))
    );
    assert_eq!(Settings::load(&conn).unwrap(), Settings::default());
}

#[test]
fn target_minor_units_drive_snapshot_rounding() {
    let conn = setup();
    config::set(&conn, "target_minor_units", "2").unwrap();
    let oid = orders::create_order(
        &conn,
        &OrderDraft {
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            description: "USD lot".into(),
            exchange_rate: dec!(1.0837),
            tax_rate: dec!(0),
            customs_fee: dec!(0),
            shipping_fee: dec!(0),
        },
    )
    .unwrap();
    let id = items::save_item(&conn, None, &ItemDraft::new(oid, "Lens", dec!(10.5))).unwrap();
    // 10.5 * 1.0837 = 11.37885
    assert_eq!(items::get_item(&conn, id).unwrap().target_cost, dec!(11.38));
}

#[test]
fn config_set_via_cli() {
    let conn = setup();
    let matches =
        cli::build_cli().get_matches_from(["camlot", "config", "set", "site_title", "Shop"]);
    if let Some(("config", config_m)) = matches.subcommand() {
        settings::handle(&conn, config_m).unwrap();
    } else {
        panic!("no config subcommand");
    }
    assert_eq!(Settings::load(&conn).unwrap().site_title, "Shop");
}
