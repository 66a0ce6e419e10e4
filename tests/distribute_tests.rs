// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use camlot::commands::distribute::{self, Pool};
use camlot::commands::{items, orders};
use camlot::models::{ItemDraft, OrderDraft};
use camlot::{cli, db};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn order_with(conn: &Connection, customs: Decimal, shipping: Decimal) -> i64 {
    orders::create_order(
        conn,
        &OrderDraft {
            date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            description: "Buyee batch".into(),
            exchange_rate: dec!(160),
            tax_rate: dec!(0.10),
            customs_fee: customs,
            shipping_fee: shipping,
        },
    )
    .unwrap()
}

fn shares(conn: &Connection, order_id: i64) -> Vec<(Decimal, Decimal)> {
    items::items_for_order(conn, order_id)
        .unwrap()
        .into_iter()
        .map(|i| (i.customs_share, i.shipping_share))
        .collect()
}

#[test]
fn worked_example_end_to_end() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(30), dec!(20));
    let a = items::save_item(&conn, None, &ItemDraft::new(oid, "A", dec!(100))).unwrap();
    let b = items::save_item(&conn, None, &ItemDraft::new(oid, "B", dec!(300))).unwrap();

    assert_eq!(distribute::distribute(&mut conn, oid, Pool::Customs).unwrap(), 2);
    assert_eq!(distribute::distribute(&mut conn, oid, Pool::Shipping).unwrap(), 2);

    let ia = items::get_item(&conn, a).unwrap();
    assert_eq!(ia.target_cost, dec!(16000));
    assert_eq!(ia.tax, dec!(10));
    assert_eq!(ia.customs_share, dec!(7.5));
    assert_eq!(ia.shipping_share, dec!(5));

    let ib = items::get_item(&conn, b).unwrap();
    assert_eq!(ib.target_cost, dec!(48000));
    assert_eq!(ib.tax, dec!(30));
    assert_eq!(ib.customs_share, dec!(22.5));
    assert_eq!(ib.shipping_share, dec!(15));
}

#[test]
fn only_the_named_pool_is_written() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(30), dec!(20));
    items::save_item(&conn, None, &ItemDraft::new(oid, "A", dec!(100))).unwrap();
    distribute::distribute(&mut conn, oid, Pool::Customs).unwrap();
    assert_eq!(shares(&conn, oid), vec![(dec!(30), dec!(0))]);
}

#[test]
fn empty_order_is_a_silent_no_op() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(30), dec!(20));
    assert_eq!(distribute::distribute(&mut conn, oid, Pool::Customs).unwrap(), 0);
    assert!(shares(&conn, oid).is_empty());
}

#[test]
fn zero_cost_items_are_left_untouched() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(30), dec!(20));
    let id = items::save_item(&conn, None, &ItemDraft::new(oid, "Gift", dec!(0))).unwrap();
    conn.execute(
        "UPDATE items SET customs_share='1.23' WHERE id=?1",
        params![id],
    )
    .unwrap();
    assert_eq!(distribute::distribute(&mut conn, oid, Pool::Customs).unwrap(), 0);
    assert_eq!(shares(&conn, oid), vec![(dec!(1.23), dec!(0))]);
}

#[test]
fn repeated_distribution_does_not_accumulate() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(10), dec!(0));
    for name in ["A", "B", "C"] {
        items::save_item(&conn, None, &ItemDraft::new(oid, name, dec!(1))).unwrap();
    }
    distribute::distribute(&mut conn, oid, Pool::Customs).unwrap();
    let first = shares(&conn, oid);
    distribute::distribute(&mut conn, oid, Pool::Customs).unwrap();
    assert_eq!(shares(&conn, oid), first);
    assert_eq!(first[0].0, dec!(3.33));
}

#[test]
fn zero_pool_clears_earlier_shares() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(30), dec!(0));
    items::save_item(&conn, None, &ItemDraft::new(oid, "A", dec!(50))).unwrap();
    distribute::distribute(&mut conn, oid, Pool::Customs).unwrap();
    assert_eq!(shares(&conn, oid), vec![(dec!(30), dec!(0))]);

    let mut od = OrderDraft::from(&orders::get_order(&conn, oid).unwrap());
    od.customs_fee = dec!(0);
    orders::update_order(&conn, oid, &od).unwrap();
    distribute::distribute(&mut conn, oid, Pool::Customs).unwrap();
    assert_eq!(shares(&conn, oid), vec![(dec!(0), dec!(0))]);
}

#[test]
fn shares_sum_close_to_pool() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(97.13), dec!(0));
    let costs = [dec!(12.99), dec!(45), dec!(7.31), dec!(120), dec!(0.5)];
    for (n, c) in costs.iter().enumerate() {
        items::save_item(&conn, None, &ItemDraft::new(oid, format!("i{}", n), *c)).unwrap();
    }
    distribute::distribute(&mut conn, oid, Pool::Customs).unwrap();
    let sum: Decimal = shares(&conn, oid).iter().map(|s| s.0).sum();
    assert!((dec!(97.13) - sum).abs() <= dec!(0.005) * Decimal::from(costs.len()));
}

#[test]
fn missing_order_is_an_error() {
    let mut conn = setup();
    assert!(distribute::distribute(&mut conn, 99, Pool::Shipping).is_err());
}

#[test]
fn cli_all_pools_over_several_orders() {
    let mut conn = setup();
    let o1 = order_with(&conn, dec!(30), dec!(20));
    let o2 = order_with(&conn, dec!(8), dec!(4));
    items::save_item(&conn, None, &ItemDraft::new(o1, "A", dec!(100))).unwrap();
    items::save_item(&conn, None, &ItemDraft::new(o2, "B", dec!(10))).unwrap();

    let (s1, s2) = (o1.to_string(), o2.to_string());
    let matches =
        cli::build_cli().get_matches_from(["camlot", "distribute", "--pool", "all", &s1, &s2]);
    if let Some(("distribute", m)) = matches.subcommand() {
        distribute::handle(&mut conn, m).unwrap();
    } else {
        panic!("no distribute subcommand");
    }
    assert_eq!(shares(&conn, o1), vec![(dec!(30), dec!(20))]);
    assert_eq!(shares(&conn, o2), vec![(dec!(8), dec!(4))]);
}

#[test]
fn pool_names_parse() {
    assert_eq!(" Customs ".parse::<Pool>().unwrap(), Pool::Customs);
    assert_eq!("shipping".parse::<Pool>().unwrap(), Pool::Shipping);
    assert!("freight".parse::<Pool>().is_err());
}

#[test]
fn failure_mid_batch_leaves_every_share_untouched() {
    let mut conn = setup();
    let oid = order_with(&conn, dec!(30), dec!(0));
    let a = items::save_item(&conn, None, &ItemDraft::new(oid, "A", dec!(100))).unwrap();
    let b = items::save_item(&conn, None, &ItemDraft::new(oid, "B", dec!(300))).unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER block_b BEFORE UPDATE OF customs_share ON items
         WHEN NEW.id = {b}
         BEGIN SELECT RAISE(ABORT, 'blocked'); END;"
    ))
    .unwrap();

    assert!(distribute::distribute(&mut conn, oid, Pool::Customs).is_err());
    assert_eq!(items::get_item(&conn, a).unwrap().customs_share, dec!(0));
    assert_eq!(items::get_item(&conn, b).unwrap().customs_share, dec!(0));
}
