// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use camlot::commands::items::{self, ItemFilter};
use camlot::commands::{brands, distribute, orders, reports};
use camlot::models::{ItemDraft, ItemKind, ItemStatus, OrderDraft};
use camlot::{cli, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> (Connection, i64) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let oid = orders::create_order(
        &conn,
        &OrderDraft {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            description: "June Buyee haul".into(),
            exchange_rate: dec!(160),
            tax_rate: dec!(0.10),
            customs_fee: dec!(30),
            shipping_fee: dec!(20),
        },
    )
    .unwrap();
    let canon = brands::add_brand(&conn, "Canon").unwrap();

    let mut a = ItemDraft::new(oid, "AE-1 Program", dec!(100));
    a.kind = ItemKind::Body;
    a.brand_id = Some(canon);
    a.status = ItemStatus::Sold;
    a.sale_price = Some(dec!(200));
    a.target_price = dec!(180);
    items::save_item(&conn, None, &a).unwrap();

    let mut b = ItemDraft::new(oid, "FD 50mm", dec!(300));
    b.kind = ItemKind::Lens;
    b.target_price = dec!(400);
    items::save_item(&conn, None, &b).unwrap();

    distribute::distribute(&mut conn, oid, distribute::Pool::Customs).unwrap();
    distribute::distribute(&mut conn, oid, distribute::Pool::Shipping).unwrap();
    (conn, oid)
}

#[test]
fn totals_over_all_items() {
    let (conn, _) = setup();
    let t = reports::totals(&conn, &ItemFilter::default()).unwrap();
    assert_eq!(t.items, 2);
    // A: 100 + 10 + 7.5 + 5 = 122.5 ; B: 300 + 30 + 22.5 + 15 = 367.5
    assert_eq!(t.total_cost, dec!(490));
    assert_eq!(t.sale, dec!(200));
    assert_eq!(t.target, dec!(580));
    // unsold B still counts: 200 - 490
    assert_eq!(t.profit, dec!(-290));
}

#[test]
fn totals_respect_filters() {
    let (conn, _) = setup();
    let lenses = ItemFilter {
        kind: Some(ItemKind::Lens),
        ..Default::default()
    };
    let t = reports::totals(&conn, &lenses).unwrap();
    assert_eq!(t.items, 1);
    assert_eq!(t.total_cost, dec!(367.5));
    assert_eq!(t.profit, dec!(-367.5));

    let canon = ItemFilter {
        brand: Some("Canon".into()),
        ..Default::default()
    };
    assert_eq!(reports::totals(&conn, &canon).unwrap().items, 1);

    let search = ItemFilter {
        search: Some("buyee".into()),
        ..Default::default()
    };
    assert_eq!(reports::totals(&conn, &search).unwrap().items, 2);
}

#[test]
fn filter_from_cli_flags() {
    let (conn, oid) = setup();
    let oid_s = oid.to_string();
    let matches = cli::build_cli().get_matches_from([
        "camlot", "report", "totals", "--order", &oid_s, "--status", "sold",
    ]);
    if let Some(("report", report_m)) = matches.subcommand() {
        if let Some(("totals", totals_m)) = report_m.subcommand() {
            let filter = ItemFilter::from_matches(totals_m).unwrap();
            assert_eq!(filter.order_id, Some(oid));
            assert_eq!(filter.status, Some(ItemStatus::Sold));
            let t = reports::totals(&conn, &filter).unwrap();
            assert_eq!(t.items, 1);
            assert_eq!(t.sale, dec!(200));
        } else {
            panic!("no totals subcommand");
        }
    } else {
        panic!("no report subcommand");
    }
}

#[test]
fn item_pages_are_ordered_by_name() {
    let (conn, oid) = setup();
    items::save_item(&conn, None, &ItemDraft::new(oid, "Cap", dec!(1))).unwrap();
    let filter = ItemFilter::default();
    assert_eq!(items::count_items(&conn, &filter).unwrap(), 3);

    let first = items::query_items(&conn, &filter, Some((1, 2))).unwrap();
    let names: Vec<_> = first.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["AE-1 Program", "Cap"]);

    let second = items::query_items(&conn, &filter, Some((2, 2))).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].name, "FD 50mm");
}

#[test]
fn order_summary_rolls_up_shares() {
    let (conn, oid) = setup();
    let s = reports::order_summaries(&conn).unwrap();
    assert_eq!(s.len(), 1);
    assert_eq!(s[0].order_id, oid);
    assert_eq!(s[0].items, 2);
    assert_eq!(s[0].cost, dec!(400));
    assert_eq!(s[0].customs_distributed, dec!(30));
    assert_eq!(s[0].shipping_distributed, dec!(20));
    assert_eq!(s[0].profit, dec!(-290));
}
