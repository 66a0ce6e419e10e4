// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use camlot::pricing::{apportion, rate_snapshot, round_money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn snapshot_converts_and_taxes_cost() {
    let s = rate_snapshot(dec!(100), dec!(160), dec!(0.10), 0).unwrap();
    assert_eq!(s.target_cost, dec!(16000));
    assert_eq!(s.tax, dec!(10));
}

#[test]
fn snapshot_rounds_target_to_minor_unit() {
    // 12.34 * 165.4321 = 2041.432114 -> 2041 yen
    let s = rate_snapshot(dec!(12.34), dec!(165.4321), dec!(0.21), 0).unwrap();
    assert_eq!(s.target_cost, dec!(2041));
    // 12.34 * 0.21 = 2.5914 -> 2.59
    assert_eq!(s.tax, dec!(2.59));

    let cents = rate_snapshot(dec!(12.34), dec!(165.4321), dec!(0.21), 2).unwrap();
    assert_eq!(cents.target_cost, dec!(2041.43));
}

#[test]
fn rounding_is_half_up() {
    assert_eq!(round_money(dec!(0.025), 2), dec!(0.03));
    assert_eq!(round_money(dec!(0.0249), 2), dec!(0.02));
    assert_eq!(round_money(dec!(2.5), 0), dec!(3));
}

#[test]
fn apportion_matches_worked_example() {
    let customs = apportion(dec!(30), &[dec!(100), dec!(300)]).unwrap().unwrap();
    assert_eq!(customs, vec![dec!(7.5), dec!(22.5)]);
    let shipping = apportion(dec!(20), &[dec!(100), dec!(300)]).unwrap().unwrap();
    assert_eq!(shipping, vec![dec!(5), dec!(15)]);
}

#[test]
fn apportion_without_weights_is_none() {
    assert_eq!(apportion(dec!(30), &[]).unwrap(), None);
}

#[test]
fn apportion_against_zero_total_is_none() {
    assert_eq!(apportion(dec!(30), &[dec!(0), dec!(0)]).unwrap(), None);
}

#[test]
fn apportion_zero_pool_gives_zero_shares() {
    let shares = apportion(dec!(0), &[dec!(10), dec!(20)]).unwrap().unwrap();
    assert!(shares.iter().all(|s| s.is_zero()));
}

#[test]
fn rounded_shares_stay_within_half_cent_per_item() {
    let weights = [dec!(1), dec!(1), dec!(1)];
    let shares = apportion(dec!(10), &weights).unwrap().unwrap();
    assert_eq!(shares, vec![dec!(3.33), dec!(3.33), dec!(3.33)]);
    let sum: Decimal = shares.iter().sum();
    // not reconciled: one cent is lost, within 0.005 * 3
    assert_eq!(sum, dec!(9.99));
    assert!((dec!(10) - sum).abs() <= dec!(0.005) * Decimal::from(weights.len()));
}

#[test]
fn uneven_weights_round_each_share_independently() {
    let weights = [dec!(12.5), dec!(80), dec!(7.5)];
    let shares = apportion(dec!(45.55), &weights).unwrap().unwrap();
    // 45.55 * 0.125 = 5.69375, * 0.8 = 36.44, * 0.075 = 3.41625
    assert_eq!(shares, vec![dec!(5.69), dec!(36.44), dec!(3.42)]);
}
