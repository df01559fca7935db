// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use celengan::utils::{format_grouped, format_idr, parse_amount};

#[test]
fn shorthand_suffixes() {
    assert_eq!(parse_amount("1.5jt"), Some(1_500_000));
    assert_eq!(parse_amount("1,5jt"), Some(1_500_000));
    assert_eq!(parse_amount("2juta"), Some(2_000_000));
    assert_eq!(parse_amount("500rb"), Some(500_000));
    assert_eq!(parse_amount("50ribu"), Some(50_000));
    assert_eq!(parse_amount("5k"), Some(5_000));
    assert_eq!(parse_amount("  25 rb "), Some(25_000));
    assert_eq!(parse_amount("1.5JT"), Some(1_500_000));
}

#[test]
fn plain_numbers_use_indonesian_separators() {
    assert_eq!(parse_amount("500.000"), Some(500_000));
    assert_eq!(parse_amount("1.000.000"), Some(1_000_000));
    assert_eq!(parse_amount("2500,75"), Some(2501));
    assert_eq!(parse_amount("42"), Some(42));
    assert_eq!(parse_amount("0"), Some(0));
}

#[test]
fn rejects_garbage() {
    assert_eq!(parse_amount(""), None);
    assert_eq!(parse_amount("   "), None);
    assert_eq!(parse_amount("abc"), None);
    assert_eq!(parse_amount("12abc"), None);
    assert_eq!(parse_amount("jt"), None);
    assert_eq!(parse_amount("1..5jt"), None);
}

#[test]
fn grouped_formatting_round_trips() {
    for n in [0i64, 1_000, 25_000, 500_000, 1_500_000] {
        let formatted = format_grouped(n);
        assert_eq!(parse_amount(&formatted), Some(n), "via '{}'", formatted);
    }
    assert_eq!(format_grouped(1_500_000), "1.500.000");
    assert_eq!(format_grouped(-42_000), "-42.000");
}

#[test]
fn idr_display() {
    assert_eq!(format_idr(1_500_000), "Rp 1.500.000");
    assert_eq!(format_idr(0), "Rp 0");
    assert_eq!(format_idr(-300_000), "-Rp 300.000");
}
