// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use celengan::commands::exporter;
use celengan::ledger::{self, NewTransaction};
use celengan::models::{AccountKind, AccountTier, TxKind};
use chrono::NaiveDate;
use rusqlite::Connection;

const USER: &str = "local";

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    celengan::db::init_schema(&mut conn).unwrap();
    conn
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn csv_has_titled_sections_for_accounts_and_month_transactions() {
    let conn = setup();
    let id =
        ledger::create_account(&conn, USER, "BCA", AccountKind::Cash, AccountTier::Core).unwrap();
    ledger::set_balance(&conn, USER, id, 1_500_000).unwrap();

    ledger::create_transaction(
        &conn,
        USER,
        &NewTransaction {
            account_id: Some(id),
            description: "Kopi",
            amount: 25_000,
            category: Some("food"),
            date: date(2025, 8, 10),
            kind: TxKind::Spending,
        },
    )
    .unwrap();
    // Prior-month transaction is excluded from the summary.
    ledger::create_transaction(
        &conn,
        USER,
        &NewTransaction {
            account_id: Some(id),
            description: "Lama",
            amount: 10_000,
            category: None,
            date: date(2025, 7, 1),
            kind: TxKind::Spending,
        },
    )
    .unwrap();

    let csv = exporter::build_csv(&conn, USER, date(2025, 8, 15)).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Celengan Financial Summary - August 2025");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "ACCOUNTS");
    assert_eq!(lines[3], "Name,Type,Category,Balance");
    assert_eq!(lines[4], "BCA,cash,core,1500000");
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "TRANSACTIONS");
    assert_eq!(lines[7], "Date,Description,Category,Amount");
    assert_eq!(lines[8], "2025-08-10,Kopi,food,25000");
    assert_eq!(lines.len(), 9);
}

#[test]
fn export_writes_file_through_the_cli() {
    let conn = setup();
    ledger::create_account(&conn, USER, "Dompet", AccountKind::Cash, AccountTier::Core).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("summary.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = celengan::cli::build_cli();
    let matches = cli.get_matches_from(["celengan", "export", "csv", "--out", &out_str]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert!(contents.starts_with("Celengan Financial Summary - "));
    assert!(contents.contains("ACCOUNTS"));
    assert!(contents.contains("Dompet,cash,core,0"));
}
