// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use celengan::commands::doctor;
use celengan::ledger;
use celengan::models::{AccountKind, AccountTier};
use rusqlite::{params, Connection};

const USER: &str = "local";

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    celengan::db::init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn clean_store_reports_nothing() {
    let conn = setup();
    let id =
        ledger::create_account(&conn, USER, "BCA", AccountKind::Cash, AccountTier::Core).unwrap();
    ledger::set_balance(&conn, USER, id, 100).unwrap();
    ledger::set_balance(&conn, USER, id, 250).unwrap();

    assert!(doctor::collect_issues(&conn).unwrap().is_empty());
}

#[test]
fn broken_chain_and_drift_are_reported() {
    let conn = setup();
    let id =
        ledger::create_account(&conn, USER, "BCA", AccountKind::Cash, AccountTier::Core).unwrap();
    ledger::set_balance(&conn, USER, id, 100).unwrap();
    // A manual edit of history: previous_balance no longer matches the prior
    // entry, and the latest snapshot disagrees with the live balance.
    conn.execute(
        "INSERT INTO balance_history(account_id, balance_at_time, previous_balance)
         VALUES (?1, 200, 150)",
        params![id],
    )
    .unwrap();

    let issues = doctor::collect_issues(&conn).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert!(kinds.contains(&"chain_break"));
    assert!(kinds.contains(&"balance_drift"));
}

#[test]
fn negative_amounts_written_behind_the_apps_back_are_flagged() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(user_id, description, amount, date, type)
         VALUES ('local', 'raw write', -500, '2025-01-01', 'spending')",
        [],
    )
    .unwrap();

    let issues = doctor::collect_issues(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "negative_amount");
}
