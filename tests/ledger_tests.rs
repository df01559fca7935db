// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use celengan::ledger::{self, NewTransaction};
use celengan::models::{AccountKind, AccountTier, BalanceMode, TxKind};
use celengan::utils::today;
use rusqlite::{params, Connection};

const USER: &str = "local";

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    celengan::db::init_schema(&mut conn).unwrap();
    conn
}

fn add_account(conn: &Connection, name: &str) -> i64 {
    ledger::create_account(conn, USER, name, AccountKind::Cash, AccountTier::Core).unwrap()
}

fn history(conn: &Connection, account_id: i64) -> Vec<(i64, i64)> {
    let mut stmt = conn
        .prepare(
            "SELECT previous_balance, balance_at_time FROM balance_history
             WHERE account_id=?1 ORDER BY recorded_at, id",
        )
        .unwrap();
    stmt.query_map(params![account_id], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn set_balance_appends_one_snapshot() {
    let conn = setup();
    let id = add_account(&conn, "BCA");

    ledger::set_balance(&conn, USER, id, 500).unwrap();

    let account = ledger::get_account(&conn, USER, id).unwrap();
    assert_eq!(account.balance, 500);
    assert_eq!(history(&conn, id), vec![(0, 500)]);
}

#[test]
fn auto_mode_transaction_and_reversal() {
    let conn = setup();
    let id = add_account(&conn, "Dompet");
    ledger::set_balance_mode(&conn, USER, id, BalanceMode::Auto).unwrap();
    ledger::set_balance(&conn, USER, id, 1_000_000).unwrap();

    let tx_id = ledger::create_transaction(
        &conn,
        USER,
        &NewTransaction {
            account_id: Some(id),
            description: "Kopi",
            amount: 50_000,
            category: Some("food"),
            date: today(),
            kind: TxKind::Spending,
        },
    )
    .unwrap();

    assert_eq!(ledger::get_account(&conn, USER, id).unwrap().balance, 950_000);
    assert_eq!(history(&conn, id), vec![(0, 1_000_000), (1_000_000, 950_000)]);

    // The reversal is a new snapshot, not a rollback of the old one.
    ledger::delete_transaction(&conn, USER, tx_id).unwrap();
    assert_eq!(ledger::get_account(&conn, USER, id).unwrap().balance, 1_000_000);
    assert_eq!(
        history(&conn, id),
        vec![(0, 1_000_000), (1_000_000, 950_000), (950_000, 1_000_000)]
    );
}

#[test]
fn manual_mode_transactions_leave_balance_alone() {
    let conn = setup();
    let id = add_account(&conn, "BCA");
    ledger::set_balance(&conn, USER, id, 300_000).unwrap();

    ledger::create_transaction(
        &conn,
        USER,
        &NewTransaction {
            account_id: Some(id),
            description: "Bensin",
            amount: 40_000,
            category: None,
            date: today(),
            kind: TxKind::Spending,
        },
    )
    .unwrap();

    assert_eq!(ledger::get_account(&conn, USER, id).unwrap().balance, 300_000);
    assert_eq!(history(&conn, id).len(), 1);
}

#[test]
fn mode_change_is_metadata_only() {
    let conn = setup();
    let id = add_account(&conn, "BCA");
    ledger::set_balance(&conn, USER, id, 100).unwrap();

    ledger::set_balance_mode(&conn, USER, id, BalanceMode::Auto).unwrap();
    ledger::set_balance_mode(&conn, USER, id, BalanceMode::Manual).unwrap();

    assert_eq!(ledger::get_account(&conn, USER, id).unwrap().balance, 100);
    assert_eq!(history(&conn, id).len(), 1);
}

#[test]
fn negative_amounts_are_rejected_before_any_write() {
    let conn = setup();
    let id = add_account(&conn, "BCA");

    let res = ledger::create_transaction(
        &conn,
        USER,
        &NewTransaction {
            account_id: Some(id),
            description: "bad",
            amount: -5,
            category: None,
            date: today(),
            kind: TxKind::Spending,
        },
    );
    assert!(res.is_err());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn foreign_user_is_rejected_before_any_write() {
    let conn = setup();
    let id = add_account(&conn, "BCA");
    ledger::set_balance(&conn, USER, id, 750).unwrap();

    assert!(ledger::set_balance(&conn, "intruder", id, 0).is_err());
    assert!(ledger::delete_account(&conn, "intruder", id).is_err());

    assert_eq!(ledger::get_account(&conn, USER, id).unwrap().balance, 750);
    assert_eq!(history(&conn, id).len(), 1);
}

#[test]
fn delete_account_cascades_history_and_unlinks_transactions() {
    let conn = setup();
    let id = add_account(&conn, "BCA");
    ledger::set_balance(&conn, USER, id, 1_000).unwrap();
    let tx_id = ledger::create_transaction(
        &conn,
        USER,
        &NewTransaction {
            account_id: Some(id),
            description: "Pulsa",
            amount: 100,
            category: None,
            date: today(),
            kind: TxKind::Spending,
        },
    )
    .unwrap();

    ledger::delete_account(&conn, USER, id).unwrap();

    let snapshots: i64 = conn
        .query_row("SELECT COUNT(*) FROM balance_history", [], |r| r.get(0))
        .unwrap();
    assert_eq!(snapshots, 0);
    let linked: Option<i64> = conn
        .query_row(
            "SELECT account_id FROM transactions WHERE id=?1",
            params![tx_id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(linked, None);
}

#[test]
fn history_edits_are_free_form_and_deletes_keep_balance() {
    let conn = setup();
    let id = add_account(&conn, "BCA");
    ledger::set_balance(&conn, USER, id, 100).unwrap();
    ledger::set_balance(&conn, USER, id, 200).unwrap();
    let entries = ledger::list_history(&conn, USER, Some(id)).unwrap();
    assert_eq!(entries.len(), 2);

    // Chain-breaking correction is allowed.
    let oldest = entries.last().unwrap();
    ledger::update_snapshot(&conn, USER, oldest.id, 999, 123).unwrap();
    let reread = ledger::list_history(&conn, USER, Some(id)).unwrap();
    assert_eq!(reread.last().unwrap().balance_at_time, 999);
    assert_eq!(reread.last().unwrap().previous_balance, 123);

    // Deleting the newest entry does not reverse the live balance.
    ledger::delete_snapshot(&conn, USER, entries[0].id).unwrap();
    assert_eq!(ledger::get_account(&conn, USER, id).unwrap().balance, 200);
    assert_eq!(ledger::list_history(&conn, USER, Some(id)).unwrap().len(), 1);
}

#[test]
fn identical_timestamps_tie_break_by_insertion_order() {
    let conn = setup();
    let id = add_account(&conn, "BCA");
    for balance in [10, 20] {
        conn.execute(
            "INSERT INTO balance_history(account_id, balance_at_time, previous_balance, recorded_at)
             VALUES (?1, ?2, 0, '2025-06-01 10:00:00')",
            params![id, balance],
        )
        .unwrap();
    }

    let latest = ledger::latest_snapshot(&conn, id).unwrap().unwrap();
    assert_eq!(latest.balance_at_time, 20);
    let before = ledger::snapshot_before(&conn, id, &latest).unwrap().unwrap();
    assert_eq!(before.balance_at_time, 10);
}
