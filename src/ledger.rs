// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::LedgerError;
use crate::models::{Account, AccountKind, AccountTier, BalanceEntry, BalanceMode, Transaction, TxKind};

const ACCOUNT_COLS: &str = "id, user_id, name, type, category, balance, balance_mode";
const ENTRY_COLS: &str = "id, account_id, balance_at_time, previous_balance, recorded_at";
const TX_COLS: &str = "id, user_id, account_id, description, amount, category, date, type";

pub fn create_account(
    conn: &Connection,
    user_id: &str,
    name: &str,
    kind: AccountKind,
    tier: AccountTier,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts(user_id, name, type, category) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, name, kind, tier],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch an account and check it belongs to `user_id`. All mutation paths go
/// through this before writing anything.
pub fn get_account(conn: &Connection, user_id: &str, account_id: i64) -> Result<Account> {
    let account = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE id=?1"),
            params![account_id],
            Account::from_row,
        )
        .optional()?
        .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;
    if account.user_id != user_id {
        return Err(LedgerError::Unauthorized.into());
    }
    Ok(account)
}

pub fn list_accounts(conn: &Connection, user_id: &str) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLS} FROM accounts WHERE user_id=?1 ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id], Account::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Snapshots go with the account (FK cascade); transactions are un-linked.
pub fn delete_account(conn: &Connection, user_id: &str, account_id: i64) -> Result<()> {
    get_account(conn, user_id, account_id)?;
    conn.execute("DELETE FROM accounts WHERE id=?1", params![account_id])?;
    Ok(())
}

/// Metadata-only: switching manual <-> auto never touches the balance and
/// never emits a snapshot.
pub fn set_balance_mode(
    conn: &Connection,
    user_id: &str,
    account_id: i64,
    mode: BalanceMode,
) -> Result<()> {
    get_account(conn, user_id, account_id)?;
    conn.execute(
        "UPDATE accounts SET balance_mode=?1, updated_at=datetime('now') WHERE id=?2",
        params![mode, account_id],
    )?;
    Ok(())
}

/// The one balance+snapshot write sequence every mutation path shares.
/// Balance first, then the history entry; if the snapshot insert fails the
/// error propagates so the caller knows reconciliation data is inconsistent.
pub fn set_balance(
    conn: &Connection,
    user_id: &str,
    account_id: i64,
    new_balance: i64,
) -> Result<()> {
    let account = get_account(conn, user_id, account_id)?;
    let previous = account.balance;
    conn.execute(
        "UPDATE accounts SET balance=?1, updated_at=datetime('now') WHERE id=?2",
        params![new_balance, account_id],
    )?;
    conn.execute(
        "INSERT INTO balance_history(account_id, balance_at_time, previous_balance)
         VALUES (?1, ?2, ?3)",
        params![account_id, new_balance, previous],
    )?;
    Ok(())
}

/// Shift an auto-mode account's balance by a signed amount, appending the
/// snapshot through the same sequence as `set_balance`.
pub fn apply_transaction_delta(
    conn: &Connection,
    user_id: &str,
    account_id: i64,
    signed_amount: i64,
) -> Result<()> {
    let account = get_account(conn, user_id, account_id)?;
    set_balance(conn, user_id, account_id, account.balance + signed_amount)
}

pub struct NewTransaction<'a> {
    pub account_id: Option<i64>,
    pub description: &'a str,
    pub amount: i64,
    pub category: Option<&'a str>,
    pub date: NaiveDate,
    pub kind: TxKind,
}

pub fn create_transaction(conn: &Connection, user_id: &str, tx: &NewTransaction) -> Result<i64> {
    if tx.amount < 0 {
        return Err(LedgerError::InvalidAmount(tx.amount.to_string()).into());
    }
    let auto_account = match tx.account_id {
        Some(id) => {
            let account = get_account(conn, user_id, id)?;
            (account.balance_mode == BalanceMode::Auto).then_some(id)
        }
        None => None,
    };
    conn.execute(
        "INSERT INTO transactions(user_id, account_id, description, amount, category, date, type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id,
            tx.account_id,
            tx.description,
            tx.amount,
            tx.category,
            tx.date,
            tx.kind
        ],
    )?;
    let tx_id = conn.last_insert_rowid();
    if let Some(account_id) = auto_account {
        apply_transaction_delta(conn, user_id, account_id, tx.kind.signed_amount(tx.amount))?;
    }
    Ok(tx_id)
}

pub fn get_transaction(conn: &Connection, user_id: &str, tx_id: i64) -> Result<Transaction> {
    let tx = conn
        .query_row(
            &format!("SELECT {TX_COLS} FROM transactions WHERE id=?1"),
            params![tx_id],
            Transaction::from_row,
        )
        .optional()?
        .ok_or(LedgerError::TransactionNotFound(tx_id))?;
    if tx.user_id != user_id {
        return Err(LedgerError::Unauthorized.into());
    }
    Ok(tx)
}

/// Deleting a transaction on an auto-mode account appends a compensating
/// snapshot; history is never rewritten.
pub fn delete_transaction(conn: &Connection, user_id: &str, tx_id: i64) -> Result<()> {
    let tx = get_transaction(conn, user_id, tx_id)?;
    conn.execute("DELETE FROM transactions WHERE id=?1", params![tx_id])?;
    if let Some(account_id) = tx.account_id {
        let account = get_account(conn, user_id, account_id)?;
        if account.balance_mode == BalanceMode::Auto {
            apply_transaction_delta(
                conn,
                user_id,
                account_id,
                -tx.kind.signed_amount(tx.amount),
            )?;
        }
    }
    Ok(())
}

/// Newest entry for the account. Timestamps can collide at second
/// granularity; row id (arrival order) breaks the tie.
pub fn latest_snapshot(conn: &Connection, account_id: i64) -> Result<Option<BalanceEntry>> {
    let entry = conn
        .query_row(
            &format!(
                "SELECT {ENTRY_COLS} FROM balance_history WHERE account_id=?1
                 ORDER BY recorded_at DESC, id DESC LIMIT 1"
            ),
            params![account_id],
            BalanceEntry::from_row,
        )
        .optional()?;
    Ok(entry)
}

/// The entry immediately preceding `entry` in the same ordering.
pub fn snapshot_before(
    conn: &Connection,
    account_id: i64,
    entry: &BalanceEntry,
) -> Result<Option<BalanceEntry>> {
    let prev = conn
        .query_row(
            &format!(
                "SELECT {ENTRY_COLS} FROM balance_history
                 WHERE account_id=?1
                   AND (recorded_at < ?2 OR (recorded_at = ?2 AND id < ?3))
                 ORDER BY recorded_at DESC, id DESC LIMIT 1"
            ),
            params![account_id, entry.recorded_at, entry.id],
            BalanceEntry::from_row,
        )
        .optional()?;
    Ok(prev)
}

pub fn list_history(
    conn: &Connection,
    user_id: &str,
    account_id: Option<i64>,
) -> Result<Vec<BalanceEntry>> {
    let mut out = Vec::new();
    match account_id {
        Some(id) => {
            get_account(conn, user_id, id)?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLS} FROM balance_history WHERE account_id=?1
                 ORDER BY recorded_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![id], BalanceEntry::from_row)?;
            for row in rows {
                out.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT h.id, h.account_id, h.balance_at_time, h.previous_balance, h.recorded_at
                 FROM balance_history h
                 JOIN accounts a ON h.account_id = a.id
                 WHERE a.user_id=?1
                 ORDER BY h.recorded_at DESC, h.id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], BalanceEntry::from_row)?;
            for row in rows {
                out.push(row?);
            }
        }
    }
    Ok(out)
}

fn owned_entry(conn: &Connection, user_id: &str, entry_id: i64) -> Result<BalanceEntry> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLS} FROM balance_history WHERE id=?1"),
            params![entry_id],
            BalanceEntry::from_row,
        )
        .optional()?
        .ok_or(LedgerError::SnapshotNotFound(entry_id))?;
    get_account(conn, user_id, entry.account_id)?;
    Ok(entry)
}

/// Free-form correction of a historical entry. No re-validation against the
/// chain; `doctor` reports breaks instead.
pub fn update_snapshot(
    conn: &Connection,
    user_id: &str,
    entry_id: i64,
    balance_at_time: i64,
    previous_balance: i64,
) -> Result<()> {
    owned_entry(conn, user_id, entry_id)?;
    conn.execute(
        "UPDATE balance_history SET balance_at_time=?1, previous_balance=?2 WHERE id=?3",
        params![balance_at_time, previous_balance, entry_id],
    )?;
    Ok(())
}

/// Removes the entry only; the live balance is left as-is.
pub fn delete_snapshot(conn: &Connection, user_id: &str, entry_id: i64) -> Result<()> {
    owned_entry(conn, user_id, entry_id)?;
    conn.execute("DELETE FROM balance_history WHERE id=?1", params![entry_id])?;
    Ok(())
}
