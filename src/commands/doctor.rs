// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = collect_issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Diagnoses without fixing: manual history edits may legitimately break the
/// chain, so these are reports, not errors.
pub fn collect_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Snapshot chains where previous_balance disagrees with the entry
    //    before it
    let mut stmt = conn.prepare(
        "SELECT account_id, id, previous_balance, balance_at_time, recorded_at
         FROM balance_history ORDER BY account_id, recorded_at, id",
    )?;
    let mut cur = stmt.query([])?;
    let mut last: Option<(i64, i64)> = None; // (account_id, balance_at_time)
    while let Some(r) = cur.next()? {
        let account_id: i64 = r.get(0)?;
        let id: i64 = r.get(1)?;
        let previous: i64 = r.get(2)?;
        let balance: i64 = r.get(3)?;
        if let Some((prev_account, prev_balance)) = last {
            if prev_account == account_id && previous != prev_balance {
                rows.push(vec![
                    "chain_break".into(),
                    format!(
                        "entry {} expects previous {} but prior entry ended at {}",
                        id, previous, prev_balance
                    ),
                ]);
            }
        }
        last = Some((account_id, balance));
    }

    // 2) Accounts whose live balance drifted from their latest snapshot
    let mut stmt2 = conn.prepare(
        "SELECT a.id, a.name, a.balance,
                (SELECT h.balance_at_time FROM balance_history h
                 WHERE h.account_id = a.id
                 ORDER BY h.recorded_at DESC, h.id DESC LIMIT 1)
         FROM accounts a",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let name: String = r.get(1)?;
        let balance: i64 = r.get(2)?;
        let latest: Option<i64> = r.get(3)?;
        if let Some(latest) = latest {
            if latest != balance {
                rows.push(vec![
                    "balance_drift".into(),
                    format!("{}: balance {} vs latest snapshot {}", name, balance, latest),
                ]);
            }
        }
    }

    // 3) Transactions carrying a negative amount
    let mut stmt3 = conn.prepare("SELECT id, amount FROM transactions WHERE amount < 0")?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: i64 = r.get(0)?;
        let amount: i64 = r.get(1)?;
        rows.push(vec![
            "negative_amount".into(),
            format!("transaction {} has amount {}", id, amount),
        ]);
    }

    Ok(rows)
}
