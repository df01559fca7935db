// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::ledger;
use crate::models::{Account, AccountKind, AccountTier, BalanceEntry, TxKind};
use crate::utils::month_start;

/// Spending not explained by logged transactions, over the calendar-month
/// window. Floored at zero: overshooting transactions never produce a credit.
pub fn calc_unaccounted_spending(
    current_total: i64,
    prev_total: i64,
    monthly_income: i64,
    net_transaction_spending: i64,
) -> i64 {
    let expected = prev_total + monthly_income;
    let gap = expected - current_total;
    (gap - net_transaction_spending).max(0)
}

pub fn calc_net_worth(accounts: &[Account]) -> i64 {
    accounts.iter().map(|a| a.balance).sum()
}

#[derive(Debug, Serialize)]
pub struct GlobalReconciliation {
    pub current_total: i64,
    pub prev_total: i64,
    pub monthly_income: i64,
    pub expected_total: i64,
    pub spending_total: i64,
    pub income_total: i64,
    pub net_transaction_spending: i64,
    pub unaccounted_spending: i64,
    pub total_delta: i64,
}

/// Expected-vs-actual balance change across all accounts, anchored to the
/// first of the current month. Reads are unsynchronized point-in-time
/// queries; the figures are advisory.
pub fn global_reconciliation(
    conn: &Connection,
    user_id: &str,
    today: NaiveDate,
) -> Result<GlobalReconciliation> {
    let accounts = ledger::list_accounts(conn, user_id)?;
    let current_total = calc_net_worth(&accounts);

    let mut prev_total = 0i64;
    for account in &accounts {
        if let Some(latest) = ledger::latest_snapshot(conn, account.id)? {
            prev_total += latest.previous_balance;
        }
    }

    let settings = crate::utils::get_or_init_settings(conn, user_id)?;
    let monthly_income = settings.monthly_income;

    let mut spending_total = 0i64;
    let mut income_total = 0i64;
    let mut stmt = conn.prepare(
        "SELECT amount, type FROM transactions WHERE user_id=?1 AND date >= ?2",
    )?;
    let rows = stmt.query_map(params![user_id, month_start(today)], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, TxKind>(1)?))
    })?;
    for row in rows {
        let (amount, kind) = row?;
        match kind {
            TxKind::Spending => spending_total += amount,
            TxKind::Income => income_total += amount,
        }
    }
    let net_transaction_spending = spending_total - income_total;

    let expected_total = prev_total + monthly_income;
    Ok(GlobalReconciliation {
        current_total,
        prev_total,
        monthly_income,
        expected_total,
        spending_total,
        income_total,
        net_transaction_spending,
        unaccounted_spending: calc_unaccounted_spending(
            current_total,
            prev_total,
            monthly_income,
            net_transaction_spending,
        ),
        total_delta: (expected_total - current_total).max(0),
    })
}

#[derive(Debug, Serialize)]
pub struct AccountDelta {
    pub account_id: i64,
    pub account_name: String,
    pub raw_delta: i64,
    pub linked_net: i64,
    pub unaccounted: i64,
}

impl AccountDelta {
    /// Entries worth surfacing as "needs explanation" prompts.
    pub fn needs_explanation(&self) -> bool {
        self.unaccounted != 0
    }
}

/// Per-account reconciliation over each account's own latest-snapshot window.
/// Accounts that have never had a balance written are skipped entirely.
pub fn per_account_deltas(conn: &Connection, user_id: &str) -> Result<Vec<AccountDelta>> {
    let accounts = ledger::list_accounts(conn, user_id)?;
    let mut out = Vec::new();
    for account in &accounts {
        let Some(latest) = ledger::latest_snapshot(conn, account.id)? else {
            continue;
        };
        let window_end = latest
            .recorded_date()
            .with_context(|| format!("Bad recorded_at '{}'", latest.recorded_at))?;
        // Transactions dated on the previous snapshot's day belong to the
        // previous window; only the first-ever window reaches back to the
        // epoch and takes everything.
        let window_start = match ledger::snapshot_before(conn, account.id, &latest)? {
            Some(prev) => Some(
                prev.recorded_date()
                    .with_context(|| format!("Bad recorded_at '{}'", prev.recorded_at))?,
            ),
            None => None,
        };

        let raw_delta = latest.balance_at_time - latest.previous_balance;
        let linked_net = linked_net(conn, user_id, account.id, window_start, window_end)?;
        out.push(AccountDelta {
            account_id: account.id,
            account_name: account.name.clone(),
            raw_delta,
            linked_net,
            unaccounted: raw_delta - linked_net,
        });
    }
    Ok(out)
}

fn linked_net(
    conn: &Connection,
    user_id: &str,
    account_id: i64,
    window_start: Option<NaiveDate>,
    window_end: NaiveDate,
) -> Result<i64> {
    let mut net = 0i64;
    let mut fold = |rows: &mut rusqlite::Rows<'_>| -> Result<()> {
        while let Some(r) = rows.next()? {
            let amount: i64 = r.get(0)?;
            let kind: TxKind = r.get(1)?;
            net += kind.signed_amount(amount);
        }
        Ok(())
    };
    match window_start {
        Some(start) => {
            let mut stmt = conn.prepare(
                "SELECT amount, type FROM transactions
                 WHERE user_id=?1 AND account_id=?2 AND date > ?3 AND date <= ?4",
            )?;
            let mut rows = stmt.query(params![user_id, account_id, start, window_end])?;
            fold(&mut rows)?;
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT amount, type FROM transactions
                 WHERE user_id=?1 AND account_id=?2 AND date <= ?3",
            )?;
            let mut rows = stmt.query(params![user_id, account_id, window_end])?;
            fold(&mut rows)?;
        }
    }
    Ok(net)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthPoint {
    pub month: String,
    pub net_worth: i64,
}

/// One data point per calendar month: the sum over accounts of each
/// account's latest balance within that month. Accounts without a snapshot
/// in a month contribute nothing for it (no carry-forward). Input must be
/// ordered ascending by (recorded_at, id).
pub fn build_series(snapshots: &[BalanceEntry], months_window: usize) -> Vec<MonthPoint> {
    let mut months: BTreeMap<String, HashMap<i64, i64>> = BTreeMap::new();
    for entry in snapshots {
        months
            .entry(entry.month_key().to_string())
            .or_default()
            .insert(entry.account_id, entry.balance_at_time);
    }
    let points: Vec<MonthPoint> = months
        .into_iter()
        .map(|(month, balances)| MonthPoint {
            month,
            net_worth: balances.values().sum(),
        })
        .collect();
    let skip = points.len().saturating_sub(months_window);
    points.into_iter().skip(skip).collect()
}

/// All of the user's snapshots, oldest first, for the series builder.
pub fn load_snapshots(conn: &Connection, user_id: &str) -> Result<Vec<BalanceEntry>> {
    let mut stmt = conn.prepare(
        "SELECT h.id, h.account_id, h.balance_at_time, h.previous_balance, h.recorded_at
         FROM balance_history h
         JOIN accounts a ON h.account_id = a.id
         WHERE a.user_id=?1
         ORDER BY h.recorded_at ASC, h.id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], BalanceEntry::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[derive(Debug, Serialize)]
pub struct GoalProgress {
    pub progress_pct: f64,
    pub months_remaining: i64,
    pub monthly_needed: i64,
}

pub fn calc_goal_progress(
    net_worth: i64,
    target: i64,
    target_date: NaiveDate,
    today: NaiveDate,
) -> GoalProgress {
    let progress_pct = ((net_worth as f64 / target as f64) * 100.0).min(100.0);
    let months = (target_date.year() as i64 - today.year() as i64) * 12
        + (target_date.month() as i64 - today.month() as i64);
    let months_remaining = months.max(0);
    let remaining = (target - net_worth).max(0);
    let monthly_needed = if months_remaining > 0 {
        remaining / months_remaining
    } else {
        remaining
    };
    GoalProgress {
        progress_pct,
        months_remaining,
        monthly_needed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceAction {
    BuyCore,
    AccumulateSatellite,
    Balanced,
}

#[derive(Debug, Serialize)]
pub struct Rebalancing {
    pub satellite_pct: f64,
    pub core_pct: f64,
    pub suggestion: RebalanceAction,
    pub message: String,
}

/// Satellite share of investment accounts against the 80/20 core/satellite
/// target. Cash accounts are ignored.
pub fn calc_rebalancing(accounts: &[Account]) -> Rebalancing {
    let investment: Vec<&Account> = accounts
        .iter()
        .filter(|a| a.kind == AccountKind::Investment)
        .collect();
    let total: i64 = investment.iter().map(|a| a.balance).sum();
    if total == 0 {
        return Rebalancing {
            satellite_pct: 0.0,
            core_pct: 0.0,
            suggestion: RebalanceAction::Balanced,
            message: "No investment accounts yet.".to_string(),
        };
    }
    let satellite: i64 = investment
        .iter()
        .filter(|a| a.tier == AccountTier::Satellite)
        .map(|a| a.balance)
        .sum();
    let satellite_pct = satellite as f64 / total as f64;
    let core_pct = 1.0 - satellite_pct;

    if satellite_pct > 0.2 {
        Rebalancing {
            satellite_pct,
            core_pct,
            suggestion: RebalanceAction::BuyCore,
            message: format!(
                "Satellite is {:.1}% of portfolio. Consider buying more Core (Gold) to rebalance toward 80/20.",
                satellite_pct * 100.0
            ),
        }
    } else if satellite_pct < 0.2 {
        Rebalancing {
            satellite_pct,
            core_pct,
            suggestion: RebalanceAction::AccumulateSatellite,
            message: format!(
                "Satellite is {:.1}% of portfolio. Consider accumulating more Satellite (Crypto/Stocks) to reach 20%.",
                satellite_pct * 100.0
            ),
        }
    } else {
        Rebalancing {
            satellite_pct,
            core_pct,
            suggestion: RebalanceAction::Balanced,
            message: "Portfolio is balanced at 80% Core / 20% Satellite.".to_string(),
        }
    }
}
