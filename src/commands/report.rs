// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::reconcile;
use crate::utils::{format_idr, get_or_init_settings, maybe_print_json, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("reconcile", sub)) => reconcile_report(conn, sub)?,
        Some(("networth", sub)) => networth(conn, sub)?,
        Some(("goal", sub)) => goal(conn, sub)?,
        Some(("rebalance", sub)) => rebalance(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn reconcile_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let global = reconcile::global_reconciliation(conn, user, today())?;
    let deltas = reconcile::per_account_deltas(conn, user)?;
    let flagged: Vec<_> = deltas.iter().filter(|d| d.needs_explanation()).collect();

    let payload = json!({ "global": global, "accounts": flagged });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payload)? {
        return Ok(());
    }

    println!(
        "{}",
        pretty_table(
            &["Total Spending", "Spending", "Income", "Unaccounted"],
            vec![vec![
                format_idr(global.total_delta),
                format_idr(global.spending_total),
                format_idr(global.income_total),
                format_idr(global.unaccounted_spending),
            ]],
        )
    );
    if global.unaccounted_spending <= 0 {
        println!("All spending is accounted for.");
    } else {
        println!(
            "{} in untracked spending. Add transactions to detail it.",
            format_idr(global.unaccounted_spending)
        );
    }

    if !flagged.is_empty() {
        println!("\nAccounts with unaccounted balance changes:");
        let rows = flagged
            .iter()
            .map(|d| {
                vec![
                    d.account_name.clone(),
                    format_idr(d.raw_delta),
                    format_idr(d.linked_net),
                    format_idr(d.unaccounted),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Account", "Balance Change", "Logged Net", "Unexplained"], rows)
        );
    }
    Ok(())
}

fn networth(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let months = *sub.get_one::<usize>("months").unwrap();
    let snapshots = reconcile::load_snapshots(conn, user)?;
    let series = reconcile::build_series(&snapshots, months);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &series)? {
        if series.is_empty() {
            println!("No history yet. Update your balances to start tracking.");
            return Ok(());
        }
        let rows = series
            .iter()
            .map(|p| vec![p.month.clone(), format_idr(p.net_worth)])
            .collect();
        println!("{}", pretty_table(&["Month", "Net Worth"], rows));
    }
    Ok(())
}

fn goal(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let settings = get_or_init_settings(conn, user)?;
    let accounts = ledger::list_accounts(conn, user)?;
    let net_worth = reconcile::calc_net_worth(&accounts);
    let progress = reconcile::calc_goal_progress(
        net_worth,
        settings.goal_target,
        settings.goal_target_date,
        today(),
    );
    let rows = vec![vec![
        format_idr(settings.goal_target),
        format_idr(net_worth),
        format!("{:.1}%", progress.progress_pct),
        format!("{} months", progress.months_remaining),
        format_idr(progress.monthly_needed),
    ]];
    println!(
        "{}",
        pretty_table(
            &["Target", "Current", "Progress", "Months Left", "Need/Month"],
            rows
        )
    );
    Ok(())
}

fn rebalance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let accounts = ledger::list_accounts(conn, user)?;
    let r = reconcile::calc_rebalancing(&accounts);
    println!(
        "Core {:.1}% / Satellite {:.1}%",
        r.core_pct * 100.0,
        r.satellite_pct * 100.0
    );
    println!("{}", r.message);
    Ok(())
}
