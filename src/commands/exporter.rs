// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::ledger;
use crate::utils::{month_start, today};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("csv", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let report = build_csv(conn, user, today())?;
            match sub.get_one::<String>("out") {
                Some(path) => {
                    std::fs::write(path, report)?;
                    println!("Exported summary to {}", path);
                }
                None => print!("{}", report),
            }
        }
        _ => {}
    }
    Ok(())
}

/// Two comma-joined sections with a title line. Embedded commas are not
/// escaped (known limitation).
pub fn build_csv(conn: &Connection, user_id: &str, day: NaiveDate) -> Result<String> {
    let accounts = ledger::list_accounts(conn, user_id)?;

    let mut rows: Vec<String> = vec![
        format!("Celengan Financial Summary - {}", day.format("%B %Y")),
        String::new(),
        "ACCOUNTS".into(),
        "Name,Type,Category,Balance".into(),
    ];
    for a in &accounts {
        rows.push(format!("{},{},{},{}", a.name, a.kind, a.tier, a.balance));
    }

    rows.push(String::new());
    rows.push("TRANSACTIONS".into());
    rows.push("Date,Description,Category,Amount".into());

    let mut stmt = conn.prepare(
        "SELECT date, description, category, amount FROM transactions
         WHERE user_id=?1 AND date >= ?2
         ORDER BY date DESC, id DESC",
    )?;
    let tx_rows = stmt.query_map(params![user_id, month_start(day)], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, i64>(3)?,
        ))
    })?;
    for row in tx_rows {
        let (date, description, category, amount) = row?;
        rows.push(format!(
            "{},{},{},{}",
            date,
            description,
            category.unwrap_or_default(),
            amount
        ));
    }

    Ok(rows.join("\n"))
}
