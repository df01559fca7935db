// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::ledger;
use crate::utils::{format_idr, id_for_account, maybe_print_json, parse_amount, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let account_id = match sub.get_one::<String>("account") {
                Some(name) => Some(id_for_account(conn, user, name)?),
                None => None,
            };
            let entries = ledger::list_history(conn, user, account_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
                let rows = entries
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.to_string(),
                            e.account_id.to_string(),
                            e.recorded_at.clone(),
                            format_idr(e.previous_balance),
                            format_idr(e.balance_at_time),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Account", "Recorded", "Previous", "Balance"], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let id = *sub.get_one::<i64>("id").unwrap();
            let raw_balance = sub.get_one::<String>("balance").unwrap();
            let raw_previous = sub.get_one::<String>("previous").unwrap();
            let balance = parse_amount(raw_balance)
                .ok_or_else(|| LedgerError::InvalidAmount(raw_balance.clone()))?;
            let previous = parse_amount(raw_previous)
                .ok_or_else(|| LedgerError::InvalidAmount(raw_previous.clone()))?;
            ledger::update_snapshot(conn, user, id, balance, previous)?;
            println!("History entry {} updated", id);
        }
        Some(("rm", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let id = *sub.get_one::<i64>("id").unwrap();
            ledger::delete_snapshot(conn, user, id)?;
            println!("History entry {} removed (live balance untouched)", id);
        }
        _ => {}
    }
    Ok(())
}
