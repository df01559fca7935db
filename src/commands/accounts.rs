// Copyright (c) 2025 Soumyadip Sarkar.
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
        Some(("add", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let kind = sub.get_one::<String>("type").unwrap().parse().map_err(anyhow::Error::msg)?;
            let tier = sub
                .get_one::<String>("category")
                .unwrap()
                .parse()
                .map_err(anyhow::Error::msg)?;
            ledger::create_account(conn, user, name, kind, tier)?;
            println!("Added account '{}' ({}, {})", name, kind, tier);
        }
        Some(("list", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let accounts = ledger::list_accounts(conn, user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let rows = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.name.clone(),
                            a.kind.to_string(),
                            a.tier.to_string(),
                            a.balance_mode.to_string(),
                            format_idr(a.balance),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Type", "Category", "Mode", "Balance"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let account_id = id_for_account(conn, user, name)?;
            ledger::delete_account(conn, user, account_id)?;
            println!("Removed account '{}'", name);
        }
        Some(("balance", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let raw = sub.get_one::<String>("amount").unwrap();
            let amount =
                parse_amount(raw).ok_or_else(|| LedgerError::InvalidAmount(raw.clone()))?;
            let account_id = id_for_account(conn, user, name)?;
            ledger::set_balance(conn, user, account_id, amount)?;
            println!("Balance of '{}' set to {}", name, format_idr(amount));
        }
        Some(("mode", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let mode = sub
                .get_one::<String>("mode")
                .unwrap()
                .parse()
                .map_err(anyhow::Error::msg)?;
            let account_id = id_for_account(conn, user, name)?;
            ledger::set_balance_mode(conn, user, account_id, mode)?;
            println!("Balance mode of '{}' set to {}", name, mode);
        }
        _ => {}
    }
    Ok(())
}
