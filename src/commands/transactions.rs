// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::ledger::{self, NewTransaction};
use crate::utils::{
    format_idr, id_for_account, maybe_print_json, parse_amount, parse_date, pretty_table, today,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let user = sub.get_one::<String>("user").unwrap();
            let id = *sub.get_one::<i64>("id").unwrap();
            ledger::delete_transaction(conn, user, id)?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let description = sub.get_one::<String>("description").unwrap();
    let raw_amount = sub.get_one::<String>("amount").unwrap();
    let amount =
        parse_amount(raw_amount).ok_or_else(|| LedgerError::InvalidAmount(raw_amount.clone()))?;
    let kind = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let account_id = match sub.get_one::<String>("account") {
        Some(name) => Some(id_for_account(conn, user, name)?),
        None => None,
    };
    let category = sub.get_one::<String>("category").map(|s| s.as_str());

    ledger::create_transaction(
        conn,
        user,
        &NewTransaction {
            account_id,
            description,
            amount,
            category,
            date,
            kind,
        },
    )?;
    println!(
        "Recorded {} {} on {} ('{}')",
        kind,
        format_idr(amount),
        date,
        description
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub description: String,
    pub amount: i64,
    pub category: String,
    pub account: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let user = sub.get_one::<String>("user").unwrap();
    let mut sql = String::from(
        "SELECT t.id, t.date, t.type, t.description, t.amount, t.category, a.name
         FROM transactions t LEFT JOIN accounts a ON t.account_id=a.id
         WHERE t.user_id=?",
    );
    let mut params_vec: Vec<String> = vec![user.clone()];

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        sql.push_str(" AND a.name=?");
        params_vec.push(acct.into());
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let kind: String = r.get(2)?;
        let description: String = r.get(3)?;
        let amount: i64 = r.get(4)?;
        let category: Option<String> = r.get(5)?;
        let account: Option<String> = r.get(6)?;
        data.push(TransactionRow {
            id,
            date,
            kind,
            description,
            amount,
            category: category.unwrap_or_default(),
            account: account.unwrap_or_default(),
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.description.clone(),
                    format_idr(r.amount),
                    r.category.clone(),
                    r.account.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Description", "Amount", "Category", "Account"],
                rows,
            )
        );
    }
    Ok(())
}
