// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::utils::{
    format_idr, get_or_init_settings, id_for_account, parse_amount, parse_date, pretty_table,
};
use anyhow::Result;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub)?,
        Some(("set", sub)) => set(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let s = get_or_init_settings(conn, user)?;
    let rows = vec![
        vec!["Monthly income".into(), format_idr(s.monthly_income)],
        vec!["Goal target".into(), format_idr(s.goal_target)],
        vec!["Goal target date".into(), s.goal_target_date.to_string()],
        vec![
            "Telegram".into(),
            s.telegram_username.unwrap_or_default(),
        ],
        vec!["WhatsApp".into(), s.whatsapp_phone.unwrap_or_default()],
        vec![
            "Default account id".into(),
            s.telegram_default_account_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        ],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    get_or_init_settings(conn, user)?;

    if let Some(raw) = sub.get_one::<String>("monthly-income") {
        let amount = parse_amount(raw).ok_or_else(|| LedgerError::InvalidAmount(raw.clone()))?;
        conn.execute(
            "UPDATE settings SET monthly_income=?1 WHERE user_id=?2",
            params![amount, user],
        )?;
    }
    if let Some(raw) = sub.get_one::<String>("goal-target") {
        let amount = parse_amount(raw).ok_or_else(|| LedgerError::InvalidAmount(raw.clone()))?;
        conn.execute(
            "UPDATE settings SET goal_target=?1 WHERE user_id=?2",
            params![amount, user],
        )?;
    }
    if let Some(raw) = sub.get_one::<String>("goal-target-date") {
        let date = parse_date(raw)?;
        conn.execute(
            "UPDATE settings SET goal_target_date=?1 WHERE user_id=?2",
            params![date, user],
        )?;
    }
    if let Some(username) = sub.get_one::<String>("telegram") {
        conn.execute(
            "UPDATE settings SET telegram_username=?1 WHERE user_id=?2",
            params![username, user],
        )?;
    }
    if let Some(phone) = sub.get_one::<String>("whatsapp") {
        conn.execute(
            "UPDATE settings SET whatsapp_phone=?1 WHERE user_id=?2",
            params![phone, user],
        )?;
    }
    if let Some(name) = sub.get_one::<String>("default-account") {
        let account_id = id_for_account(conn, user, name)?;
        conn.execute(
            "UPDATE settings SET telegram_default_account_id=?1 WHERE user_id=?2",
            params![account_id, user],
        )?;
    }
    println!("Settings updated");
    Ok(())
}
