// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Account, Settings};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

// Numeric body plus an optional Indonesian shorthand suffix.
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9][0-9.,]*)\s*(jt|juta|rb|ribu|k)?$").unwrap());

/// Parse free-form amount text into whole rupiah.
///
/// `jt`/`juta` multiply by a million, `rb`/`ribu`/`k` by a thousand; with a
/// suffix the body is a plain decimal (`1.5jt`, `1,5jt`). Without a suffix
/// `.` is the thousands separator and `,` the decimal separator (`500.000`,
/// `2500,75`). Returns None for anything that doesn't parse.
pub fn parse_amount(text: &str) -> Option<i64> {
    let cleaned = text.trim().to_lowercase();
    if cleaned.is_empty() {
        return None;
    }
    let caps = AMOUNT_RE.captures(&cleaned)?;
    let body = caps.get(1)?.as_str();
    let value: f64 = match caps.get(2).map(|m| m.as_str()) {
        Some(suffix) => {
            let n: f64 = body.replace(',', ".").parse().ok()?;
            let mult = match suffix {
                "jt" | "juta" => 1_000_000.0,
                _ => 1_000.0,
            };
            n * mult
        }
        None => body.replace('.', "").replace(',', ".").parse().ok()?,
    };
    if !value.is_finite() {
        return None;
    }
    Some(value.round() as i64)
}

fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Locale-grouped digits (`1500000` -> `1.500.000`). Re-parses to the same
/// integer through `parse_amount`.
pub fn format_grouped(n: i64) -> String {
    let grouped = group_digits(n.unsigned_abs());
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_idr(n: i64) -> String {
    let grouped = group_digits(n.unsigned_abs());
    if n < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_account(conn: &Connection, user_id: &str, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM accounts WHERE user_id=?1 AND name=?2")?;
    let id: i64 = stmt
        .query_row(params![user_id, name], |r| r.get(0))
        .with_context(|| format!("Account '{}' not found", name))?;
    Ok(id)
}

/// Case-insensitive substring match in either direction; first match wins.
pub fn resolve_account<'a>(accounts: &'a [Account], hint: &str) -> Option<&'a Account> {
    let needle = hint.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    accounts.iter().find(|a| {
        let name = a.name.to_lowercase();
        name.contains(&needle) || needle.contains(&name)
    })
}

const DEFAULT_MONTHLY_INCOME: i64 = 20_000_000;
const DEFAULT_GOAL_TARGET: i64 = 100_000_000;
const DEFAULT_GOAL_DATE: &str = "2027-11-01";

/// Read the per-user settings row, inserting the defaults on first use.
pub fn get_or_init_settings(conn: &Connection, user_id: &str) -> Result<Settings> {
    let existing = conn
        .query_row(
            "SELECT user_id, monthly_income, goal_target, goal_target_date,
                    telegram_username, telegram_default_account_id, whatsapp_phone
             FROM settings WHERE user_id=?1",
            params![user_id],
            Settings::from_row,
        )
        .optional()?;
    if let Some(s) = existing {
        return Ok(s);
    }
    conn.execute(
        "INSERT INTO settings(user_id, monthly_income, goal_target, goal_target_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            user_id,
            DEFAULT_MONTHLY_INCOME,
            DEFAULT_GOAL_TARGET,
            DEFAULT_GOAL_DATE
        ],
    )?;
    get_or_init_settings(conn, user_id)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
