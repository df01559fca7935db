// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use celengan::{cli, commands::transactions};
use rusqlite::{params, Connection};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    celengan::db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO accounts(user_id, name, type, category) VALUES ('local','A1','cash','core')",
        [],
    )
    .unwrap();
    for i in 1..=3 {
        conn.execute(
            "INSERT INTO transactions(user_id, account_id, description, amount, category, date, type)
             VALUES ('local', 1, 'P', 10000, 'food', ?1, 'spending')",
            params![format!("2025-01-0{}", i)],
        )
        .unwrap();
    }
    conn
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["celengan", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_scopes_to_requesting_user() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(user_id, description, amount, date, type)
         VALUES ('somebody-else', 'Q', 999, '2025-01-04', 'income')",
        [],
    )
    .unwrap();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["celengan", "tx", "list"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 3);
            assert!(rows.iter().all(|r| r.description == "P"));
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}
