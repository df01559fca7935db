// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use crate::ledger::{self, NewTransaction};
use crate::models::{Account, Intent, Lang, QueryKind, TxIntent, TxKind};
use crate::utils::{format_idr, get_or_init_settings, parse_amount, resolve_account, today};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("message", sub)) => {
            let text = sub.get_one::<String>("text").unwrap();
            let reply = match identity(conn, sub)? {
                Some(user) => handle_message(conn, &user, text)?,
                None => setup_instructions(guess_lang(text)),
            };
            println!("{}", reply);
        }
        Some(("intent", sub)) => {
            let raw = sub.get_one::<String>("json").unwrap();
            // A parser response that fails to deserialize is an unclear
            // intent, not a hard failure.
            let intent: Intent = serde_json::from_str(raw)
                .unwrap_or(Intent::Unclear { language: Lang::En });
            let reply = match identity(conn, sub)? {
                Some(user) => handle_intent(conn, &user, intent)?,
                None => setup_instructions(Lang::En),
            };
            println!("{}", reply);
        }
        _ => {}
    }
    Ok(())
}

/// Resolve the requesting user. Chat identities go through the settings
/// table the way the webhooks do; `--user` is the direct path.
fn identity(conn: &Connection, sub: &clap::ArgMatches) -> Result<Option<String>> {
    if let Some(username) = sub.get_one::<String>("telegram") {
        let user: Option<String> = conn
            .query_row(
                "SELECT user_id FROM settings WHERE telegram_username=?1",
                params![username],
                |r| r.get(0),
            )
            .optional()?;
        return Ok(user);
    }
    if let Some(phone) = sub.get_one::<String>("whatsapp") {
        let user: Option<String> = conn
            .query_row(
                "SELECT user_id FROM settings WHERE whatsapp_phone=?1",
                params![phone],
                |r| r.get(0),
            )
            .optional()?;
        return Ok(user);
    }
    Ok(sub.get_one::<String>("user").cloned())
}

/// Same heuristic the webhooks use for messages from unknown senders.
pub fn guess_lang(text: &str) -> Lang {
    if text.chars().any(|c| c.is_ascii_alphabetic()) {
        Lang::En
    } else {
        Lang::Id
    }
}

/// Textual command surface. Every input gets a reply; nothing no-ops
/// silently.
pub fn handle_message(conn: &Connection, user_id: &str, text: &str) -> Result<String> {
    let lower = text.trim().trim_start_matches('/').to_lowercase();
    let mut words = lower.split_whitespace();
    let keyword = words.next().unwrap_or("");
    let rest: Vec<&str> = words.collect();

    match keyword {
        "saldo" | "balance" => {
            let lang = if keyword == "saldo" { Lang::Id } else { Lang::En };
            if rest.is_empty() {
                balances_reply(conn, user_id, lang)
            } else {
                set_balance_command(conn, user_id, &rest, lang)
            }
        }
        "transaksi" | "transactions" => {
            let lang = if keyword == "transaksi" { Lang::Id } else { Lang::En };
            transactions_reply(conn, user_id, lang)
        }
        "bantuan" | "help" => {
            let lang = if keyword == "bantuan" { Lang::Id } else { Lang::En };
            let accounts = ledger::list_accounts(conn, user_id)?;
            Ok(help_message(lang, &accounts))
        }
        "akun" | "accounts" => {
            let lang = if keyword == "akun" { Lang::Id } else { Lang::En };
            default_account_command(conn, user_id, &rest, lang)
        }
        _ => Ok(clarification(guess_lang(text))),
    }
}

/// Structured intent from the external message parser.
pub fn handle_intent(conn: &Connection, user_id: &str, intent: Intent) -> Result<String> {
    match intent {
        Intent::Spending(tx) => record_intent(conn, user_id, TxKind::Spending, tx),
        Intent::Income(tx) => record_intent(conn, user_id, TxKind::Income, tx),
        Intent::Query {
            query_type,
            language,
        } => match query_type {
            QueryKind::Balance => balances_reply(conn, user_id, language),
            QueryKind::Transactions => transactions_reply(conn, user_id, language),
            QueryKind::Help => {
                let accounts = ledger::list_accounts(conn, user_id)?;
                Ok(help_message(language, &accounts))
            }
        },
        Intent::Unclear { language } => Ok(clarification(language)),
    }
}

fn record_intent(
    conn: &Connection,
    user_id: &str,
    kind: TxKind,
    tx: TxIntent,
) -> Result<String> {
    let lang = tx.language;
    let accounts = ledger::list_accounts(conn, user_id)?;

    // Name hint first, then the user's configured default, else unassigned.
    let mut account = tx
        .account_name
        .as_deref()
        .and_then(|hint| resolve_account(&accounts, hint));
    if account.is_none() {
        let settings = get_or_init_settings(conn, user_id)?;
        if let Some(default_id) = settings.telegram_default_account_id {
            account = accounts.iter().find(|a| a.id == default_id);
        }
    }

    let inserted = ledger::create_transaction(
        conn,
        user_id,
        &NewTransaction {
            account_id: account.map(|a| a.id),
            description: &tx.description,
            amount: tx.amount,
            category: tx.category.as_deref(),
            date: today(),
            kind,
        },
    );
    if inserted.is_err() {
        return Ok(match lang {
            Lang::Id => "Maaf, terjadi kesalahan saat menyimpan transaksi. Coba lagi.".into(),
            Lang::En => "Sorry, there was an error saving the transaction. Please try again.".into(),
        });
    }

    let (emoji, verb) = match (kind, lang) {
        (TxKind::Spending, Lang::Id) => ("💸", "Pengeluaran"),
        (TxKind::Spending, Lang::En) => ("💸", "Spending"),
        (TxKind::Income, Lang::Id) => ("💰", "Pemasukan"),
        (TxKind::Income, Lang::En) => ("💰", "Income"),
    };
    let recorded = match lang {
        Lang::Id => "dicatat!",
        Lang::En => "recorded!",
    };
    let mut reply = format!(
        "{} {} {}\n{}\n{}",
        emoji,
        verb,
        recorded,
        tx.description,
        format_idr(tx.amount)
    );
    if let Some(a) = account {
        reply.push_str(&format!("\nAkun: {}", a.name));
    }
    if let Some(c) = &tx.category {
        reply.push_str(&format!("\nKategori: {}", c));
    }
    reply.push_str(match lang {
        Lang::Id => "\n\n_Lihat detail di app Celengan_",
        Lang::En => "\n\n_View details in the Celengan app_",
    });
    Ok(reply)
}

fn set_balance_command(
    conn: &Connection,
    user_id: &str,
    args: &[&str],
    lang: Lang,
) -> Result<String> {
    let accounts = ledger::list_accounts(conn, user_id)?;
    if args.len() < 2 {
        return Ok(bad_amount_reply(lang));
    }
    let (name_words, amount_word) = args.split_at(args.len() - 1);
    let hint = name_words.join(" ");

    let Some(amount) = parse_amount(amount_word[0]) else {
        return Ok(bad_amount_reply(lang));
    };
    let Some(account) = resolve_account(&accounts, &hint) else {
        return Ok(unknown_account_reply(lang, &hint, &accounts));
    };

    ledger::set_balance(conn, user_id, account.id, amount)?;
    Ok(match lang {
        Lang::Id => format!("Saldo {} diubah ke {}.", account.name, format_idr(amount)),
        Lang::En => format!("{} balance set to {}.", account.name, format_idr(amount)),
    })
}

fn default_account_command(
    conn: &Connection,
    user_id: &str,
    args: &[&str],
    lang: Lang,
) -> Result<String> {
    let accounts = ledger::list_accounts(conn, user_id)?;
    if accounts.is_empty() {
        return Ok(match lang {
            Lang::Id => "Belum ada akun.".into(),
            Lang::En => "No accounts yet.".into(),
        });
    }
    let listing = accounts
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {} ({})", i + 1, a.name, format_idr(a.balance)))
        .collect::<Vec<_>>()
        .join("\n");

    match args.first() {
        None => Ok(match lang {
            Lang::Id => format!(
                "*Akunmu:*\n{}\n\nKirim \"akun <nomor>\" untuk memilih akun utama.",
                listing
            ),
            Lang::En => format!(
                "*Your accounts:*\n{}\n\nSend \"accounts <number>\" to pick a default account.",
                listing
            ),
        }),
        Some(raw) => {
            let selected = raw
                .parse::<usize>()
                .ok()
                .filter(|i| (1..=accounts.len()).contains(i))
                .map(|i| &accounts[i - 1]);
            let Some(account) = selected else {
                return Ok(match lang {
                    Lang::Id => format!("Nomor akun tidak valid. Pilih dari:\n{}", listing),
                    Lang::En => format!("Invalid account number. Pick one of:\n{}", listing),
                });
            };
            get_or_init_settings(conn, user_id)?;
            conn.execute(
                "UPDATE settings SET telegram_default_account_id=?1 WHERE user_id=?2",
                params![account.id, user_id],
            )?;
            Ok(match lang {
                Lang::Id => format!("Akun utama diubah ke {}.", account.name),
                Lang::En => format!("Default account set to {}.", account.name),
            })
        }
    }
}

fn balances_reply(conn: &Connection, user_id: &str, lang: Lang) -> Result<String> {
    let accounts = ledger::list_accounts(conn, user_id)?;
    let total: i64 = accounts.iter().map(|a| a.balance).sum();
    let lines = accounts
        .iter()
        .map(|a| format!("• {}: {}", a.name, format_idr(a.balance)))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(match lang {
        Lang::Id => format!(
            "*Saldo Akunmu:*\n{}\n*Total: {}*",
            lines,
            format_idr(total)
        ),
        Lang::En => format!(
            "*Your Account Balances:*\n{}\n*Total: {}*",
            lines,
            format_idr(total)
        ),
    })
}

fn transactions_reply(conn: &Connection, user_id: &str, lang: Lang) -> Result<String> {
    let month_start = crate::utils::month_start(today());
    let mut stmt = conn.prepare(
        "SELECT date, description, amount, type FROM transactions
         WHERE user_id=?1 AND date >= ?2
         ORDER BY date DESC, id DESC LIMIT 10",
    )?;
    let rows = stmt.query_map(params![user_id, month_start], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, TxKind>(3)?,
        ))
    })?;
    let mut lines = Vec::new();
    for row in rows {
        let (date, description, amount, kind) = row?;
        let sign = match kind {
            TxKind::Spending => "-",
            TxKind::Income => "+",
        };
        lines.push(format!(
            "• {}: {} {}{}",
            date,
            description,
            sign,
            format_idr(amount)
        ));
    }
    let listing = lines.join("\n");
    Ok(match lang {
        Lang::Id => format!(
            "*Transaksi Bulan Ini:*\n{}",
            if listing.is_empty() {
                "Belum ada transaksi.".to_string()
            } else {
                listing
            }
        ),
        Lang::En => format!(
            "*This Month's Transactions:*\n{}",
            if listing.is_empty() {
                "No transactions yet.".to_string()
            } else {
                listing
            }
        ),
    })
}

pub fn setup_instructions(lang: Lang) -> String {
    match lang {
        Lang::Id => "Halo! Identitas chat kamu belum terdaftar di Celengan.\n\nBuka aplikasi Celengan → Settings → Chat Integration, lalu masukkan username atau nomor HP kamu untuk mulai.".into(),
        Lang::En => "Hi! Your chat identity isn't registered in Celengan yet.\n\nOpen the Celengan app → Settings → Chat Integration, and enter your username or phone number to get started.".into(),
    }
}

pub fn clarification(lang: Lang) -> String {
    match lang {
        Lang::Id => "Maaf, saya tidak mengerti pesanmu. Coba kirim seperti:\n• \"Beli kopi 25rb\"\n• \"Gajian 5jt\"\n• \"Bayar listrik 150rb\"\n• Ketik \"bantuan\" untuk info lebih lanjut".into(),
        Lang::En => "Sorry, I didn't understand that. Try sending:\n• \"Coffee 25000\"\n• \"Salary 5000000\"\n• \"Electric bill 150000\"\n• Type \"help\" for more info".into(),
    }
}

fn bad_amount_reply(lang: Lang) -> String {
    match lang {
        Lang::Id => "Nominal tidak valid. Contoh: \"saldo BCA 1.5jt\", \"saldo Dompet 500rb\".".into(),
        Lang::En => "Invalid amount. Examples: \"balance BCA 1.5jt\", \"balance Wallet 500rb\".".into(),
    }
}

fn unknown_account_reply(lang: Lang, hint: &str, accounts: &[Account]) -> String {
    let names = accounts
        .iter()
        .map(|a| format!("• {}", a.name))
        .collect::<Vec<_>>()
        .join("\n");
    match lang {
        Lang::Id => format!(
            "Akun '{}' tidak ditemukan. Akun yang tersedia:\n{}",
            hint,
            if names.is_empty() { "(Belum ada akun)".to_string() } else { names }
        ),
        Lang::En => format!(
            "Account '{}' not found. Available accounts:\n{}",
            hint,
            if names.is_empty() { "(No accounts yet)".to_string() } else { names }
        ),
    }
}

pub fn help_message(lang: Lang, accounts: &[Account]) -> String {
    let acct_list = accounts
        .iter()
        .map(|a| format!("• {}", a.name))
        .collect::<Vec<_>>()
        .join("\n");
    match lang {
        Lang::Id => format!(
            "*Celengan Bot* - Catat transaksi via chat\n\n*Contoh pesan:*\n• \"Beli makan siang 35rb\"\n• \"Gajian 6jt\"\n• \"Bayar listrik 150rb dari BRI\"\n\n*Akunmu:*\n{}\n\n*Perintah:*\n• saldo - lihat saldo\n• saldo <akun> <nominal> - ubah saldo\n• transaksi - transaksi bulan ini\n• akun - pilih akun utama",
            if acct_list.is_empty() { "(Belum ada akun)".to_string() } else { acct_list }
        ),
        Lang::En => format!(
            "*Celengan Bot* - Log transactions via chat\n\n*Example messages:*\n• \"Lunch 35000\"\n• \"Salary 6000000\"\n• \"Electric bill 150000 from BRI\"\n\n*Your accounts:*\n{}\n\n*Commands:*\n• balance - view balances\n• balance <account> <amount> - set a balance\n• transactions - this month's transactions\n• accounts - pick a default account",
            if acct_list.is_empty() { "(No accounts yet)".to_string() } else { acct_list }
        ),
    }
}
