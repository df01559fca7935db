// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Row;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Enums stored as TEXT columns. Generates `as_str`, `FromStr`, `Display`
/// and the rusqlite conversions so rows can be read/written directly.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("invalid value '{}'", other)),
                }
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }

        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }
    };
}

text_enum!(AccountKind {
    Cash => "cash",
    Investment => "investment",
});

text_enum!(AccountTier {
    Core => "core",
    Satellite => "satellite",
});

text_enum!(BalanceMode {
    Manual => "manual",
    Auto => "auto",
});

text_enum!(TxKind {
    Spending => "spending",
    Income => "income",
});

text_enum!(Lang {
    Id => "id",
    En => "en",
});

text_enum!(QueryKind {
    Balance => "balance",
    Transactions => "transactions",
    Help => "help",
});

impl TxKind {
    /// Direction is carried by the kind, not by the sign of the amount.
    pub fn signed_amount(&self, amount: i64) -> i64 {
        match self {
            TxKind::Income => amount,
            TxKind::Spending => -amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub tier: AccountTier,
    pub balance: i64,
    pub balance_mode: BalanceMode,
}

impl Account {
    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            kind: r.get(3)?,
            tier: r.get(4)?,
            balance: r.get(5)?,
            balance_mode: r.get(6)?,
        })
    }
}

/// One balance_history row. `recorded_at` keeps the store's text timestamp
/// (`YYYY-MM-DD HH:MM:SS`); ordering ties are broken by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub id: i64,
    pub account_id: i64,
    pub balance_at_time: i64,
    pub previous_balance: i64,
    pub recorded_at: String,
}

impl BalanceEntry {
    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BalanceEntry {
            id: r.get(0)?,
            account_id: r.get(1)?,
            balance_at_time: r.get(2)?,
            previous_balance: r.get(3)?,
            recorded_at: r.get(4)?,
        })
    }

    pub fn recorded_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.recorded_at.get(..10)?, "%Y-%m-%d").ok()
    }

    /// Calendar-month key, `YYYY-MM`.
    pub fn month_key(&self) -> &str {
        self.recorded_at.get(..7).unwrap_or(&self.recorded_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub account_id: Option<i64>,
    pub description: String,
    pub amount: i64,
    pub category: Option<String>,
    pub date: NaiveDate,
    pub kind: TxKind,
}

impl Transaction {
    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: r.get(0)?,
            user_id: r.get(1)?,
            account_id: r.get(2)?,
            description: r.get(3)?,
            amount: r.get(4)?,
            category: r.get(5)?,
            date: r.get(6)?,
            kind: r.get(7)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub user_id: String,
    pub monthly_income: i64,
    pub goal_target: i64,
    pub goal_target_date: NaiveDate,
    pub telegram_username: Option<String>,
    pub telegram_default_account_id: Option<i64>,
    pub whatsapp_phone: Option<String>,
}

impl Settings {
    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Settings {
            user_id: r.get(0)?,
            monthly_income: r.get(1)?,
            goal_target: r.get(2)?,
            goal_target_date: r.get(3)?,
            telegram_username: r.get(4)?,
            telegram_default_account_id: r.get(5)?,
            whatsapp_phone: r.get(6)?,
        })
    }
}

/// Structured intent delivered by the external message parser. Its JSON shape
/// is the contract; anything that fails to deserialize is treated as Unclear.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Intent {
    Spending(TxIntent),
    Income(TxIntent),
    Query { query_type: QueryKind, language: Lang },
    Unclear { language: Lang },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxIntent {
    pub amount: i64,
    pub description: String,
    pub category: Option<String>,
    pub account_name: Option<String>,
    pub language: Lang,
}
