// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("celengan")
        .version(crate_version!())
        .about("Personal finance tracker: balance snapshots, reconciliation, net-worth trends")
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .default_value("local")
                .help("User id that owns the data"),
        )
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add an account (balance starts at 0)")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["cash", "investment"])
                                .default_value("cash"),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(["core", "satellite"])
                                .default_value("core"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List accounts")))
                .subcommand(
                    Command::new("rm")
                        .about("Delete an account, its history, and un-link its transactions")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("balance")
                        .about("Set an account balance (shorthand amounts accepted: 1.5jt, 500rb)")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(
                    Command::new("mode")
                        .about("Set balance mode: manual edits only, or auto-adjust from transactions")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("mode")
                                .required(true)
                                .value_parser(["manual", "auto"]),
                        ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(Arg::new("description").required(true))
                        .arg(Arg::new("amount").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["spending", "income"])
                                .default_value("spending"),
                        )
                        .arg(Arg::new("account").long("account").help("Account name"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today")),
                )
                .subcommand(
                    json_flags(
                        Command::new("list")
                            .about("List transactions")
                            .arg(Arg::new("month").long("month").help("YYYY-MM"))
                            .arg(Arg::new("account").long("account"))
                            .arg(
                                Arg::new("limit")
                                    .long("limit")
                                    .value_parser(value_parser!(usize)),
                            ),
                    ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction (reverses auto-mode balance effects)")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Inspect and correct balance history")
                .subcommand(
                    json_flags(
                        Command::new("list")
                            .about("List balance history entries, newest first")
                            .arg(Arg::new("account").long("account")),
                    ),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Correct a history entry (no chain re-validation)")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("balance").long("balance").required(true))
                        .arg(Arg::new("previous").long("previous").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a history entry without touching the live balance")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Reconciliation and trend reports")
                .subcommand(json_flags(
                    Command::new("reconcile")
                        .about("Expected vs actual balance changes, globally and per account"),
                ))
                .subcommand(
                    json_flags(
                        Command::new("networth")
                            .about("Net worth per calendar month")
                            .arg(
                                Arg::new("months")
                                    .long("months")
                                    .value_parser(value_parser!(usize))
                                    .default_value("6"),
                            ),
                    ),
                )
                .subcommand(Command::new("goal").about("Savings goal progress"))
                .subcommand(Command::new("rebalance").about("Core/satellite rebalancing suggestion")),
        )
        .subcommand(
            Command::new("chat")
                .about("Chat-bot command surface and intent handling")
                .subcommand(
                    Command::new("message")
                        .about("Handle a chat message and print the reply")
                        .arg(Arg::new("text").required(true))
                        .arg(Arg::new("telegram").long("telegram").help("Telegram username"))
                        .arg(Arg::new("whatsapp").long("whatsapp").help("WhatsApp phone, E.164")),
                )
                .subcommand(
                    Command::new("intent")
                        .about("Handle a structured intent (JSON from the message parser)")
                        .arg(Arg::new("json").required(true))
                        .arg(Arg::new("telegram").long("telegram"))
                        .arg(Arg::new("whatsapp").long("whatsapp")),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Per-user settings")
                .subcommand(Command::new("show").about("Show settings"))
                .subcommand(
                    Command::new("set")
                        .about("Update settings")
                        .arg(Arg::new("monthly-income").long("monthly-income"))
                        .arg(Arg::new("goal-target").long("goal-target"))
                        .arg(Arg::new("goal-target-date").long("goal-target-date"))
                        .arg(Arg::new("telegram").long("telegram"))
                        .arg(Arg::new("whatsapp").long("whatsapp"))
                        .arg(
                            Arg::new("default-account")
                                .long("default-account")
                                .help("Account name used when a chat message names none"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("csv")
                    .about("Monthly summary CSV: accounts and this month's transactions")
                    .arg(Arg::new("out").long("out").help("Output path, default stdout")),
            ),
        )
        .subcommand(Command::new("doctor").about("Report integrity issues without fixing them"))
}
