// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn req(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

fn flag(name: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue)
}

fn output_flags(cmd: Command) -> Command {
    cmd.arg(flag("json").help("Print JSON"))
        .arg(flag("jsonl").help("Print one JSON object per line"))
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(opt("from").help("Start (RFC 3339 or YYYY-MM-DD)"))
        .arg(opt("to").help("End, inclusive (RFC 3339 or YYYY-MM-DD); needs --from"))
}

fn limit_arg() -> Arg {
    opt("limit").value_parser(value_parser!(usize))
}

fn trade_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand(
            Command::new("add")
                .about("Record a trade")
                .arg(req("order").help("Order number"))
                .arg(req("bank"))
                .arg(req("platform"))
                .arg(req("price").help("Unit price"))
                .arg(req("quantity"))
                .arg(opt("total").help("Total price (default price x quantity)"))
                .arg(opt("name").help("Counterparty name"))
                .arg(opt("contact").help("Counterparty contact number"))
                .arg(opt("beneficiary").help("Beneficiary id"))
                .arg(opt("at").help("Timestamp (default now)")),
        )
        .subcommand(output_flags(range_args(
            Command::new("list")
                .about("List trades, newest first")
                .arg(opt("platform"))
                .arg(opt("bank"))
                .arg(limit_arg()),
        )))
        .subcommand(
            Command::new("edit")
                .about("Replace fields of a trade")
                .arg(req("id"))
                .arg(opt("order"))
                .arg(opt("bank"))
                .arg(opt("platform"))
                .arg(opt("price"))
                .arg(opt("quantity"))
                .arg(opt("total"))
                .arg(opt("name"))
                .arg(opt("contact"))
                .arg(opt("beneficiary")),
        )
        .subcommand(Command::new("rm").about("Delete a trade").arg(req("id")))
}

fn entity_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand(
            Command::new("add")
                .arg(req("name"))
                .arg(opt("description")),
        )
        .subcommand(output_flags(
            Command::new("list").arg(flag("all").help("Include inactive")),
        ))
        .subcommand(Command::new("activate").arg(req("name")))
        .subcommand(Command::new("deactivate").arg(req("name")))
        .subcommand(Command::new("rm").arg(req("name")))
}

pub fn build_cli() -> Command {
    Command::new("tradedesk")
        .about("Trading desk ledger: stock per platform, cash per bank, margins and price sync")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the local store"))
        .subcommand(output_flags(
            Command::new("sync").about("Refresh every collection from the store"),
        ))
        .subcommand(trade_cmd("sale", "Sales"))
        .subcommand(trade_cmd("purchase", "Purchases"))
        .subcommand(
            Command::new("transfer")
                .about("Platform-to-platform stock transfers")
                .subcommand(
                    Command::new("add")
                        .arg(req("from").help("Source platform or ADJUSTMENT"))
                        .arg(req("to").help("Target platform or ADJUSTMENT"))
                        .arg(req("quantity"))
                        .arg(opt("at")),
                )
                .subcommand(output_flags(Command::new("list").arg(limit_arg())))
                .subcommand(Command::new("rm").arg(req("id"))),
        )
        .subcommand(
            Command::new("bank-transfer")
                .about("Bank-to-bank cash transfers")
                .subcommand(
                    Command::new("add")
                        .arg(req("from-bank").help("Source bank or ADJUSTMENT"))
                        .arg(opt("from-account"))
                        .arg(req("to-bank").help("Target bank or ADJUSTMENT"))
                        .arg(opt("to-account"))
                        .arg(req("amount"))
                        .arg(opt("reference"))
                        .arg(opt("at")),
                )
                .subcommand(output_flags(Command::new("list").arg(limit_arg())))
                .subcommand(Command::new("rm").arg(req("id"))),
        )
        .subcommand(
            Command::new("expense")
                .about("Expenses and incomes")
                .subcommand(
                    Command::new("add")
                        .arg(req("bank"))
                        .arg(req("amount"))
                        .arg(opt("type").default_value("expense").help("expense|income"))
                        .arg(opt("category"))
                        .arg(opt("description"))
                        .arg(opt("at")),
                )
                .subcommand(output_flags(range_args(
                    Command::new("list").arg(opt("type")).arg(limit_arg()),
                )))
                .subcommand(Command::new("rm").arg(req("id"))),
        )
        .subcommand(
            Command::new("beneficiary")
                .about("Counterparty records")
                .subcommand(
                    Command::new("add")
                        .arg(req("name"))
                        .arg(opt("contact"))
                        .arg(opt("gov-id"))
                        .arg(opt("risk").default_value("low").help("low|medium|high|critical"))
                        .arg(opt("bank").help("Assigned bank")),
                )
                .subcommand(output_flags(Command::new("list").arg(opt("risk"))))
                .subcommand(
                    Command::new("edit")
                        .arg(req("id"))
                        .arg(opt("name"))
                        .arg(opt("contact"))
                        .arg(opt("gov-id"))
                        .arg(opt("risk"))
                        .arg(opt("bank")),
                )
                .subcommand(
                    Command::new("attach")
                        .about("Attach file metadata")
                        .arg(req("id"))
                        .arg(req("file"))
                        .arg(opt("content-type")),
                )
                .subcommand(Command::new("rm").arg(req("id"))),
        )
        .subcommand(entity_cmd("bank", "Banks holding cash"))
        .subcommand(entity_cmd("platform", "Platforms holding stock"))
        .subcommand(
            Command::new("settings")
                .about("Desk settings")
                .subcommand(output_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(opt("required-margin"))
                        .arg(opt("sales-price-range").help("0 = use calculated"))
                        .arg(opt("buy-price-usdt"))
                        .arg(opt("usd-price")),
                ),
        )
        .subcommand(
            Command::new("price")
                .about("USD quote")
                .subcommand(Command::new("fetch").about("Fetch once (cached for 60s)"))
                .subcommand(
                    Command::new("watch")
                        .about("Fetch on an interval")
                        .arg(
                            opt("interval")
                                .value_parser(value_parser!(u64))
                                .default_value("60")
                                .help("Seconds between fetches"),
                        )
                        .arg(
                            opt("count")
                                .value_parser(value_parser!(usize))
                                .help("Stop after this many fetches"),
                        ),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Balances, margins and series")
                .subcommand(output_flags(range_args(Command::new("summary"))))
                .subcommand(output_flags(Command::new("balances")))
                .subcommand(output_flags(range_args(
                    Command::new("series")
                        .arg(
                            opt("kind")
                                .default_value("sales")
                                .help("sales|purchases|expenses|incomes|npm"),
                        )
                        .arg(flag("dense").help("Pad empty hours/days with zero")),
                ))),
        )
}
