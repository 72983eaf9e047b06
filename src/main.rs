// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use env_logger::Env;

use tradedesk::commands::{self, Desk};
use tradedesk::config::Config;
use tradedesk::models::{BankKind, PlatformKind, Purchase, Sale};
use tradedesk::cli;

fn main() -> Result<()> {
    env_logger::try_init_from_env(Env::default().default_filter_or("tradedesk=info"))?;

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config = Config::from_env()?;
    let store = config.open_store()?;
    let mut desk = Desk::new(store, config.session.clone());

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Store ready ({})", config.describe());
            return Ok(());
        }
        Some(("sync", sub)) => return commands::sync::handle(&mut desk, sub),
        Some(_) => {
            desk.load()?;
        }
        None => {}
    }

    match matches.subcommand() {
        Some(("sale", sub)) => commands::trades::handle::<Sale>(&mut desk, sub)?,
        Some(("purchase", sub)) => commands::trades::handle::<Purchase>(&mut desk, sub)?,
        Some(("transfer", sub)) => commands::transfers::handle_stock(&mut desk, sub)?,
        Some(("bank-transfer", sub)) => commands::transfers::handle_cash(&mut desk, sub)?,
        Some(("expense", sub)) => commands::expenses::handle(&mut desk, sub)?,
        Some(("beneficiary", sub)) => commands::beneficiaries::handle(&mut desk, sub)?,
        Some(("bank", sub)) => commands::entities::handle::<BankKind>(&mut desk, sub)?,
        Some(("platform", sub)) => commands::entities::handle::<PlatformKind>(&mut desk, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&mut desk, sub)?,
        Some(("price", sub)) => commands::price::handle(&mut desk, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&mut desk, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
