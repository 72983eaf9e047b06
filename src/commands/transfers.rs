// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use serde::Serialize;

use super::{
    Desk, check_bank, check_platform, opt_datetime, opt_str, positive, req_decimal, req_str,
    take_limit,
};
use crate::models::{Account, BankTransferEntry, TransferEntry};
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};

fn check_ends(from: &Account, to: &Account) -> Result<()> {
    if from == to {
        bail!("Transfer source and target are both '{}'", from);
    }
    Ok(())
}

pub fn handle_stock(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let from = Account::from(req_str(sub, "from")?);
            let to = Account::from(req_str(sub, "to")?);
            let quantity = positive(req_decimal(sub, "quantity")?, "quantity")?;
            check_ends(&from, &to)?;
            check_platform(&desk.ledger, &from)?;
            check_platform(&desk.ledger, &to)?;

            let mut t = TransferEntry::new(from, to, quantity);
            if let Some(at) = opt_datetime(sub, "at")? {
                t.created_at = at;
            }
            let summary = format!("Moved {} from {} to {} (id {})", t.quantity, t.from, t.to, t.id);
            desk.ledger
                .create(desk.store.as_ref(), t)
                .context("Store transfer")?;
            println!("{}", summary);
        }
        Some(("list", sub)) => {
            let data: Vec<TransferRow> = desk
                .ledger
                .all::<TransferEntry>()
                .iter()
                .map(|t| TransferRow {
                    id: t.id.clone(),
                    created_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    from: t.from.to_string(),
                    to: t.to.to_string(),
                    amount: t.quantity.to_string(),
                    reference: String::new(),
                })
                .collect();
            print_rows(take_limit(data, sub), sub, "Qty")?;
        }
        Some(("rm", sub)) => {
            let id = req_str(sub, "id")?;
            desk.ledger
                .remove::<TransferEntry>(desk.store.as_ref(), id)
                .with_context(|| format!("Delete transfer {}", id))?;
            println!("Removed transfer {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_cash(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let from = Account::from(req_str(sub, "from-bank")?);
            let to = Account::from(req_str(sub, "to-bank")?);
            let amount = positive(req_decimal(sub, "amount")?, "amount")?;
            check_ends(&from, &to)?;
            check_bank(&desk.ledger, &from)?;
            check_bank(&desk.ledger, &to)?;

            let mut t = BankTransferEntry::new(from, to, amount);
            t.from_account = opt_str(sub, "from-account").unwrap_or_default().to_string();
            t.to_account = opt_str(sub, "to-account").unwrap_or_default().to_string();
            t.reference = opt_str(sub, "reference").unwrap_or_default().to_string();
            if let Some(at) = opt_datetime(sub, "at")? {
                t.created_at = at;
            }
            let summary = format!(
                "Moved {} from {} to {} (id {})",
                fmt_amount(&t.amount),
                t.from_bank,
                t.to_bank,
                t.id
            );
            desk.ledger
                .create(desk.store.as_ref(), t)
                .context("Store bank transfer")?;
            println!("{}", summary);
        }
        Some(("list", sub)) => {
            let data: Vec<TransferRow> = desk
                .ledger
                .all::<BankTransferEntry>()
                .iter()
                .map(|t| TransferRow {
                    id: t.id.clone(),
                    created_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    from: join_account(&t.from_bank, &t.from_account),
                    to: join_account(&t.to_bank, &t.to_account),
                    amount: fmt_amount(&t.amount),
                    reference: t.reference.clone(),
                })
                .collect();
            print_rows(take_limit(data, sub), sub, "Amount")?;
        }
        Some(("rm", sub)) => {
            let id = req_str(sub, "id")?;
            desk.ledger
                .remove::<BankTransferEntry>(desk.store.as_ref(), id)
                .with_context(|| format!("Delete bank transfer {}", id))?;
            println!("Removed bank transfer {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn join_account(bank: &Account, account: &str) -> String {
    if account.is_empty() {
        bank.to_string()
    } else {
        format!("{} / {}", bank, account)
    }
}

#[derive(Serialize)]
struct TransferRow {
    id: String,
    created_at: String,
    from: String,
    to: String,
    amount: String,
    reference: String,
}

fn print_rows(data: Vec<TransferRow>, sub: &clap::ArgMatches, amount_hdr: &str) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| vec![r.created_at, r.from, r.to, r.amount, r.reference, r.id])
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "From", "To", amount_hdr, "Reference", "Id"], rows)
        );
    }
    Ok(())
}
