// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use serde::Serialize;

use super::{
    Desk, check_bank, opt_datetime, opt_str, positive, range_from_args, req_decimal, req_str,
    take_limit,
};
use crate::models::{Account, ExpenseEntry, ExpenseKind};
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};

pub fn handle(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(desk, sub)?,
        Some(("list", sub)) => list(desk, sub)?,
        Some(("rm", sub)) => {
            let id = req_str(sub, "id")?;
            desk.ledger
                .remove::<ExpenseEntry>(desk.store.as_ref(), id)
                .with_context(|| format!("Delete entry {}", id))?;
            println!("Removed entry {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(desk: &mut Desk, sub: &clap::ArgMatches) -> Result<()> {
    let bank = req_str(sub, "bank")?;
    check_bank(&desk.ledger, &Account::Real(bank.to_string()))?;
    let amount = positive(req_decimal(sub, "amount")?, "amount")?;
    let kind: ExpenseKind = opt_str(sub, "type").unwrap_or("expense").parse()?;

    let mut e = ExpenseEntry::new(bank, amount, kind);
    e.category = opt_str(sub, "category").unwrap_or_default().to_string();
    e.description = opt_str(sub, "description").unwrap_or_default().to_string();
    if let Some(at) = opt_datetime(sub, "at")? {
        e.created_at = at;
    }
    let summary = format!("Recorded {} {} on {} (id {})", kind, fmt_amount(&amount), bank, e.id);
    desk.ledger
        .create(desk.store.as_ref(), e)
        .context("Store entry")?;
    println!("{}", summary);
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub created_at: String,
    pub bank: String,
    pub kind: String,
    pub amount: String,
    pub category: String,
    pub description: String,
}

pub fn query_rows(desk: &Desk, sub: &clap::ArgMatches) -> Result<Vec<ExpenseRow>> {
    let range = range_from_args(sub)?;
    let kind = opt_str(sub, "type")
        .map(str::parse::<ExpenseKind>)
        .transpose()?;
    let rows = desk
        .ledger
        .all::<ExpenseEntry>()
        .iter()
        .filter(|e| range.contains(e.created_at))
        .filter(|e| kind.is_none_or(|k| e.kind == k))
        .map(|e| ExpenseRow {
            id: e.id.clone(),
            created_at: e.created_at.format("%Y-%m-%d %H:%M").to_string(),
            bank: e.bank.clone(),
            kind: e.kind.to_string(),
            amount: fmt_amount(&e.amount),
            category: e.category.clone(),
            description: e.description.clone(),
        })
        .collect();
    Ok(take_limit(rows, sub))
}

fn list(desk: &Desk, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(desk, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.created_at,
                    r.bank,
                    r.kind,
                    r.amount,
                    r.category,
                    r.description,
                    r.id,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Bank", "Type", "Amount", "Category", "Description", "Id"],
                rows,
            )
        );
    }
    Ok(())
}
