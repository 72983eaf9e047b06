// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{
    Desk, check_bank, check_platform, opt_datetime, opt_decimal, opt_str, positive,
    range_from_args, req_decimal, req_str, take_limit,
};
use crate::ledger::Collection;
use crate::models::{ADJUSTMENT, Account, BeneficiaryEntry, Side, Trade, line_total};
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};

pub fn handle<S: Side>(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()>
where
    Trade<S>: Collection,
{
    match m.subcommand() {
        Some(("add", sub)) => add::<S>(desk, sub)?,
        Some(("list", sub)) => list::<S>(desk, sub)?,
        Some(("edit", sub)) => edit::<S>(desk, sub)?,
        Some(("rm", sub)) => {
            let id = req_str(sub, "id")?;
            desk.ledger
                .remove::<Trade<S>>(desk.store.as_ref(), id)
                .with_context(|| format!("Delete {} {}", S::LABEL, id))?;
            println!("Removed {} {}", S::LABEL, id);
        }
        _ => {}
    }
    Ok(())
}

fn validate<S: Side>(desk: &Desk, t: &Trade<S>) -> Result<()> {
    if t.bank == ADJUSTMENT || t.platform == ADJUSTMENT {
        bail!("{} is reserved for transfers", ADJUSTMENT);
    }
    check_bank(&desk.ledger, &Account::from(t.bank.as_str()))?;
    check_platform(&desk.ledger, &Account::from(t.platform.as_str()))?;
    positive(t.price, "price")?;
    positive(t.effective_quantity(), "quantity")?;
    if let Some(id) = &t.beneficiary_id {
        if desk.ledger.find::<BeneficiaryEntry>(id).is_none() {
            bail!("Beneficiary '{}' not found", id);
        }
    }
    Ok(())
}

fn total_of(price: Decimal, quantity: Decimal) -> Result<Decimal> {
    line_total(price, quantity)
        .with_context(|| format!("Total of {} x {} is out of range", price, quantity))
}

fn add<S: Side>(desk: &mut Desk, sub: &clap::ArgMatches) -> Result<()>
where
    Trade<S>: Collection,
{
    let price = req_decimal(sub, "price")?;
    let quantity = req_decimal(sub, "quantity")?;
    let total = match opt_decimal(sub, "total")? {
        Some(total) => total,
        None => total_of(price, quantity)?,
    };
    let mut t = Trade::<S>::new(
        req_str(sub, "order")?,
        req_str(sub, "bank")?,
        req_str(sub, "platform")?,
        price,
        quantity,
    );
    t.total_price = total;
    if let Some(name) = opt_str(sub, "name") {
        t.name = name.to_string();
    }
    if let Some(contact) = opt_str(sub, "contact") {
        t.contact_no = contact.to_string();
    }
    t.beneficiary_id = opt_str(sub, "beneficiary").map(str::to_string);
    if let Some(at) = opt_datetime(sub, "at")? {
        t.created_at = at;
    }
    validate(desk, &t)?;

    let summary = format!(
        "Recorded {} {} x {} @ {} on {} (id {})",
        S::LABEL,
        t.effective_quantity(),
        t.platform,
        t.price,
        t.bank,
        t.id
    );
    desk.ledger
        .create(desk.store.as_ref(), t)
        .with_context(|| format!("Store {}", S::LABEL))?;
    println!("{}", summary);
    Ok(())
}

#[derive(Serialize)]
pub struct TradeRow {
    pub id: String,
    pub created_at: String,
    pub order_number: String,
    pub platform: String,
    pub bank: String,
    pub price: String,
    pub quantity: String,
    pub total_price: String,
    pub name: String,
    pub edited_by: String,
}

pub fn query_rows<S: Side>(desk: &Desk, sub: &clap::ArgMatches) -> Result<Vec<TradeRow>>
where
    Trade<S>: Collection,
{
    let range = range_from_args(sub)?;
    let platform = opt_str(sub, "platform");
    let bank = opt_str(sub, "bank");
    let rows = desk
        .ledger
        .all::<Trade<S>>()
        .iter()
        .filter(|t| range.contains(t.created_at))
        .filter(|t| platform.is_none_or(|p| t.platform == p))
        .filter(|t| bank.is_none_or(|b| t.bank == b))
        .map(|t| TradeRow {
            id: t.id.clone(),
            created_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
            order_number: t.order_number.clone(),
            platform: t.platform.clone(),
            bank: t.bank.clone(),
            price: t.price.to_string(),
            quantity: t.effective_quantity().to_string(),
            total_price: fmt_amount(&t.total_price),
            name: t.name.clone(),
            edited_by: t.edited_by.clone().unwrap_or_default(),
        })
        .collect();
    Ok(take_limit(rows, sub))
}

fn list<S: Side>(desk: &Desk, sub: &clap::ArgMatches) -> Result<()>
where
    Trade<S>: Collection,
{
    let data = query_rows::<S>(desk, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.created_at,
                    r.order_number,
                    r.platform,
                    r.bank,
                    r.price,
                    r.quantity,
                    r.total_price,
                    r.name,
                    r.id,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Order", "Platform", "Bank", "Price", "Qty", "Total", "Name", "Id"],
                rows,
            )
        );
    }
    Ok(())
}

fn edit<S: Side>(desk: &mut Desk, sub: &clap::ArgMatches) -> Result<()>
where
    Trade<S>: Collection,
{
    let id = req_str(sub, "id")?;
    let session = desk.session()?.clone();
    let mut t = desk
        .ledger
        .find::<Trade<S>>(id)
        .cloned()
        .with_context(|| format!("{} '{}' not found", S::LABEL, id))?;

    if let Some(v) = opt_str(sub, "order") {
        t.order_number = v.to_string();
    }
    if let Some(v) = opt_str(sub, "bank") {
        t.bank = v.to_string();
    }
    if let Some(v) = opt_str(sub, "platform") {
        t.platform = v.to_string();
    }
    let quantity_before = t.effective_quantity();
    let price = opt_decimal(sub, "price")?;
    let quantity = opt_decimal(sub, "quantity")?;
    if let Some(v) = price {
        t.price = v;
    }
    if let Some(v) = quantity {
        t.quantity = Some(v);
    }
    match opt_decimal(sub, "total")? {
        Some(v) => t.total_price = v,
        None if price.is_some() || quantity.is_some() => {
            t.total_price = total_of(t.price, t.quantity.unwrap_or(quantity_before))?;
        }
        None => {}
    }
    if let Some(v) = opt_str(sub, "name") {
        t.name = v.to_string();
    }
    if let Some(v) = opt_str(sub, "contact") {
        t.contact_no = v.to_string();
    }
    if let Some(v) = opt_str(sub, "beneficiary") {
        t.beneficiary_id = Some(v.to_string()).filter(|s| !s.is_empty());
    }
    validate(desk, &t)?;

    let saved = desk
        .ledger
        .update(desk.store.as_ref(), &session, t)
        .with_context(|| format!("Update {} {}", S::LABEL, id))?;
    println!(
        "Updated {} {} (by {})",
        S::LABEL,
        saved.id,
        saved.edited_by.unwrap_or_default()
    );
    Ok(())
}
