// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use chrono::NaiveDate;

use super::{Desk, opt_str, range_from_args};
use crate::balances::{bank_balances, platform_balances};
use crate::metrics::DashboardSummary;
use crate::models::ExpenseKind;
use crate::range::DateRange;
use crate::series::{Bucket, bucketize, fill_days, fill_hours, npm_series};
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};

pub fn handle(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(desk, sub)?,
        Some(("balances", sub)) => balances(desk, sub)?,
        Some(("series", sub)) => {
            let data = series(desk, sub)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|b| vec![b.iso_key, b.label, fmt_amount(&b.amount)])
                    .collect();
                println!("{}", pretty_table(&["Key", "Label", "Amount"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

fn summary(desk: &Desk, sub: &clap::ArgMatches) -> Result<()> {
    let range = range_from_args(sub)?;
    let s = DashboardSummary::compute(&desk.ledger, &range);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let rows = vec![
            vec!["Sales".into(), fmt_amount(&s.sales.value), s.sales.quantity.to_string()],
            vec![
                "Purchases".into(),
                fmt_amount(&s.purchases.value),
                s.purchases.quantity.to_string(),
            ],
            vec!["Expenses".into(), fmt_amount(&s.expenses), String::new()],
            vec!["Incomes".into(), fmt_amount(&s.incomes), String::new()],
            vec![
                "Margin %".into(),
                fmt_amount(&s.current_margin),
                format!(
                    "required {} ({})",
                    fmt_amount(&s.required_margin),
                    if s.margin_met { "met" } else { "below" }
                ),
            ],
            vec!["Sales price range".into(), fmt_amount(&s.sales_price_range), String::new()],
            vec!["Buy price range %".into(), fmt_amount(&s.buy_price_range), String::new()],
            vec!["Net profit margin".into(), fmt_amount(&s.net_profit_margin), String::new()],
            vec!["USD price".into(), s.usd_price.to_string(), String::new()],
            vec!["Stock (all platforms)".into(), s.total_stock.to_string(), String::new()],
            vec!["Cash (all banks)".into(), fmt_amount(&s.total_cash), String::new()],
        ];
        println!("{}", pretty_table(&["Metric", "Value", "Detail"], rows));
    }
    Ok(())
}

fn balances(desk: &Desk, sub: &clap::ArgMatches) -> Result<()> {
    let stock = platform_balances(&desk.ledger);
    let cash = bank_balances(&desk.ledger);
    let all: Vec<_> = stock
        .iter()
        .map(|b| ("platform", b))
        .chain(cash.iter().map(|b| ("bank", b)))
        .map(|(kind, b)| serde_json::json!({"kind": kind, "name": b.name, "amount": b.amount}))
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &all)? {
        let rows = stock
            .iter()
            .map(|b| vec!["platform".to_string(), b.name.clone(), b.amount.to_string()])
            .chain(
                cash.iter()
                    .map(|b| vec!["bank".to_string(), b.name.clone(), fmt_amount(&b.amount)]),
            )
            .collect();
        println!("{}", pretty_table(&["Kind", "Name", "Balance"], rows));
    }
    Ok(())
}

pub fn series(desk: &Desk, sub: &clap::ArgMatches) -> Result<Vec<Bucket>> {
    let range = range_from_args(sub)?;
    let single_day = range.single_day();
    let ledger = &desk.ledger;
    let sparse = match opt_str(sub, "kind").unwrap_or("sales") {
        "sales" => bucketize(
            range
                .filter(&ledger.sales, |s| s.created_at)
                .into_iter()
                .map(|s| (s.created_at, s.total_price)),
            single_day,
        ),
        "purchases" => bucketize(
            range
                .filter(&ledger.purchases, |p| p.created_at)
                .into_iter()
                .map(|p| (p.created_at, p.total_price)),
            single_day,
        ),
        kind @ ("expenses" | "incomes") => {
            let want = if kind == "expenses" {
                ExpenseKind::Expense
            } else {
                ExpenseKind::Income
            };
            bucketize(
                range
                    .filter(&ledger.expenses, |e| e.created_at)
                    .into_iter()
                    .filter(|e| e.kind == want)
                    .map(|e| (e.created_at, e.amount)),
                single_day,
            )
        }
        "npm" => npm_series(
            &range.filter(&ledger.sales, |s| s.created_at),
            &range.filter(&ledger.purchases, |p| p.created_at),
            single_day,
        ),
        other => bail!("Unknown series kind '{}' (use sales|purchases|expenses|incomes|npm)", other),
    };
    if !sub.get_flag("dense") {
        return Ok(sparse);
    }
    if single_day {
        return Ok(fill_hours(sparse));
    }
    Ok(match day_span(&range, &sparse) {
        Some((start, end)) => fill_days(sparse, start, end),
        None => sparse,
    })
}

fn day_span(range: &DateRange, sparse: &[Bucket]) -> Option<(NaiveDate, NaiveDate)> {
    if range.is_active {
        let (start, end) = range.bounds();
        return Some((start.date_naive(), end.date_naive()));
    }
    let parse = |b: &Bucket| NaiveDate::parse_from_str(&b.iso_key, "%Y-%m-%d").ok();
    Some((parse(sparse.first()?)?, parse(sparse.last()?)?))
}
