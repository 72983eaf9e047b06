// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;

use super::{Desk, opt_decimal};
use crate::price::push_settings;
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};

pub fn handle(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(desk, sub)?,
        Some(("set", sub)) => set(desk, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(desk: &Desk, sub: &clap::ArgMatches) -> Result<()> {
    let s = &desk.ledger.settings;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), s)? {
        let last = chrono::DateTime::from_timestamp_millis(s.last_usdt_price_update)
            .filter(|_| s.last_usdt_price_update > 0)
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        let range = if s.sales_price_range > Decimal::ZERO {
            fmt_amount(&s.sales_price_range)
        } else {
            "calculated".to_string()
        };
        let rows = vec![
            vec!["Required margin %".to_string(), fmt_amount(&s.required_margin)],
            vec!["USD price".to_string(), s.current_usd_price.to_string()],
            vec!["Sales price range".to_string(), range],
            vec!["Buy price (USDT)".to_string(), s.buy_price_usdt.to_string()],
            vec!["Price updated".to_string(), last],
        ];
        println!("{}", pretty_table(&["Setting", "Value"], rows));
    }
    Ok(())
}

fn non_negative(v: Option<Decimal>, what: &str) -> Result<Option<Decimal>> {
    match v {
        Some(d) if d < Decimal::ZERO => bail!("{} cannot be negative, got {}", what, d),
        other => Ok(other),
    }
}

fn set(desk: &mut Desk, sub: &clap::ArgMatches) -> Result<()> {
    let mut next = desk.ledger.settings.clone();
    if let Some(v) = non_negative(opt_decimal(sub, "required-margin")?, "required margin")? {
        next.required_margin = v;
    }
    if let Some(v) = non_negative(opt_decimal(sub, "sales-price-range")?, "sales price range")? {
        next.sales_price_range = v;
    }
    if let Some(v) = non_negative(opt_decimal(sub, "buy-price-usdt")?, "buy price")? {
        next.buy_price_usdt = v;
    }
    if let Some(v) = non_negative(opt_decimal(sub, "usd-price")?, "usd price")? {
        next.current_usd_price = v;
        next.last_usdt_price_update = chrono::Utc::now().timestamp_millis();
    }
    push_settings(desk.store.as_ref(), &next).context("Store settings")?;
    desk.ledger.settings = next;
    println!("Settings saved");
    Ok(())
}
