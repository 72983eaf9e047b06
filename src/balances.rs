// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stock per platform and cash per bank.
//!
//! Both balances are "inflows minus outflows plus netted transfers". Transfers
//! between two real accounts move value from one to the other; a transfer with
//! `Account::Adjustment` on one side is a one-sided correction to the real side.

use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::Ledger;
use crate::models::{
    Account, BankTransferEntry, ExpenseEntry, ExpenseKind, PurchaseEntry, SalesEntry,
    TransferEntry,
};
use crate::utils::checked_sum;

/// Net effect of a set of `(from, to, amount)` movements on account `name`,
/// or `None` on overflow.
pub fn checked_net_flow<'a, I>(name: &str, movements: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (&'a Account, &'a Account, Decimal)>,
{
    let mut net = Decimal::ZERO;
    for (from, to, amount) in movements {
        match (from, to) {
            (Account::Real(f), Account::Real(t)) => {
                if t == name {
                    net = net.checked_add(amount)?;
                }
                if f == name {
                    net = net.checked_sub(amount)?;
                }
            }
            (Account::Adjustment, Account::Real(t)) if t == name => {
                net = net.checked_add(amount)?
            }
            (Account::Real(f), Account::Adjustment) if f == name => {
                net = net.checked_sub(amount)?
            }
            _ => {}
        }
    }
    Some(net)
}

/// As [`checked_net_flow`], 0 on overflow.
pub fn net_flow<'a, I>(name: &str, movements: I) -> Decimal
where
    I: IntoIterator<Item = (&'a Account, &'a Account, Decimal)>,
{
    checked_net_flow(name, movements).unwrap_or(Decimal::ZERO)
}

pub fn stock_balance(
    purchases: &[PurchaseEntry],
    sales: &[SalesEntry],
    transfers: &[TransferEntry],
    platform: &str,
) -> Decimal {
    let balance = || -> Option<Decimal> {
        let purchased = checked_sum(
            purchases
                .iter()
                .filter(|p| p.platform == platform)
                .map(|p| p.effective_quantity()),
        )?;
        let sold = checked_sum(
            sales
                .iter()
                .filter(|s| s.platform == platform)
                .map(|s| s.effective_quantity()),
        )?;
        let moved = checked_net_flow(
            platform,
            transfers.iter().map(|t| (&t.from, &t.to, t.quantity)),
        )?;
        purchased.checked_sub(sold)?.checked_add(moved)
    };
    balance().unwrap_or_else(|| {
        warn!("stock balance of {} overflowed", platform);
        Decimal::ZERO
    })
}

pub fn cash_balance(
    bank: &str,
    sales: &[SalesEntry],
    purchases: &[PurchaseEntry],
    expenses: &[ExpenseEntry],
    bank_transfers: &[BankTransferEntry],
) -> Decimal {
    let of_kind = |kind: ExpenseKind| {
        checked_sum(
            expenses
                .iter()
                .filter(|e| e.bank == bank && e.kind == kind)
                .map(|e| e.amount),
        )
    };
    let balance = || -> Option<Decimal> {
        let sales_total = checked_sum(
            sales
                .iter()
                .filter(|s| s.bank == bank)
                .map(|s| s.total_price),
        )?;
        let purchases_total = checked_sum(
            purchases
                .iter()
                .filter(|p| p.bank == bank)
                .map(|p| p.total_price),
        )?;
        let moved = checked_net_flow(
            bank,
            bank_transfers
                .iter()
                .map(|t| (&t.from_bank, &t.to_bank, t.amount)),
        )?;
        sales_total
            .checked_sub(purchases_total)?
            .checked_sub(of_kind(ExpenseKind::Expense)?)?
            .checked_add(of_kind(ExpenseKind::Income)?)?
            .checked_add(moved)
    };
    balance().unwrap_or_else(|| {
        warn!("cash balance of {} overflowed", bank);
        Decimal::ZERO
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub name: String,
    pub amount: Decimal,
}

/// Stock for every active platform, by name.
pub fn platform_balances(ledger: &Ledger) -> Vec<Balance> {
    let mut names: Vec<&str> = ledger
        .platforms
        .iter()
        .filter(|p| p.is_active)
        .map(|p| p.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .map(|name| Balance {
            name: name.to_string(),
            amount: stock_balance(&ledger.purchases, &ledger.sales, &ledger.transfers, name),
        })
        .collect()
}

/// Cash for every active bank, by name.
pub fn bank_balances(ledger: &Ledger) -> Vec<Balance> {
    let mut names: Vec<&str> = ledger
        .banks
        .iter()
        .filter(|b| b.is_active)
        .map(|b| b.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .map(|name| Balance {
            name: name.to_string(),
            amount: cash_balance(
                name,
                &ledger.sales,
                &ledger.purchases,
                &ledger.expenses,
                &ledger.bank_transfers,
            ),
        })
        .collect()
}
