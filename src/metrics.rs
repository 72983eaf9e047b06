// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Margins and price spreads. Every function here returns zero instead of
//! failing when a denominator is empty or the arithmetic overflows.

use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::balances::{bank_balances, platform_balances};
use crate::ledger::Ledger;
use crate::models::{ExpenseKind, PurchaseEntry, SalesEntry, Settings, Side, Trade};
use crate::range::DateRange;
use crate::utils::{checked_sum, round2};

/// Summed value and quantity of a set of trades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TradeTotals {
    pub value: Decimal,
    pub quantity: Decimal,
    pub count: usize,
}

impl TradeTotals {
    /// Zeroed totals when the sums overflow.
    pub fn of<'a, S, I>(trades: I) -> Self
    where
        S: Side,
        I: IntoIterator<Item = &'a Trade<S>>,
    {
        Self::checked_of(trades).unwrap_or_else(|| {
            warn!("{} totals overflowed", S::LABEL);
            Self::default()
        })
    }

    pub fn checked_of<'a, S, I>(trades: I) -> Option<Self>
    where
        S: Side,
        I: IntoIterator<Item = &'a Trade<S>>,
    {
        trades.into_iter().try_fold(Self::default(), |acc, t| {
            Some(Self {
                value: acc.value.checked_add(t.total_price)?,
                quantity: acc.quantity.checked_add(t.effective_quantity())?,
                count: acc.count + 1,
            })
        })
    }

    /// Value per unit, or `None` when there is no positive quantity.
    pub fn unit_price(&self) -> Option<Decimal> {
        if self.quantity <= Decimal::ZERO {
            return None;
        }
        self.value.checked_div(self.quantity)
    }
}

/// `(sales − purchases) / purchases × 100`, 0 when nothing was bought.
pub fn current_margin(sales_total: Decimal, purchases_total: Decimal) -> Decimal {
    if purchases_total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    sales_total
        .checked_sub(purchases_total)
        .and_then(|d| d.checked_div(purchases_total))
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(round2)
        .unwrap_or(Decimal::ZERO)
}

/// Manual override from settings when set, else average sale price.
pub fn sales_price_range<'a, I>(settings: &Settings, sales: I) -> Decimal
where
    I: IntoIterator<Item = &'a SalesEntry>,
{
    if settings.sales_price_range > Decimal::ZERO {
        return settings.sales_price_range;
    }
    TradeTotals::of(sales)
        .unit_price()
        .map(round2)
        .unwrap_or(Decimal::ZERO)
}

/// Premium of the USDT buy price over the USD quote, in percent.
pub fn buy_price_range(buy_price_usdt: Decimal, current_usd_price: Decimal) -> Decimal {
    if buy_price_usdt <= Decimal::ZERO || current_usd_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    buy_price_usdt
        .checked_sub(current_usd_price)
        .and_then(|d| d.checked_div(current_usd_price))
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Net profit margin for one bucket: average sale price minus average
/// purchase price.
pub fn daily_profit_margin<'a, 'b, I, J>(sales: I, purchases: J) -> Decimal
where
    I: IntoIterator<Item = &'a SalesEntry>,
    J: IntoIterator<Item = &'b PurchaseEntry>,
{
    let sold = TradeTotals::of(sales);
    let bought = TradeTotals::of(purchases);
    if sold.count == 0 || bought.count == 0 {
        return Decimal::ZERO;
    }
    match (sold.unit_price(), bought.unit_price()) {
        (Some(s), Some(p)) => s.checked_sub(p).map(round2).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub sales: TradeTotals,
    pub purchases: TradeTotals,
    pub expenses: Decimal,
    pub incomes: Decimal,
    pub current_margin: Decimal,
    pub required_margin: Decimal,
    pub margin_met: bool,
    pub sales_price_range: Decimal,
    pub buy_price_range: Decimal,
    pub net_profit_margin: Decimal,
    pub usd_price: Decimal,
    pub total_stock: Decimal,
    pub total_cash: Decimal,
}

impl DashboardSummary {
    /// Flow metrics cover `range`; stock and cash are current balances.
    pub fn compute(ledger: &Ledger, range: &DateRange) -> Self {
        let sales = range.filter(&ledger.sales, |s| s.created_at);
        let purchases = range.filter(&ledger.purchases, |p| p.created_at);
        let sold = TradeTotals::of(sales.iter().copied());
        let bought = TradeTotals::of(purchases.iter().copied());

        let entries = range.filter(&ledger.expenses, |e| e.created_at);
        let of_kind = |kind: ExpenseKind| {
            checked_sum(
                entries
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| e.amount),
            )
            .unwrap_or(Decimal::ZERO)
        };
        let expenses = of_kind(ExpenseKind::Expense);
        let incomes = of_kind(ExpenseKind::Income);

        let settings = &ledger.settings;
        let current_margin = current_margin(sold.value, bought.value);
        Self {
            sales: sold,
            purchases: bought,
            expenses,
            incomes,
            current_margin,
            required_margin: settings.required_margin,
            margin_met: current_margin >= settings.required_margin,
            sales_price_range: sales_price_range(settings, sales.iter().copied()),
            buy_price_range: buy_price_range(settings.buy_price_usdt, settings.current_usd_price),
            net_profit_margin: daily_profit_margin(
                sales.iter().copied(),
                purchases.iter().copied(),
            ),
            usd_price: settings.current_usd_price,
            total_stock: checked_sum(platform_balances(ledger).iter().map(|b| b.amount))
                .unwrap_or(Decimal::ZERO),
            total_cash: checked_sum(bank_balances(ledger).iter().map(|b| b.amount))
                .unwrap_or(Decimal::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn margin_rounds_to_two_places() {
        assert_eq!(current_margin(dec!(1000), dec!(300)), dec!(233.33));
        assert_eq!(current_margin(dec!(90), dec!(100)), dec!(-10.00));
    }

    #[test]
    fn buy_price_range_needs_both_prices() {
        assert_eq!(buy_price_range(dec!(90), dec!(0)), dec!(0));
        assert_eq!(buy_price_range(dec!(0), dec!(85)), dec!(0));
        assert_eq!(buy_price_range(dec!(88), dec!(80)), dec!(10));
    }

    #[test]
    fn unit_price_with_zero_quantity_is_none() {
        let mut s = SalesEntry::new("o", "b", "p", dec!(0), dec!(0));
        s.total_price = dec!(50);
        assert_eq!(TradeTotals::of([&s]).unit_price(), None);
    }

    #[test]
    fn margin_overflow_is_zero() {
        assert_eq!(current_margin(Decimal::MIN, dec!(1)), dec!(0));
        assert_eq!(current_margin(Decimal::MAX, dec!(0.5)), dec!(0));
    }
}
