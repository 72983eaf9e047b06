// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tradedesk::ledger::Ledger;
use tradedesk::metrics::{
    DashboardSummary, TradeTotals, current_margin, daily_profit_margin, sales_price_range,
};
use tradedesk::models::{
    BankEntity, PlatformEntity, PurchaseEntry, SalesEntry, Settings, TransferEntry,
};
use tradedesk::range::DateRange;

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn margin_is_zero_without_purchases() {
    for sales in [dec!(0), dec!(1), dec!(123456.78), dec!(-5)] {
        assert_eq!(current_margin(sales, Decimal::ZERO), Decimal::ZERO);
    }
    assert_eq!(current_margin(dec!(110), dec!(100)), dec!(10));
}

#[test]
fn npm_is_zero_for_empty_buckets() {
    let sales = vec![SalesEntry::new("s", "H", "X", dec!(90), dec!(10))];
    let purchases = vec![PurchaseEntry::new("p", "H", "X", dec!(85), dec!(10))];
    assert_eq!(daily_profit_margin(&[] as &[SalesEntry], &purchases), dec!(0));
    assert_eq!(daily_profit_margin(&sales, &[] as &[PurchaseEntry]), dec!(0));
    assert_eq!(daily_profit_margin(&sales, &purchases), dec!(5));
}

#[test]
fn npm_is_zero_when_a_denominator_is_not_positive() {
    let mut sale = SalesEntry::new("s", "H", "X", dec!(90), dec!(0));
    sale.total_price = dec!(100);
    let purchases = vec![PurchaseEntry::new("p", "H", "X", dec!(85), dec!(10))];
    assert_eq!(daily_profit_margin(&[sale], &purchases), dec!(0));
}

#[test]
fn npm_rounds_to_two_places() {
    let sales = vec![
        SalesEntry::new("s1", "H", "X", dec!(90.111), dec!(3)),
        SalesEntry::new("s2", "H", "X", dec!(90.2), dec!(4)),
    ];
    let purchases = vec![PurchaseEntry::new("p", "H", "X", dec!(88.3333), dec!(3))];
    let npm = daily_profit_margin(&sales, &purchases);
    assert_eq!(npm, npm.round_dp(2));
    // (270.333 + 360.8) / 7 = 90.1619 ; 90.1619 - 88.3333 = 1.8286
    assert_eq!(npm, dec!(1.83));
}

#[test]
fn npm_uses_total_over_price_when_quantity_missing() {
    let mut sale = SalesEntry::new("s", "H", "X", dec!(90), dec!(1));
    sale.quantity = None;
    sale.total_price = dec!(900); // 10 units
    let purchases = vec![PurchaseEntry::new("p", "H", "X", dec!(80), dec!(10))];
    assert_eq!(daily_profit_margin(&[sale], &purchases), dec!(10));
}

#[test]
fn sales_price_range_override_wins() {
    let settings = Settings {
        sales_price_range: dec!(5.5),
        ..Settings::default()
    };
    let sales = vec![SalesEntry::new("s", "H", "X", dec!(91.3), dec!(7))];
    assert_eq!(sales_price_range(&settings, &sales), dec!(5.5));
}

#[test]
fn sales_price_range_is_computed_when_override_is_zero() {
    let settings = Settings::default();
    let mut a = SalesEntry::new("s1", "H", "X", dec!(8), dec!(60));
    a.total_price = dec!(480);
    let mut b = SalesEntry::new("s2", "H", "X", dec!(13), dec!(40));
    b.total_price = dec!(520);
    assert_eq!(sales_price_range(&settings, &[a, b]), dec!(10.00));
    assert_eq!(sales_price_range(&settings, &[] as &[SalesEntry]), dec!(0));
}

#[test]
fn summary_filters_flows_but_not_balances() {
    let mut l = Ledger::new();
    l.platforms.push(PlatformEntity::new("X", ""));
    l.banks.push(BankEntity::new("H", ""));
    let mut old = PurchaseEntry::new("p0", "H", "X", dec!(80), dec!(50));
    old.created_at = at("2024-02-01T10:00:00Z");
    let mut p = PurchaseEntry::new("p1", "H", "X", dec!(80), dec!(10));
    p.created_at = at("2024-03-01T10:00:00Z");
    let mut s = SalesEntry::new("s1", "H", "X", dec!(88), dec!(10));
    s.created_at = at("2024-03-01T12:00:00Z");
    l.purchases = vec![p, old];
    l.sales = vec![s];
    l.transfers.push(TransferEntry::new("X", "ADJUSTMENT", dec!(1)));
    l.settings.required_margin = dec!(12);

    let range = DateRange::parse("2024-03-01T00:00:00Z", "2024-03-01T00:00:00Z", true).unwrap();
    let sum = DashboardSummary::compute(&l, &range);
    assert_eq!(sum.sales.value, dec!(880));
    assert_eq!(sum.purchases.value, dec!(800));
    assert_eq!(sum.current_margin, dec!(10));
    assert!(!sum.margin_met);
    assert_eq!(sum.net_profit_margin, dec!(8));
    assert_eq!(sum.sales_price_range, dec!(88));
    // 50 + 10 bought, 10 sold, 1 adjusted out
    assert_eq!(sum.total_stock, dec!(49));
    // 880 - 800 - 4000
    assert_eq!(sum.total_cash, dec!(-3920));
}

#[test]
fn overflowing_totals_clamp_to_zero() {
    let mut a = SalesEntry::new("s1", "H", "X", dec!(1), dec!(1));
    a.total_price = Decimal::MAX;
    let mut b = a.clone();
    b.id = "s2".into();
    let purchases = vec![PurchaseEntry::new("p", "H", "X", dec!(85), dec!(10))];
    let sales = vec![a, b];

    assert_eq!(TradeTotals::checked_of(&sales), None);
    assert_eq!(TradeTotals::of(&sales), TradeTotals::default());
    assert_eq!(daily_profit_margin(&sales, &purchases), dec!(0));
    assert_eq!(sales_price_range(&Settings::default(), &sales), dec!(0));

    let mut ledger = Ledger::new();
    ledger.banks.push(BankEntity::new("H", ""));
    ledger.platforms.push(PlatformEntity::new("X", ""));
    ledger.sales = sales;
    ledger.purchases = purchases;
    let s = DashboardSummary::compute(&ledger, &DateRange::inactive());
    assert_eq!(s.sales, TradeTotals::default());
    assert_eq!(s.net_profit_margin, dec!(0));
    assert_eq!(s.total_cash, dec!(0));
    assert_eq!(s.total_stock, dec!(8));
}
