// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tradedesk::error::{DeskError, DeskResult};
use tradedesk::ledger::Ledger;
use tradedesk::models::Settings;
use tradedesk::price::{PriceFeed, RateProvider, push_settings, sync_settings};
use tradedesk::store::SqliteStore;

/// Replays scripted answers; `None` means the request failed.
struct Scripted {
    name: &'static str,
    answers: RefCell<VecDeque<Option<Decimal>>>,
    calls: Rc<RefCell<usize>>,
}

impl Scripted {
    fn new(name: &'static str, answers: &[Option<Decimal>]) -> (Box<dyn RateProvider>, Rc<RefCell<usize>>) {
        let calls = Rc::new(RefCell::new(0));
        let p = Scripted {
            name,
            answers: RefCell::new(answers.iter().copied().collect()),
            calls: calls.clone(),
        };
        (Box::new(p), calls)
    }
}

impl RateProvider for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn fetch_usd_inr(&self) -> DeskResult<Decimal> {
        *self.calls.borrow_mut() += 1;
        match self.answers.borrow_mut().pop_front().flatten() {
            Some(rate) => Ok(rate),
            None => Err(DeskError::Http(format!("{} unavailable", self.name))),
        }
    }
}

fn stored_settings(store: &SqliteStore) -> Settings {
    let mut l = Ledger::new();
    assert!(sync_settings(store, &mut l).unwrap());
    l.settings
}

#[test]
fn fresh_quote_skips_providers() {
    let store = SqliteStore::in_memory().unwrap();
    let (primary, calls) = Scripted::new("primary", &[Some(dec!(90))]);
    let mut feed = PriceFeed::new(vec![primary]);
    let mut ledger = Ledger::new();
    ledger.settings.current_usd_price = dec!(83.25);
    ledger.settings.last_usdt_price_update = 1_000_000;

    let price = feed.auto_fetch_usd_price(&store, &mut ledger, 1_000_000 + 59_999);
    assert_eq!(price, dec!(83.25));
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn stale_quote_falls_through_to_secondary_provider() {
    let store = SqliteStore::in_memory().unwrap();
    let (primary, primary_calls) = Scripted::new("primary", &[None]);
    let (fallback, fallback_calls) = Scripted::new("fallback", &[Some(dec!(84.1))]);
    let mut feed = PriceFeed::new(vec![primary, fallback]);
    let mut ledger = Ledger::new();
    ledger.settings.current_usd_price = dec!(83.25);
    ledger.settings.last_usdt_price_update = 1_000_000;

    let now = 1_000_000 + 60_000;
    let price = feed.auto_fetch_usd_price(&store, &mut ledger, now);
    assert_eq!(price, dec!(84.1));
    assert_eq!(*primary_calls.borrow(), 1);
    assert_eq!(*fallback_calls.borrow(), 1);
    assert_eq!(ledger.settings.current_usd_price, dec!(84.1));
    assert_eq!(ledger.settings.last_usdt_price_update, now);

    let stored = stored_settings(&store);
    assert_eq!(stored.current_usd_price, dec!(84.1));
    assert_eq!(stored.last_usdt_price_update, now);
}

#[test]
fn total_failure_uses_in_memory_quote_first() {
    let store = SqliteStore::in_memory().unwrap();
    let mut stored = Settings::default();
    stored.current_usd_price = dec!(70);
    push_settings(&store, &stored).unwrap();

    let (primary, _) = Scripted::new("primary", &[Some(dec!(85)), None]);
    let mut feed = PriceFeed::new(vec![primary]);
    let mut ledger = Ledger::new();
    assert_eq!(feed.auto_fetch_usd_price(&store, &mut ledger, 0), dec!(85));

    // the successful fetch overwrote the stored row; make it disagree again
    push_settings(&store, &stored).unwrap();
    ledger.settings.last_usdt_price_update = 0;
    assert_eq!(feed.auto_fetch_usd_price(&store, &mut ledger, 120_000), dec!(85));
}

#[test]
fn total_failure_without_cache_uses_stored_price_then_zero() {
    let store = SqliteStore::in_memory().unwrap();
    let (primary, _) = Scripted::new("primary", &[None, None]);
    let (fallback, _) = Scripted::new("fallback", &[None, None]);
    let mut feed = PriceFeed::new(vec![primary, fallback]);
    let mut ledger = Ledger::new();

    assert_eq!(feed.auto_fetch_usd_price(&store, &mut ledger, 0), Decimal::ZERO);

    let mut stored = Settings::default();
    stored.current_usd_price = dec!(82.5);
    stored.last_usdt_price_update = 1;
    push_settings(&store, &stored).unwrap();
    assert_eq!(
        feed.auto_fetch_usd_price(&store, &mut ledger, 10_000_000),
        dec!(82.5)
    );
}

#[test]
fn settings_sync_is_last_write_wins() {
    let store = SqliteStore::in_memory().unwrap();
    let mut ledger = Ledger::new();
    assert!(!sync_settings(&store, &mut ledger).unwrap());
    assert_eq!(ledger.settings, Settings::default());

    let mut first = Settings::default();
    first.required_margin = dec!(2);
    first.buy_price_usdt = dec!(88);
    push_settings(&store, &first).unwrap();
    let mut second = Settings::default();
    second.required_margin = dec!(4);
    push_settings(&store, &second).unwrap();

    ledger.settings.sales_price_range = dec!(9);
    assert!(sync_settings(&store, &mut ledger).unwrap());
    assert_eq!(ledger.settings, second);
}
