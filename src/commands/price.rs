// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use std::time::Duration;

use super::Desk;
use crate::price::PriceFeed;
use crate::utils::http_client;

pub fn handle(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    let mut feed = PriceFeed::with_default_providers(http_client()?);
    match m.subcommand() {
        Some(("fetch", _)) => {
            let price = fetch_once(desk, &mut feed);
            println!("USD price: {}", price);
        }
        Some(("watch", sub)) => {
            let interval = *sub.get_one::<u64>("interval").unwrap_or(&60);
            let count = sub.get_one::<usize>("count").copied();
            watch(desk, &mut feed, Duration::from_secs(interval.max(1)), count);
        }
        _ => {}
    }
    Ok(())
}

pub fn fetch_once(desk: &mut Desk, feed: &mut PriceFeed) -> rust_decimal::Decimal {
    feed.auto_fetch_usd_price(
        desk.store.as_ref(),
        &mut desk.ledger,
        Utc::now().timestamp_millis(),
    )
}

/// Refresh the quote every `interval`; runs forever unless `count` is given.
pub fn watch(desk: &mut Desk, feed: &mut PriceFeed, interval: Duration, count: Option<usize>) {
    let mut done = 0usize;
    loop {
        let price = fetch_once(desk, feed);
        println!("{} USD price: {}", Utc::now().format("%H:%M:%S"), price);
        done += 1;
        if count.is_some_and(|n| done >= n) {
            break;
        }
        std::thread::sleep(interval);
    }
}
