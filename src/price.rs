// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use log::{debug, error, info, warn};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{DeskError, DeskResult};
use crate::ledger::Ledger;
use crate::models::Settings;
use crate::store::RowStore;

pub const SETTINGS_TABLE: &str = "settings";
pub const SETTINGS_ID: &str = "desk";

/// A quote younger than this is reused without asking a provider.
pub const PRICE_CACHE_MS: i64 = 60_000;

/// Replace local settings with the stored row. `Ok(false)` when no row exists
/// yet, in which case local settings are left alone.
pub fn sync_settings(store: &dyn RowStore, ledger: &mut Ledger) -> DeskResult<bool> {
    match store.select_one(SETTINGS_TABLE, SETTINGS_ID)? {
        Some(row) => {
            ledger.settings = serde_json::from_value(row)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn push_settings(store: &dyn RowStore, settings: &Settings) -> DeskResult<()> {
    store.upsert(SETTINGS_TABLE, SETTINGS_ID, &serde_json::to_value(settings)?)
}

/// A source of USD→INR quotes.
pub trait RateProvider {
    fn name(&self) -> &str;
    fn fetch_usd_inr(&self) -> DeskResult<Decimal>;
}

fn to_rate(raw: Option<f64>, source: &str) -> DeskResult<Decimal> {
    let raw = raw.ok_or_else(|| DeskError::Http(format!("{source}: no INR rate in response")))?;
    Decimal::try_from(raw)
        .map(|d| d.round_dp(4))
        .map_err(|e| DeskError::Serialization(format!("{source}: rate {raw}: {e}")))
}

#[derive(Debug, Deserialize)]
struct RatesBody {
    rates: HashMap<String, f64>,
}

/// ECB reference rates via Frankfurter.
pub struct Frankfurter {
    client: Client,
}

impl Frankfurter {
    pub const URL: &'static str = "https://api.frankfurter.dev/v1/latest?base=USD&symbols=INR";

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn parse(body: &str) -> DeskResult<Decimal> {
        let b: RatesBody = serde_json::from_str(body)?;
        to_rate(b.rates.get("INR").copied(), "frankfurter")
    }
}

impl RateProvider for Frankfurter {
    fn name(&self) -> &str {
        "frankfurter"
    }

    fn fetch_usd_inr(&self) -> DeskResult<Decimal> {
        let body = self.client.get(Self::URL).send()?.error_for_status()?.text()?;
        Self::parse(&body)
    }
}

/// Open access endpoint of ExchangeRate-API.
pub struct OpenExchangeRates {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct OpenErBody {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

impl OpenExchangeRates {
    pub const URL: &'static str = "https://open.er-api.com/v6/latest/USD";

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn parse(body: &str) -> DeskResult<Decimal> {
        let b: OpenErBody = serde_json::from_str(body)?;
        if b.result != "success" {
            return Err(DeskError::Http(format!("open.er-api: result '{}'", b.result)));
        }
        to_rate(b.rates.get("INR").copied(), "open.er-api")
    }
}

impl RateProvider for OpenExchangeRates {
    fn name(&self) -> &str {
        "open.er-api"
    }

    fn fetch_usd_inr(&self) -> DeskResult<Decimal> {
        let body = self.client.get(Self::URL).send()?.error_for_status()?.text()?;
        Self::parse(&body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedQuote {
    price: Decimal,
    fetched_at_ms: i64,
}

fn fresh(price: Decimal, at_ms: i64, now_ms: i64) -> bool {
    let age = now_ms.saturating_sub(at_ms);
    price > Decimal::ZERO && (0..PRICE_CACHE_MS).contains(&age)
}

/// Best-effort USD quote refresher. Holds the last good quote in memory.
pub struct PriceFeed {
    providers: Vec<Box<dyn RateProvider>>,
    cache: Option<CachedQuote>,
}

impl PriceFeed {
    /// Providers are tried in order; the first is the primary.
    pub fn new(providers: Vec<Box<dyn RateProvider>>) -> Self {
        Self {
            providers,
            cache: None,
        }
    }

    pub fn with_default_providers(client: Client) -> Self {
        Self::new(vec![
            Box::new(Frankfurter::new(client.clone())),
            Box::new(OpenExchangeRates::new(client)),
        ])
    }

    /// Current USD price. Fetches at most once per `PRICE_CACHE_MS`; on
    /// success writes local settings and the stored row. Never fails: falls
    /// back to the cached quote, then the stored row, then zero.
    pub fn auto_fetch_usd_price(
        &mut self,
        store: &dyn RowStore,
        ledger: &mut Ledger,
        now_ms: i64,
    ) -> Decimal {
        let s = &ledger.settings;
        if fresh(s.current_usd_price, s.last_usdt_price_update, now_ms) {
            debug!("usd price {} still fresh", s.current_usd_price);
            return s.current_usd_price;
        }
        if let Some(c) = self.cache.filter(|c| fresh(c.price, c.fetched_at_ms, now_ms)) {
            return c.price;
        }

        for provider in &self.providers {
            match provider.fetch_usd_inr() {
                Ok(rate) if rate > Decimal::ZERO => {
                    info!("usd price {} from {}", rate, provider.name());
                    self.cache = Some(CachedQuote {
                        price: rate,
                        fetched_at_ms: now_ms,
                    });
                    ledger.settings.current_usd_price = rate;
                    ledger.settings.last_usdt_price_update = now_ms;
                    if let Err(e) = push_settings(store, &ledger.settings) {
                        error!("storing usd price failed: {}", e);
                    }
                    return rate;
                }
                Ok(rate) => warn!("{} returned non-positive rate {}", provider.name(), rate),
                Err(e) => warn!("{} failed: {}", provider.name(), e),
            }
        }

        if let Some(c) = self.cache {
            warn!("all price providers failed, using cached {}", c.price);
            return c.price;
        }
        match store.select_one(SETTINGS_TABLE, SETTINGS_ID) {
            Ok(Some(row)) => match serde_json::from_value::<Settings>(row) {
                Ok(stored) if stored.current_usd_price > Decimal::ZERO => {
                    warn!(
                        "all price providers failed, using stored {}",
                        stored.current_usd_price
                    );
                    return stored.current_usd_price;
                }
                Ok(_) => {}
                Err(e) => error!("stored settings unreadable: {}", e),
            },
            Ok(None) => {}
            Err(e) => error!("reading stored settings failed: {}", e),
        }
        warn!("no usd price available");
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn frankfurter_body_parses() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2025-01-10","rates":{"INR":85.84}}"#;
        assert_eq!(Frankfurter::parse(body).unwrap(), dec!(85.84));
    }

    #[test]
    fn open_er_api_rejects_error_result() {
        let body = r#"{"result":"error","error-type":"unsupported-code"}"#;
        assert!(OpenExchangeRates::parse(body).is_err());
        let ok = r#"{"result":"success","base_code":"USD","rates":{"USD":1,"INR":83.1234567}}"#;
        assert_eq!(OpenExchangeRates::parse(ok).unwrap(), dec!(83.1235));
    }

    #[test]
    fn freshness_window() {
        assert!(fresh(dec!(83), 1_000, 60_999));
        assert!(!fresh(dec!(83), 1_000, 61_000));
        assert!(!fresh(dec!(0), 1_000, 1_001));
        assert!(!fresh(dec!(83), 5_000, 1_000));
    }
}
