// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod beneficiaries;
pub mod dashboard;
pub mod entities;
pub mod expenses;
pub mod price;
pub mod settings;
pub mod sync;
pub mod trades;
pub mod transfers;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::ledger::{Ledger, RefreshReport};
use crate::models::{Account, BankEntity, PlatformEntity};
use crate::range::DateRange;
use crate::session::Session;
use crate::store::RowStore;
use crate::utils::{parse_datetime, parse_decimal, parse_end_datetime};

/// Everything a command works against: the store, its cached copy and the user.
pub struct Desk {
    pub store: Box<dyn RowStore>,
    pub ledger: Ledger,
    pub session: Option<Session>,
}

impl Desk {
    pub fn new(store: Box<dyn RowStore>, session: Option<Session>) -> Self {
        Self {
            store,
            ledger: Ledger::new(),
            session,
        }
    }

    pub fn load(&mut self) -> Result<RefreshReport> {
        let report = self
            .ledger
            .refresh(self.store.as_ref(), self.session.as_ref())
            .context("Refresh ledger")?;
        if report.failed() > 0 {
            log::warn!("{} collection(s) failed to refresh", report.failed());
        }
        Ok(report)
    }

    pub fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| anyhow!("No authenticated user; set TRADEDESK_USER_EMAIL"))
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        self.ledger.clear();
    }
}

pub(crate) fn req_str<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("--{} is required", name))
}

pub(crate) fn opt_str<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name).map(|s| s.trim())
}

pub(crate) fn req_decimal(m: &clap::ArgMatches, name: &str) -> Result<Decimal> {
    parse_decimal(req_str(m, name)?).with_context(|| format!("--{}", name))
}

pub(crate) fn opt_decimal(m: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    opt_str(m, name)
        .map(|s| parse_decimal(s).with_context(|| format!("--{}", name)))
        .transpose()
}

pub(crate) fn opt_datetime(m: &clap::ArgMatches, name: &str) -> Result<Option<DateTime<Utc>>> {
    opt_str(m, name).map(parse_datetime).transpose()
}

/// `--from/--to` as a filter; inactive when neither is given. A bare end
/// date includes that whole day.
pub(crate) fn range_from_args(m: &clap::ArgMatches) -> Result<DateRange> {
    let from = opt_datetime(m, "from")?;
    let to = opt_str(m, "to").map(parse_end_datetime).transpose()?;
    let start = match (from, to) {
        (None, None) => return Ok(DateRange::inactive()),
        (None, Some(_)) => bail!("--to needs --from"),
        (Some(start), _) => start,
    };
    let end = to.unwrap_or_else(Utc::now);
    if end < start {
        bail!("--to {} is before --from {}", end, start);
    }
    Ok(DateRange::new(start, end))
}

pub(crate) fn positive(value: Decimal, what: &str) -> Result<Decimal> {
    if value <= Decimal::ZERO {
        bail!("{} must be positive, got {}", what, value);
    }
    Ok(value)
}

pub(crate) fn check_platform(ledger: &Ledger, account: &Account) -> Result<()> {
    match account {
        Account::Adjustment => Ok(()),
        Account::Real(name) => {
            let known = ledger
                .all::<PlatformEntity>()
                .iter()
                .any(|p| p.is_active && &p.name == name);
            if known {
                Ok(())
            } else {
                bail!("Platform '{}' not found or inactive", name)
            }
        }
    }
}

pub(crate) fn check_bank(ledger: &Ledger, account: &Account) -> Result<()> {
    match account {
        Account::Adjustment => Ok(()),
        Account::Real(name) => {
            let known = ledger
                .all::<BankEntity>()
                .iter()
                .any(|b| b.is_active && &b.name == name);
            if known {
                Ok(())
            } else {
                bail!("Bank '{}' not found or inactive", name)
            }
        }
    }
}

pub(crate) fn take_limit<T>(mut rows: Vec<T>, m: &clap::ArgMatches) -> Vec<T> {
    if let Some(limit) = m.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    rows
}
