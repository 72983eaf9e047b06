// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::metrics::daily_profit_margin;
use crate::models::{PurchaseEntry, SalesEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub iso_key: String,
    pub amount: Decimal,
}

/// `(iso_key, label)` for the hour or day containing `ts`.
pub fn bucket_key(ts: DateTime<Utc>, single_day: bool) -> (String, String) {
    if single_day {
        let hour = NaiveTime::from_hms_opt(ts.hour(), 0, 0).unwrap_or(NaiveTime::MIN);
        (
            hour.format("%H:%M").to_string(),
            hour.format("%-I:%M %p").to_string(),
        )
    } else {
        let day = ts.date_naive();
        (
            day.format("%Y-%m-%d").to_string(),
            day.format("%b %-d").to_string(),
        )
    }
}

/// Sum amounts per hour (`single_day`) or per day. Only buckets with at
/// least one point are returned, ascending by key.
pub fn bucketize<I>(points: I, single_day: bool) -> Vec<Bucket>
where
    I: IntoIterator<Item = (DateTime<Utc>, Decimal)>,
{
    let mut map: BTreeMap<String, (String, Decimal)> = BTreeMap::new();
    for (ts, amount) in points {
        let (key, label) = bucket_key(ts, single_day);
        let slot = &mut map.entry(key).or_insert((label, Decimal::ZERO)).1;
        *slot = slot.checked_add(amount).unwrap_or(Decimal::ZERO);
    }
    map.into_iter()
        .map(|(iso_key, (label, amount))| Bucket {
            label,
            iso_key,
            amount,
        })
        .collect()
}

fn pad(sparse: Vec<Bucket>, keys: Vec<(String, String)>) -> Vec<Bucket> {
    let mut by_key: BTreeMap<String, Bucket> =
        sparse.into_iter().map(|b| (b.iso_key.clone(), b)).collect();
    keys.into_iter()
        .map(|(iso_key, label)| {
            by_key.remove(&iso_key).unwrap_or(Bucket {
                label,
                iso_key,
                amount: Decimal::ZERO,
            })
        })
        .collect()
}

/// Dense 24-hour series.
pub fn fill_hours(sparse: Vec<Bucket>) -> Vec<Bucket> {
    let keys = (0..24)
        .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .map(|t| {
            (
                t.format("%H:%M").to_string(),
                t.format("%-I:%M %p").to_string(),
            )
        })
        .collect();
    pad(sparse, keys)
}

/// Dense day series from `start` to `end` inclusive.
pub fn fill_days(sparse: Vec<Bucket>, start: NaiveDate, end: NaiveDate) -> Vec<Bucket> {
    let keys = start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            (
                day.format("%Y-%m-%d").to_string(),
                day.format("%b %-d").to_string(),
            )
        })
        .collect();
    pad(sparse, keys)
}

/// Net profit margin per bucket over every bucket that saw a sale or purchase.
pub fn npm_series(sales: &[&SalesEntry], purchases: &[&PurchaseEntry], single_day: bool) -> Vec<Bucket> {
    let mut grouped: BTreeMap<String, (String, Vec<&SalesEntry>, Vec<&PurchaseEntry>)> =
        BTreeMap::new();
    for s in sales {
        let (key, label) = bucket_key(s.created_at, single_day);
        grouped
            .entry(key)
            .or_insert_with(|| (label, Vec::new(), Vec::new()))
            .1
            .push(*s);
    }
    for p in purchases {
        let (key, label) = bucket_key(p.created_at, single_day);
        grouped
            .entry(key)
            .or_insert_with(|| (label, Vec::new(), Vec::new()))
            .2
            .push(*p);
    }
    grouped
        .into_iter()
        .map(|(iso_key, (label, s, p))| Bucket {
            label,
            iso_key,
            amount: daily_profit_margin(s, p),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn hour_buckets_floor_minutes() {
        let b = bucketize(
            [
                (at("2024-03-01T15:42:00Z"), dec!(2)),
                (at("2024-03-01T15:05:00Z"), dec!(3)),
                (at("2024-03-01T09:00:00Z"), dec!(1)),
            ],
            true,
        );
        assert_eq!(b.len(), 2);
        assert_eq!(b[0].iso_key, "09:00");
        assert_eq!(b[0].label, "9:00 AM");
        assert_eq!(b[1].iso_key, "15:00");
        assert_eq!(b[1].label, "3:00 PM");
        assert_eq!(b[1].amount, dec!(5));
    }

    #[test]
    fn day_buckets_sorted_by_key() {
        let b = bucketize(
            [
                (at("2024-03-10T01:00:00Z"), dec!(1)),
                (at("2024-02-28T23:00:00Z"), dec!(4)),
            ],
            false,
        );
        let keys: Vec<_> = b.iter().map(|b| b.iso_key.as_str()).collect();
        assert_eq!(keys, ["2024-02-28", "2024-03-10"]);
        assert_eq!(b[1].label, "Mar 10");
    }

    #[test]
    fn fill_days_pads_gaps_with_zero() {
        let sparse = bucketize([(at("2024-03-02T12:00:00Z"), dec!(7))], false);
        let dense = fill_days(
            sparse,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
        );
        let amounts: Vec<_> = dense.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, [dec!(0), dec!(7), dec!(0)]);
    }

    #[test]
    fn fill_hours_has_twenty_four_buckets() {
        let dense = fill_hours(Vec::new());
        assert_eq!(dense.len(), 24);
        assert_eq!(dense[0].label, "12:00 AM");
        assert_eq!(dense[23].iso_key, "23:00");
    }
}
