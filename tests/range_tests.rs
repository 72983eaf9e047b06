// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use tradedesk::models::{PurchaseEntry, SalesEntry};
use tradedesk::range::DateRange;
use tradedesk::series::{bucketize, npm_series};

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn single_day_selection_widens_to_whole_day() {
    let r = DateRange::parse("2024-03-01T15:00:00Z", "2024-03-01T15:00:00Z", true).unwrap();
    assert!(r.single_day());
    assert!(r.contains(at("2024-03-01T00:00:01Z")));
    assert!(r.contains(at("2024-03-01T23:59:59Z")));
    assert!(!r.contains(at("2024-03-02T00:00:01Z")));
    assert!(!r.contains(at("2024-02-29T23:59:59Z")));
}

#[test]
fn single_day_range_buckets_by_hour() {
    let r = DateRange::parse("2024-03-01T15:00:00Z", "2024-03-01T18:00:00Z", true).unwrap();
    let mut a = SalesEntry::new("a", "H", "X", dec!(90), dec!(1));
    a.created_at = at("2024-03-01T08:15:00Z");
    let mut b = SalesEntry::new("b", "H", "X", dec!(90), dec!(2));
    b.created_at = at("2024-03-01T08:45:00Z");
    let mut c = SalesEntry::new("c", "H", "X", dec!(90), dec!(1));
    c.created_at = at("2024-03-02T08:45:00Z");
    let sales = vec![a, b, c];

    let picked = r.filter(&sales, |s| s.created_at);
    assert_eq!(picked.len(), 2);
    let buckets = bucketize(
        picked.iter().map(|s| (s.created_at, s.total_price)),
        r.single_day(),
    );
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].iso_key, "08:00");
    assert_eq!(buckets[0].label, "8:00 AM");
    assert_eq!(buckets[0].amount, dec!(270));
}

#[test]
fn npm_series_zero_for_sales_only_days() {
    let mut s1 = SalesEntry::new("s1", "H", "X", dec!(90), dec!(1));
    s1.created_at = at("2024-03-01T08:00:00Z");
    let mut s2 = SalesEntry::new("s2", "H", "X", dec!(92), dec!(1));
    s2.created_at = at("2024-03-02T08:00:00Z");
    let mut p1 = PurchaseEntry::new("p1", "H", "X", dec!(87), dec!(1));
    p1.created_at = at("2024-03-01T09:00:00Z");

    let series = npm_series(&[&s1, &s2], &[&p1], false);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].iso_key, "2024-03-01");
    assert_eq!(series[0].amount, dec!(3));
    assert_eq!(series[1].iso_key, "2024-03-02");
    assert_eq!(series[1].amount, dec!(0));
}
