// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, DeskResult};

/// Dashboard date filter. Calendar days are UTC days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

impl DateRange {
    /// Matches everything.
    pub fn inactive() -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            start_date: epoch,
            end_date: epoch,
            is_active: false,
        }
    }

    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            start_date,
            end_date,
            is_active: true,
        }
    }

    /// Parse ISO-8601 bounds.
    pub fn parse(start: &str, end: &str, is_active: bool) -> DeskResult<Self> {
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s.trim())
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| DeskError::Invalid(format!("bad date '{}': {}", s, e)))
        };
        Ok(Self {
            start_date: parse(start)?,
            end_date: parse(end)?,
            is_active,
        })
    }

    /// Start and end fall on the same calendar day.
    pub fn single_day(&self) -> bool {
        self.is_active && self.start_date.date_naive() == self.end_date.date_naive()
    }

    /// Effective inclusive bounds after single-day widening.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        if self.single_day() {
            let day = self.start_date.date_naive();
            let start = day.and_time(NaiveTime::MIN).and_utc();
            let end = start + Duration::days(1) - Duration::milliseconds(1);
            (start, end)
        } else {
            (self.start_date, self.end_date)
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if !self.is_active {
            return true;
        }
        let (start, end) = self.bounds();
        ts >= start && ts <= end
    }

    pub fn filter<'a, T, F>(&self, items: &'a [T], ts: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> DateTime<Utc>,
    {
        items.iter().filter(|item| self.contains(ts(item))).collect()
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::inactive()
    }
}
