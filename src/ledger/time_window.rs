use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// Budgeting cadence label. The explicit [`DateWindow`] drives every calculation;
/// the period only decides how the window advances when a period is closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl BudgetPeriod {
    /// Returns the window that immediately follows `window` for this cadence.
    pub fn next_window(self, window: DateWindow) -> DateWindow {
        let (start, end) = match self {
            BudgetPeriod::Weekly => (window.end, window.end + Duration::weeks(1)),
            BudgetPeriod::Monthly => (window.end, shift_month(window.end, 1)),
            BudgetPeriod::Quarterly => (window.end, shift_month(window.end, 3)),
            BudgetPeriod::Yearly => (window.end, shift_year(window.end, 1)),
            BudgetPeriod::Custom => (window.end, window.end + (window.end - window.start)),
        };
        DateWindow { start, end }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetPeriod::Weekly => "Weekly",
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Quarterly => "Quarterly",
            BudgetPeriod::Yearly => "Yearly",
            BudgetPeriod::Custom => "Custom",
        };
        f.write_str(label)
    }
}

/// Active date range of a budget. Both ends are inclusive for ledger matching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Builds a window, rejecting ranges whose end is not after the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whole days spanned by the window, rounded up.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    /// Days elapsed at `now`, rounded up and clamped to `[0, total_days]`.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> i64 {
        let seconds = (now - start_of_day(self.start)).num_seconds();
        let elapsed = if seconds <= 0 {
            0
        } else {
            (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
        };
        elapsed.clamp(0, self.total_days())
    }

    pub fn remaining_days(&self, now: DateTime<Utc>) -> i64 {
        self.total_days() - self.elapsed_days(now)
    }

    /// Returns `true` when `now` falls on a day covered by the window.
    pub fn overlaps(&self, now: DateTime<Utc>) -> bool {
        self.contains(now.date_naive())
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}
