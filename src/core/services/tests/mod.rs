mod alert_service_tests;
mod performance_service_tests;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::ledger::{Budget, DateWindow};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(super) fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// June 2024 as a 30-day window.
pub(super) fn june() -> DateWindow {
    DateWindow::new(date(2024, 6, 1), date(2024, 7, 1)).unwrap()
}

pub(super) fn budget_with_spent(amount: f64, spent: f64) -> Budget {
    let mut budget = Budget::new(Uuid::new_v4(), "Groceries", amount, june()).unwrap();
    budget.current_period.spent = spent;
    budget.current_period.remaining = amount - spent;
    budget
}
