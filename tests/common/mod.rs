#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use budget_engine::{
    core::{BudgetCoordinator, BudgetEngine, FixedClock},
    ledger::{Budget, DateWindow, Ledger},
    storage::{JsonStorage, MemoryStore},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// June 2024 as a 30-day window.
pub fn june() -> DateWindow {
    DateWindow::new(date(2024, 6, 1), date(2024, 7, 1)).expect("valid window")
}

pub fn budget(owner: Uuid, name: &str, amount: f64, categories: &[Uuid]) -> Budget {
    categories.iter().fold(
        Budget::new(owner, name, amount, june()).expect("valid budget"),
        |budget, &category| budget.with_category(category, 100.0 / categories.len() as f64),
    )
}

/// Creates a unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn memory_coordinator(
    ledger: Ledger,
    today: NaiveDate,
) -> BudgetCoordinator<MemoryStore, Ledger, FixedClock> {
    BudgetCoordinator::new(
        MemoryStore::new(),
        BudgetEngine::new(ledger, FixedClock::at_date(today)),
    )
}

pub fn json_coordinator(
    ledger: Ledger,
    today: NaiveDate,
) -> BudgetCoordinator<JsonStorage, Ledger, FixedClock> {
    let storage = JsonStorage::new(Some(temp_dir())).expect("create json storage backend");
    BudgetCoordinator::new(storage, BudgetEngine::new(ledger, FixedClock::at_date(today)))
}
