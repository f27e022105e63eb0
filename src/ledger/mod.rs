//! Ledger domain models, persistence-friendly types, and helpers.

pub mod budget;
pub mod category;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod time_window;
pub mod transaction;

pub use budget::{
    AlertConfig, AlertState, AlertThreshold, Budget, BudgetDraft, BudgetEdit, BudgetKind,
    CategoryAllocation, CategorySpending, CurrentPeriod, PeriodSnapshot, RolloverConfig,
    ThresholdKind,
};
pub use category::{Category, CategoryKind};
pub use ledger::Ledger;
pub use time_window::{BudgetPeriod, DateWindow};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
