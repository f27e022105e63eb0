//! Derives utilisation, variance, and projection metrics for a budget.
//!
//! Every value is a pure function of the budget amount, the spent amount, the
//! window, and the supplied "now". Divisions are guarded and an out-of-window
//! "now" is clamped, so computing metrics never fails.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{budget::Budget, time_window::DateWindow};

pub const WARNING_UTILIZATION: u32 = 75;
pub const CRITICAL_UTILIZATION: u32 = 90;
pub const OVER_BUDGET_UTILIZATION: u32 = 100;

/// Health classification derived from utilisation alone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    Critical,
    OverBudget,
}

impl BudgetStatus {
    /// Maps a utilisation percentage onto the fixed threshold table, highest first.
    pub fn from_utilization(utilization: u32) -> Self {
        if utilization >= OVER_BUDGET_UTILIZATION {
            BudgetStatus::OverBudget
        } else if utilization >= CRITICAL_UTILIZATION {
            BudgetStatus::Critical
        } else if utilization >= WARNING_UTILIZATION {
            BudgetStatus::Warning
        } else {
            BudgetStatus::OnTrack
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetStatus::OnTrack => "On Track",
            BudgetStatus::Warning => "Warning",
            BudgetStatus::Critical => "Critical",
            BudgetStatus::OverBudget => "Over Budget",
        };
        f.write_str(label)
    }
}

/// Raw inputs of the calculator, decoupled from the budget entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsInput {
    pub amount: f64,
    pub spent: f64,
    pub window: DateWindow,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetMetrics {
    pub amount: f64,
    pub spent: f64,
    pub utilization_percentage: u32,
    pub remaining_amount: f64,
    pub over_budget_amount: f64,
    pub status: BudgetStatus,
    pub total_days: i64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
    pub expected_spending: f64,
    pub variance: f64,
    pub variance_percentage: f64,
    pub daily_spending_rate: f64,
    pub projected_spending: f64,
    pub projected_overrun: f64,
    pub recommended_daily_spending: f64,
}

/// Metrics tagged with the budget they were computed for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetReport {
    pub budget_id: Uuid,
    pub name: String,
    /// Ceiling including rolled-over funds; informational, metrics use `amount`.
    pub effective_amount: f64,
    pub metrics: BudgetMetrics,
}

pub struct MetricsService;

impl MetricsService {
    /// Computes metrics from the budget's cached current-period spending.
    pub fn compute(budget: &Budget, now: DateTime<Utc>) -> BudgetReport {
        let metrics = Self::calculate(MetricsInput {
            amount: budget.amount,
            spent: budget.current_period.spent,
            window: budget.window,
            now,
        });
        BudgetReport {
            budget_id: budget.id,
            name: budget.name.clone(),
            effective_amount: budget.effective_amount(),
            metrics,
        }
    }

    pub fn calculate(input: MetricsInput) -> BudgetMetrics {
        let MetricsInput {
            amount,
            spent,
            window,
            now,
        } = input;
        let spent = spent.max(0.0);

        let utilization_percentage = utilization(amount, spent);
        let remaining_amount = (amount - spent).max(0.0);
        let over_budget_amount = (spent - amount).max(0.0);

        let total_days = window.total_days();
        let elapsed_days = window.elapsed_days(now);
        let remaining_days = total_days - elapsed_days;

        let expected_spending = if total_days == 0 {
            amount
        } else {
            elapsed_days as f64 / total_days as f64 * amount
        };
        let variance = spent - expected_spending;
        let variance_percentage = if expected_spending > 0.0 {
            variance / expected_spending * 100.0
        } else {
            0.0
        };

        let daily_spending_rate = if elapsed_days > 0 {
            spent / elapsed_days as f64
        } else {
            0.0
        };
        let projected_spending = daily_spending_rate * total_days as f64;
        let projected_overrun = (projected_spending - amount).max(0.0);
        let recommended_daily_spending = if remaining_days > 0 {
            remaining_amount / remaining_days as f64
        } else {
            0.0
        };

        BudgetMetrics {
            amount,
            spent,
            utilization_percentage,
            remaining_amount,
            over_budget_amount,
            status: BudgetStatus::from_utilization(utilization_percentage),
            total_days,
            elapsed_days,
            remaining_days,
            expected_spending,
            variance,
            variance_percentage,
            daily_spending_rate,
            projected_spending,
            projected_overrun,
            recommended_daily_spending,
        }
    }
}

/// `round(spent / amount * 100)`, or 0 for a non-positive amount.
pub fn utilization(amount: f64, spent: f64) -> u32 {
    if amount <= 0.0 || amount.is_nan() {
        return 0;
    }
    let ratio = (spent.max(0.0) / amount * 100.0).round();
    if ratio.is_finite() {
        ratio as u32
    } else {
        u32::MAX
    }
}
