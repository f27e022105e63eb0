//! Carryover of unspent funds and period close.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ledger::budget::{Budget, CurrentPeriod, PeriodSnapshot};

/// Outcome of closing a budget period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RolloverOutcome {
    /// Amount added to the next period's ceiling. Zero when rollover is disabled.
    pub carryover: f64,
    pub snapshot: PeriodSnapshot,
}

pub struct RolloverService;

impl RolloverService {
    /// `max(0, min(remaining, amount * max_percentage / 100))`.
    pub fn carryover(remaining_amount: f64, max_rollover_percentage: f64, amount: f64) -> f64 {
        let cap = amount * max_rollover_percentage.clamp(0.0, 100.0) / 100.0;
        remaining_amount.min(cap).max(0.0)
    }

    /// Summarises the budget's current period as a history record.
    pub fn snapshot(budget: &Budget, closed_at: DateTime<Utc>) -> PeriodSnapshot {
        let spent = budget.current_period.spent;
        let variance = spent - budget.amount;
        let variance_percentage = if budget.amount > 0.0 {
            variance / budget.amount * 100.0
        } else {
            0.0
        };
        PeriodSnapshot {
            window: budget.window,
            budget_amount: budget.amount,
            actual_spent: spent,
            variance,
            variance_percentage,
            transaction_count: budget.current_period.transaction_count,
            closed_at,
        }
    }

    /// Computes the carryover and history snapshot for the closing period without
    /// touching the budget.
    pub fn close(budget: &Budget, closed_at: DateTime<Utc>) -> RolloverOutcome {
        let carryover = if budget.rollover.enabled {
            let remaining = (budget.amount - budget.current_period.spent).max(0.0);
            Self::carryover(remaining, budget.rollover.max_percentage, budget.amount)
        } else {
            0.0
        };
        RolloverOutcome {
            carryover,
            snapshot: Self::snapshot(budget, closed_at),
        }
    }

    /// Closes the current period: appends the snapshot, stores the carryover,
    /// advances the window by the budget's period, clears the spending cache and
    /// re-arms every threshold for the new period.
    pub fn roll_forward(budget: &mut Budget, closed_at: DateTime<Utc>) -> RolloverOutcome {
        let outcome = Self::close(budget, closed_at);
        budget.history.push(outcome.snapshot.clone());
        budget.rollover.amount = outcome.carryover;
        budget.window = budget.period.next_window(budget.window);
        budget.current_period = CurrentPeriod::unspent(budget.amount);
        budget.alert_state.clear();
        budget.touch();
        info!(
            budget = %budget.id,
            carryover = outcome.carryover,
            next_window = %budget.window,
            "budget period closed"
        );
        outcome
    }
}
