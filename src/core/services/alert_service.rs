//! Per-threshold alert state machine.
//!
//! A threshold is either unarmed (absent from [`AlertState`]) or fired. Evaluation
//! fires each unarmed threshold whose percentage is met, at most once per arming
//! cycle. Structural edits and [`AlertService::reset`] start a new cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::metrics_service::utilization;
use crate::ledger::budget::{Budget, ThresholdKind};

/// A threshold that fired during the current evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetAlert {
    pub budget_id: Uuid,
    pub budget_name: String,
    pub threshold_id: Uuid,
    pub threshold_percentage: u8,
    pub kind: ThresholdKind,
    pub current_utilization: u32,
    pub amount: f64,
    pub spent: f64,
    pub remaining: f64,
    pub fired_at: DateTime<Utc>,
}

pub struct AlertService;

impl AlertService {
    /// Fires every unarmed threshold met by the budget's cached utilisation and
    /// returns only the alerts fired by this call. Disabled alerts are a no-op.
    pub fn evaluate(budget: &mut Budget, now: DateTime<Utc>) -> Vec<BudgetAlert> {
        if !budget.alerts.enabled {
            debug!(budget = %budget.id, "alerts disabled; skipping evaluation");
            return Vec::new();
        }

        let spent = budget.current_period.spent;
        let current_utilization = utilization(budget.amount, spent);
        let mut fired = Vec::new();

        for threshold in &budget.alerts.thresholds {
            if budget.alert_state.is_fired(threshold.id) {
                continue;
            }
            if current_utilization < u32::from(threshold.percentage) {
                continue;
            }
            budget.alert_state.fire(threshold.id, now);
            info!(
                budget = %budget.id,
                threshold = threshold.percentage,
                utilization = current_utilization,
                "budget threshold fired"
            );
            fired.push(BudgetAlert {
                budget_id: budget.id,
                budget_name: budget.name.clone(),
                threshold_id: threshold.id,
                threshold_percentage: threshold.percentage,
                kind: threshold.kind,
                current_utilization,
                amount: budget.amount,
                spent,
                remaining: budget.amount - spent,
                fired_at: now,
            });
        }

        if !fired.is_empty() {
            budget.touch();
        }
        fired
    }

    /// Manually re-arms all thresholds, leaving amount and configuration intact.
    pub fn reset(budget: &mut Budget) {
        budget.rearm_alerts();
        debug!(budget = %budget.id, "alert thresholds re-armed");
    }
}
