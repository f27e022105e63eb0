//! Ranks a user's active budgets and summarises them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics_service::{BudgetReport, BudgetStatus, MetricsService};
use crate::ledger::budget::Budget;

/// One ranked budget with its metrics and largest contributing category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedBudget {
    pub report: BudgetReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_category: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatusCounts {
    pub on_track: usize,
    pub warning: usize,
    pub critical: usize,
    pub over_budget: usize,
}

impl StatusCounts {
    fn record(&mut self, status: BudgetStatus) {
        match status {
            BudgetStatus::OnTrack => self.on_track += 1,
            BudgetStatus::Warning => self.warning += 1,
            BudgetStatus::Critical => self.critical += 1,
            BudgetStatus::OverBudget => self.over_budget += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PerformanceSummary {
    pub budget_count: usize,
    pub status_counts: StatusCounts,
    pub total_amount: f64,
    pub total_spent: f64,
    /// Unweighted mean of utilisation across budgets; 0 when there are none.
    pub average_utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RankedSummary {
    /// Highest utilisation first; ties keep input order.
    pub budgets: Vec<RankedBudget>,
    pub summary: PerformanceSummary,
}

pub struct PerformanceService;

impl PerformanceService {
    /// Ranks the budgets that are active and whose window covers `now`.
    pub fn rank<'a, I>(budgets: I, now: DateTime<Utc>) -> RankedSummary
    where
        I: IntoIterator<Item = &'a Budget>,
    {
        let mut ranked: Vec<RankedBudget> = budgets
            .into_iter()
            .filter(|budget| budget.is_active && budget.window.overlaps(now))
            .map(|budget| RankedBudget {
                report: MetricsService::compute(budget, now),
                top_category: top_category(budget),
            })
            .collect();

        // `sort_by` is stable, so equal utilisation keeps insertion order.
        ranked.sort_by(|a, b| {
            b.report
                .metrics
                .utilization_percentage
                .cmp(&a.report.metrics.utilization_percentage)
        });

        let summary = summarize(&ranked);
        RankedSummary {
            budgets: ranked,
            summary,
        }
    }
}

fn summarize(ranked: &[RankedBudget]) -> PerformanceSummary {
    let mut summary = PerformanceSummary {
        budget_count: ranked.len(),
        ..PerformanceSummary::default()
    };
    let mut utilization_sum = 0.0;
    for entry in ranked {
        let metrics = &entry.report.metrics;
        summary.status_counts.record(metrics.status);
        summary.total_amount += metrics.amount;
        summary.total_spent += metrics.spent;
        utilization_sum += f64::from(metrics.utilization_percentage);
    }
    if !ranked.is_empty() {
        summary.average_utilization = utilization_sum / ranked.len() as f64;
    }
    summary
}

fn top_category(budget: &Budget) -> Option<Uuid> {
    budget
        .current_period
        .per_category
        .iter()
        .filter(|entry| entry.spent > 0.0)
        .fold(None, |best: Option<(Uuid, f64)>, entry| match best {
            Some((_, spent)) if spent >= entry.spent => best,
            _ => Some((entry.category_id, entry.spent)),
        })
        .map(|(id, _)| id)
}
