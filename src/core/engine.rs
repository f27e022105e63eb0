//! Invocation surface of the budget engine.
//!
//! Each operation takes a budget snapshot and returns the transformed copy. None
//! of them persist anything; callers store the returned state explicitly.

use chrono::{DateTime, Utc};

use super::{
    clock::Clock,
    services::{
        AlertService, BudgetAlert, BudgetReport, MetricsService, PerformanceService,
        RankedSummary, RolloverOutcome, RolloverService, SpendingService, SpendingSource,
    },
};
use crate::{errors::Result, ledger::budget::Budget};

pub struct BudgetEngine<L, C> {
    source: L,
    clock: C,
}

impl<L: SpendingSource, C: Clock> BudgetEngine<L, C> {
    pub fn new(source: L, clock: C) -> Self {
        Self { source, clock }
    }

    pub fn source(&self) -> &L {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Re-derives the current-period cache from the ledger.
    pub fn recompute_spending(&self, budget: &Budget) -> Result<Budget> {
        let totals = SpendingService::aggregate(&self.source, budget)?;
        let mut next = budget.clone();
        next.current_period = SpendingService::current_period(budget, totals, self.clock.now());
        Ok(next)
    }

    /// Runs the alert state machine against the budget's cached spending.
    pub fn evaluate_alerts(&self, budget: &Budget) -> (Budget, Vec<BudgetAlert>) {
        let mut next = budget.clone();
        let alerts = AlertService::evaluate(&mut next, self.clock.now());
        (next, alerts)
    }

    pub fn reset_alerts(&self, budget: &Budget) -> Budget {
        let mut next = budget.clone();
        AlertService::reset(&mut next);
        next
    }

    pub fn compute_metrics(&self, budget: &Budget, now: DateTime<Utc>) -> BudgetReport {
        MetricsService::compute(budget, now)
    }

    pub fn rank_performance(&self, budgets: &[Budget]) -> RankedSummary {
        PerformanceService::rank(budgets, self.clock.now())
    }

    /// Closes the current period and advances the budget into the next one.
    pub fn close_period(&self, budget: &Budget) -> (Budget, RolloverOutcome) {
        let mut next = budget.clone();
        let outcome = RolloverService::roll_forward(&mut next, self.clock.now());
        (next, outcome)
    }
}
