//! Serialised recompute/evaluate cycles over persisted budgets.
//!
//! The engine itself is stateless. This layer owns the per-budget read-modify-write:
//! a process-local lock per budget id serialises concurrent cycles, and the
//! store's optimistic version check rejects writers that bypass that lock (other
//! coordinators or processes sharing the store). Either way a threshold can fire
//! at most once per arming cycle. Logically deleted budgets are treated as missing.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    clock::Clock,
    engine::BudgetEngine,
    services::{BudgetAlert, RankedSummary, RolloverOutcome, SpendingSource},
};
use crate::{
    errors::{EngineError, Result},
    ledger::budget::{Budget, BudgetEdit},
    storage::BudgetStore,
};

/// Result of one successful refresh cycle.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub budget: Budget,
    pub alerts: Vec<BudgetAlert>,
}

#[derive(Debug)]
pub struct BudgetFailure {
    pub budget_id: Uuid,
    pub error: EngineError,
}

/// Per-budget results of refreshing every budget an owner has.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub outcomes: Vec<RefreshOutcome>,
    pub failures: Vec<BudgetFailure>,
}

impl RefreshReport {
    pub fn alerts(&self) -> impl Iterator<Item = &BudgetAlert> {
        self.outcomes.iter().flat_map(|outcome| outcome.alerts.iter())
    }
}

pub struct BudgetCoordinator<S, L, C> {
    store: S,
    engine: BudgetEngine<L, C>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S, L, C> BudgetCoordinator<S, L, C>
where
    S: BudgetStore,
    L: SpendingSource,
    C: Clock,
{
    pub fn new(store: S, engine: BudgetEngine<L, C>) -> Self {
        Self {
            store,
            engine,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &BudgetEngine<L, C> {
        &self.engine
    }

    pub fn create(&self, budget: &Budget) -> Result<Budget> {
        self.store.save_budget(budget)
    }

    /// Recomputes spending, evaluates alerts, and persists the result as one unit.
    pub fn refresh(&self, budget_id: Uuid) -> Result<RefreshOutcome> {
        self.with_budget(budget_id, |engine, budget| {
            let recomputed = engine.recompute_spending(budget)?;
            let (evaluated, alerts) = engine.evaluate_alerts(&recomputed);
            Ok((evaluated, alerts))
        })
        .map(|(budget, alerts)| RefreshOutcome { budget, alerts })
    }

    /// Refreshes each active budget of the owner independently. A failing budget
    /// is recorded and does not stop the others.
    pub fn refresh_owner(&self, owner_id: Uuid) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();
        for budget in self.store.list_budgets(owner_id)? {
            if !budget.is_active {
                continue;
            }
            match self.refresh(budget.id) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    warn!(budget = %budget.id, %error, "budget refresh failed");
                    report.failures.push(BudgetFailure {
                        budget_id: budget.id,
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Ranks the owner's budgets on freshly recomputed spending without
    /// persisting the recomputation. A budget whose ledger query fails is ranked
    /// on its cached spending.
    pub fn overview(&self, owner_id: Uuid) -> Result<RankedSummary> {
        let budgets: Vec<Budget> = self
            .store
            .list_budgets(owner_id)?
            .into_iter()
            .map(|budget| match self.engine.recompute_spending(&budget) {
                Ok(fresh) => fresh,
                Err(error) => {
                    warn!(budget = %budget.id, %error, "using cached spending for overview");
                    budget
                }
            })
            .collect();
        Ok(self.engine.rank_performance(&budgets))
    }

    /// Applies a user edit; structural changes re-arm every threshold.
    pub fn edit(&self, budget_id: Uuid, edit: BudgetEdit) -> Result<Budget> {
        self.with_budget(budget_id, |_, budget| {
            let mut next = budget.clone();
            if next.apply_edit(edit)? {
                debug!(budget = %budget_id, "structural edit re-armed thresholds");
            }
            Ok((next, ()))
        })
        .map(|(budget, _)| budget)
    }

    pub fn reset_alerts(&self, budget_id: Uuid) -> Result<Budget> {
        self.with_budget(budget_id, |engine, budget| Ok((engine.reset_alerts(budget), ())))
            .map(|(budget, _)| budget)
    }

    /// Closes the current period with fresh spending and advances the budget.
    pub fn close_period(&self, budget_id: Uuid) -> Result<(Budget, RolloverOutcome)> {
        self.with_budget(budget_id, |engine, budget| {
            let recomputed = engine.recompute_spending(budget)?;
            Ok(engine.close_period(&recomputed))
        })
    }

    pub fn delete(&self, budget_id: Uuid) -> Result<Budget> {
        let lock = self.lock_for(budget_id);
        let _guard = acquire(&lock);
        self.store.delete_budget(budget_id)
    }

    /// Loads, transforms, and saves one active budget while holding its lock.
    fn with_budget<T, F>(&self, budget_id: Uuid, apply: F) -> Result<(Budget, T)>
    where
        F: FnOnce(&BudgetEngine<L, C>, &Budget) -> Result<(Budget, T)>,
    {
        let lock = self.lock_for(budget_id);
        let _guard = acquire(&lock);
        let current = self.store.load_budget(budget_id)?;
        if !current.is_active {
            debug!(budget = %budget_id, "skipping inactive budget");
            return Err(EngineError::BudgetNotFound(budget_id));
        }
        let (next, extra) = apply(&self.engine, &current)?;
        let saved = self.store.save_budget(&next).map_err(|err| {
            if err.is_retryable() {
                warn!(budget = %budget_id, %err, "concurrent budget write detected");
            }
            err
        })?;
        Ok((saved, extra))
    }

    fn lock_for(&self, budget_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(budget_id).or_default())
    }
}

fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
