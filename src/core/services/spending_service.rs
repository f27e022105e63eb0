//! Aggregates ledger activity into a budget's current-period spending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    errors::Result,
    ledger::{
        budget::{Budget, CategorySpending, CurrentPeriod},
        time_window::DateWindow,
    },
};

/// Filter handed to a [`SpendingSource`]: completed expenses for one owner,
/// any of the listed categories, dated inside the window (inclusive).
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingQuery {
    pub owner_id: Uuid,
    pub category_ids: Vec<Uuid>,
    pub window: DateWindow,
}

impl SpendingQuery {
    pub fn for_budget(budget: &Budget) -> Self {
        Self {
            owner_id: budget.owner_id,
            category_ids: budget.category_ids(),
            window: budget.window,
        }
    }
}

/// Result of a spending query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SpendingTotals {
    pub total: f64,
    pub count: u64,
    /// Per-category contribution in query order, including zero rows.
    #[serde(default)]
    pub per_category: Vec<CategorySpending>,
}

impl SpendingTotals {
    pub fn from_categories(per_category: Vec<CategorySpending>) -> Self {
        let total = per_category.iter().map(|entry| entry.spent).sum();
        let count = per_category.iter().map(|entry| entry.transaction_count).sum();
        Self {
            total,
            count,
            per_category,
        }
    }
}

/// Read side of the transaction ledger. Implementations must be read-only and
/// return `{0, 0}` rather than an error when nothing matches.
pub trait SpendingSource: Send + Sync {
    fn find_spending(&self, query: &SpendingQuery) -> Result<SpendingTotals>;
}

/// Stateless aggregation helpers over a [`SpendingSource`].
pub struct SpendingService;

impl SpendingService {
    /// Queries the source for a budget's spending. An empty category set never
    /// reaches the source and yields zero spending.
    pub fn aggregate(source: &dyn SpendingSource, budget: &Budget) -> Result<SpendingTotals> {
        let query = SpendingQuery::for_budget(budget);
        if query.category_ids.is_empty() {
            return Ok(SpendingTotals::default());
        }
        let mut totals = source.find_spending(&query)?;
        if totals.total < 0.0 {
            totals.total = 0.0;
        }
        debug!(
            budget = %budget.id,
            total = totals.total,
            count = totals.count,
            "aggregated budget spending"
        );
        Ok(totals)
    }

    /// Builds the cached current-period state from aggregated totals.
    pub fn current_period(
        budget: &Budget,
        totals: SpendingTotals,
        calculated_at: DateTime<Utc>,
    ) -> CurrentPeriod {
        CurrentPeriod {
            spent: totals.total,
            remaining: budget.amount - totals.total,
            transaction_count: totals.count,
            last_calculated: Some(calculated_at),
            per_category: totals.per_category,
        }
    }
}
