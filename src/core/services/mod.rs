pub mod alert_service;
pub mod metrics_service;
pub mod performance_service;
pub mod rollover_service;
pub mod spending_service;

pub use alert_service::{AlertService, BudgetAlert};
pub use metrics_service::{BudgetMetrics, BudgetReport, BudgetStatus, MetricsInput, MetricsService};
pub use performance_service::{
    PerformanceService, PerformanceSummary, RankedBudget, RankedSummary, StatusCounts,
};
pub use rollover_service::{RolloverOutcome, RolloverService};
pub use spending_service::{SpendingQuery, SpendingService, SpendingSource, SpendingTotals};

#[cfg(test)]
mod tests;
