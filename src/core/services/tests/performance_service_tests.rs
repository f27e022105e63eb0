use uuid::Uuid;

use super::{at, budget_with_spent, date};
use crate::{
    core::services::{BudgetStatus, PerformanceService},
    ledger::{Budget, CategorySpending, DateWindow},
};

#[test]
fn ranks_by_utilization_descending_with_stable_ties() {
    let low = budget_with_spent(100.0, 10.0);
    let tie_first = budget_with_spent(100.0, 80.0);
    let high = budget_with_spent(100.0, 120.0);
    let tie_second = budget_with_spent(200.0, 160.0);
    let budgets = vec![low.clone(), tie_first.clone(), high.clone(), tie_second.clone()];

    let ranked = PerformanceService::rank(&budgets, at(2024, 6, 15));
    let order: Vec<Uuid> = ranked.budgets.iter().map(|b| b.report.budget_id).collect();
    assert_eq!(order, vec![high.id, tie_first.id, tie_second.id, low.id]);

    let summary = ranked.summary;
    assert_eq!(summary.budget_count, 4);
    assert_eq!(summary.status_counts.over_budget, 1);
    assert_eq!(summary.status_counts.warning, 2);
    assert_eq!(summary.status_counts.on_track, 1);
    assert_eq!(summary.status_counts.critical, 0);
    assert_eq!(summary.total_amount, 500.0);
    assert_eq!(summary.total_spent, 370.0);
    assert_eq!(summary.average_utilization, (10.0 + 80.0 + 120.0 + 80.0) / 4.0);
}

#[test]
fn skips_inactive_and_out_of_window_budgets() {
    let active = budget_with_spent(100.0, 50.0);
    let mut deleted = budget_with_spent(100.0, 90.0);
    deleted.deactivate();
    let next_month = Budget::new(
        Uuid::new_v4(),
        "July",
        100.0,
        DateWindow::new(date(2024, 7, 2), date(2024, 8, 1)).unwrap(),
    )
    .unwrap();

    let ranked = PerformanceService::rank(&[active.clone(), deleted, next_month], at(2024, 6, 15));
    assert_eq!(ranked.budgets.len(), 1);
    assert_eq!(ranked.budgets[0].report.budget_id, active.id);
    assert_eq!(ranked.budgets[0].report.metrics.status, BudgetStatus::OnTrack);
}

#[test]
fn empty_input_has_zero_average() {
    let ranked = PerformanceService::rank(&Vec::<Budget>::new(), at(2024, 6, 15));
    assert!(ranked.budgets.is_empty());
    assert_eq!(ranked.summary.average_utilization, 0.0);
}

#[test]
fn top_category_is_largest_contributor() {
    let mut budget = budget_with_spent(300.0, 150.0);
    let (small, large) = (Uuid::new_v4(), Uuid::new_v4());
    budget.current_period.per_category = vec![
        CategorySpending {
            category_id: small,
            spent: 40.0,
            transaction_count: 1,
        },
        CategorySpending {
            category_id: large,
            spent: 110.0,
            transaction_count: 3,
        },
    ];
    let ranked = PerformanceService::rank(&[budget], at(2024, 6, 15));
    assert_eq!(ranked.budgets[0].top_category, Some(large));
}
