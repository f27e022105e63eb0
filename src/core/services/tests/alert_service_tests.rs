use super::{at, budget_with_spent};
use crate::{
    core::services::AlertService,
    ledger::{BudgetEdit, ThresholdKind},
};

#[test]
fn threshold_fires_once_per_arming_cycle() {
    let mut budget = budget_with_spent(100.0, 85.0).with_threshold(80, ThresholdKind::Warning);
    let threshold_id = budget.alerts.thresholds[0].id;

    let first = AlertService::evaluate(&mut budget, at(2024, 6, 10));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].threshold_percentage, 80);
    assert_eq!(first[0].current_utilization, 85);
    assert_eq!(first[0].remaining, 15.0);
    assert!(budget.threshold_notified(threshold_id));
    assert_eq!(
        budget.alert_state.last_notified_at(threshold_id),
        Some(at(2024, 6, 10))
    );

    let second = AlertService::evaluate(&mut budget, at(2024, 6, 11));
    assert!(second.is_empty());
    assert_eq!(
        budget.alert_state.last_notified_at(threshold_id),
        Some(at(2024, 6, 10))
    );
}

#[test]
fn structural_edit_allows_refiring() {
    let mut budget = budget_with_spent(100.0, 85.0).with_threshold(80, ThresholdKind::Warning);
    assert_eq!(AlertService::evaluate(&mut budget, at(2024, 6, 10)).len(), 1);

    let thresholds = budget.alerts.thresholds.clone();
    budget
        .apply_edit(BudgetEdit {
            thresholds: Some(thresholds),
            start: Some(super::date(2024, 6, 2)),
            ..BudgetEdit::default()
        })
        .unwrap();

    let refired = AlertService::evaluate(&mut budget, at(2024, 6, 12));
    assert_eq!(refired.len(), 1);
    assert_eq!(refired[0].fired_at, at(2024, 6, 12));
}

#[test]
fn only_newly_fired_thresholds_are_returned() {
    let mut budget = budget_with_spent(200.0, 120.0)
        .with_threshold(50, ThresholdKind::Warning)
        .with_threshold(90, ThresholdKind::Critical);

    let first = AlertService::evaluate(&mut budget, at(2024, 6, 5));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].kind, ThresholdKind::Warning);

    budget.current_period.spent = 190.0;
    let second = AlertService::evaluate(&mut budget, at(2024, 6, 8));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].kind, ThresholdKind::Critical);
    assert_eq!(second[0].current_utilization, 95);
}

#[test]
fn disabled_alerts_never_transition() {
    let mut budget = budget_with_spent(100.0, 150.0)
        .with_threshold(80, ThresholdKind::Warning)
        .with_alerts_enabled(false);
    assert!(AlertService::evaluate(&mut budget, at(2024, 6, 10)).is_empty());
    assert!(budget.alert_state.fired.is_empty());
}

#[test]
fn manual_reset_keeps_configuration() {
    let mut budget = budget_with_spent(100.0, 100.0)
        .with_threshold(80, ThresholdKind::Warning)
        .with_threshold(100, ThresholdKind::Critical);
    let thresholds = budget.alerts.thresholds.clone();
    assert_eq!(AlertService::evaluate(&mut budget, at(2024, 6, 10)).len(), 2);

    AlertService::reset(&mut budget);
    assert!(budget.alert_state.fired.is_empty());
    assert_eq!(budget.alerts.thresholds, thresholds);
    assert_eq!(budget.amount, 100.0);
    assert_eq!(AlertService::evaluate(&mut budget, at(2024, 6, 11)).len(), 2);
}

#[test]
fn below_threshold_stays_unarmed() {
    let mut budget = budget_with_spent(100.0, 79.4).with_threshold(80, ThresholdKind::Warning);
    assert!(AlertService::evaluate(&mut budget, at(2024, 6, 10)).is_empty());
    let id = budget.alerts.thresholds[0].id;
    assert!(!budget.threshold_notified(id));
}
