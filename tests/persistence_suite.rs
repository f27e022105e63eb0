mod common;

use std::{
    sync::{Arc, Barrier},
    thread,
};

use budget_engine::{
    ledger::{BudgetEdit, Ledger, ThresholdKind, Transaction},
    storage::{json_backend, BudgetStore, JsonStorage},
};
use common::{budget, date, json_coordinator, temp_dir};
use uuid::Uuid;

#[test]
fn refreshed_budget_survives_reopen() {
    let owner = Uuid::new_v4();
    let category = Uuid::new_v4();
    let mut ledger = Ledger::new("Household");
    ledger.add_transaction(Transaction::expense(owner, category, date(2024, 6, 6), 210.0));
    let coordinator = json_coordinator(ledger, date(2024, 6, 20));

    let pets =
        budget(owner, "Pets", 250.0, &[category]).with_threshold(80, ThresholdKind::Warning);
    let stored = coordinator.create(&pets).unwrap();
    let outcome = coordinator.refresh(stored.id).unwrap();
    assert_eq!(outcome.alerts.len(), 1);

    let reopened = JsonStorage::new(Some(coordinator.store().base_dir().to_path_buf())).unwrap();
    let loaded = reopened.load_budget(stored.id).unwrap();
    assert_eq!(loaded, outcome.budget);
    assert_eq!(loaded.current_period.spent, 210.0);
    assert_eq!(loaded.alert_state.fired.len(), 1);
}

#[test]
fn deleted_budget_stays_on_disk_inactive() {
    let owner = Uuid::new_v4();
    let coordinator = json_coordinator(Ledger::new("Household"), date(2024, 6, 2));
    let stored = coordinator
        .create(&budget(owner, "Coffee", 40.0, &[Uuid::new_v4()]))
        .unwrap();

    coordinator.delete(stored.id).unwrap();

    assert!(coordinator.store().budget_path(stored.id).exists());
    let listed = coordinator.store().list_budgets(owner).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].is_active);
    assert!(coordinator.refresh_owner(owner).unwrap().outcomes.is_empty());
}

#[test]
fn close_period_writes_history() {
    let owner = Uuid::new_v4();
    let category = Uuid::new_v4();
    let mut ledger = Ledger::new("Household");
    ledger.add_transaction(Transaction::expense(owner, category, date(2024, 6, 11), 700.0));
    let coordinator = json_coordinator(ledger, date(2024, 7, 1));

    let stored = coordinator
        .create(&budget(owner, "Rent", 1000.0, &[category]).with_rollover(50.0))
        .unwrap();
    let (closed, outcome) = coordinator.close_period(stored.id).unwrap();

    assert_eq!(outcome.carryover, 300.0);
    assert_eq!(outcome.snapshot.actual_spent, 700.0);
    let loaded = coordinator.store().load_budget(stored.id).unwrap();
    assert_eq!(loaded, closed);
    assert_eq!(loaded.history.len(), 1);
    assert_eq!(loaded.effective_amount(), 1300.0);
}

#[test]
fn ledger_snapshot_feeds_engine() {
    let owner = Uuid::new_v4();
    let category = Uuid::new_v4();
    let mut ledger = Ledger::new("Household");
    ledger.add_transaction(Transaction::expense(owner, category, date(2024, 6, 1), 12.5));
    ledger.add_transaction(Transaction::expense(owner, category, date(2024, 7, 1), 7.5));

    let path = temp_dir().join("ledger.json");
    json_backend::save_ledger_to_path(&ledger, &path).unwrap();
    let restored = json_backend::load_ledger_from_path(&path).unwrap();

    let coordinator = json_coordinator(restored, date(2024, 6, 15));
    let stored = coordinator
        .create(&budget(owner, "Snacks", 50.0, &[category]))
        .unwrap();
    let refreshed = coordinator.refresh(stored.id).unwrap().budget;
    // both window endpoints count
    assert_eq!(refreshed.current_period.spent, 20.0);
    assert_eq!(refreshed.current_period.transaction_count, 2);
}

#[test]
fn separate_instances_cannot_both_commit_a_version() {
    let home = temp_dir();
    let seed = JsonStorage::new(Some(home.clone())).unwrap();
    let stored = seed
        .save_budget(&budget(Uuid::new_v4(), "Shared", 100.0, &[Uuid::new_v4()]))
        .unwrap();

    for _ in 0..50 {
        let current = seed.load_budget(stored.id).unwrap();
        let barrier = Arc::new(Barrier::new(2));
        let writers: Vec<_> = (0..2)
            .map(|_| {
                let storage = JsonStorage::new(Some(home.clone())).unwrap();
                let barrier = Arc::clone(&barrier);
                let snapshot = current.clone();
                thread::spawn(move || {
                    barrier.wait();
                    storage.save_budget(&snapshot)
                })
            })
            .collect();
        let results: Vec<_> = writers.into_iter().map(|h| h.join().unwrap()).collect();

        let committed = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(committed, 1);
        assert!(results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| err.is_retryable()));
        assert_eq!(seed.load_budget(stored.id).unwrap().version, current.version + 1);
    }
}

#[test]
fn edited_carryover_is_persisted_within_bound() {
    let owner = Uuid::new_v4();
    let category = Uuid::new_v4();
    let mut ledger = Ledger::new("Household");
    ledger.add_transaction(Transaction::expense(owner, category, date(2024, 6, 9), 100.0));
    let coordinator = json_coordinator(ledger, date(2024, 7, 1));

    let stored = coordinator
        .create(&budget(owner, "Holiday", 1000.0, &[category]).with_rollover(50.0))
        .unwrap();
    let (_, outcome) = coordinator.close_period(stored.id).unwrap();
    assert_eq!(outcome.carryover, 500.0);

    coordinator
        .edit(
            stored.id,
            BudgetEdit {
                amount: Some(100.0),
                ..BudgetEdit::default()
            },
        )
        .unwrap();
    let loaded = coordinator.store().load_budget(stored.id).unwrap();
    assert_eq!(loaded.rollover.amount, 50.0);
    assert_eq!(loaded.effective_amount(), 150.0);
}
