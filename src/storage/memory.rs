use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use super::BudgetStore;
use crate::{
    errors::{EngineError, Result},
    ledger::budget::Budget,
};

/// Budget store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    budgets: RwLock<HashMap<Uuid, Budget>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Budget>> {
        self.budgets
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Budget>> {
        self.budgets
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BudgetStore for MemoryStore {
    fn load_budget(&self, id: Uuid) -> Result<Budget> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::BudgetNotFound(id))
    }

    fn save_budget(&self, budget: &Budget) -> Result<Budget> {
        let mut budgets = self.write();
        if let Some(existing) = budgets.get(&budget.id) {
            if existing.version != budget.version {
                return Err(EngineError::PersistenceConflict {
                    id: budget.id,
                    expected: budget.version,
                    found: existing.version,
                });
            }
        }
        let mut stored = budget.clone();
        stored.version += 1;
        budgets.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn list_budgets(&self, owner_id: Uuid) -> Result<Vec<Budget>> {
        let mut owned: Vec<Budget> = self
            .read()
            .values()
            .filter(|budget| budget.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::time_window::DateWindow;
    use chrono::NaiveDate;

    fn sample_budget() -> Budget {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        )
        .unwrap();
        Budget::new(Uuid::new_v4(), "Dining", 300.0, window).unwrap()
    }

    #[test]
    fn save_bumps_version_and_rejects_stale_writes() {
        let store = MemoryStore::new();
        let budget = sample_budget();
        let first = store.save_budget(&budget).expect("initial save");
        assert_eq!(first.version, 1);

        let second = store.save_budget(&first).expect("save with current version");
        assert_eq!(second.version, 2);

        let err = store.save_budget(&first).unwrap_err();
        assert!(matches!(
            err,
            EngineError::PersistenceConflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn delete_marks_budget_inactive() {
        let store = MemoryStore::new();
        let saved = store.save_budget(&sample_budget()).unwrap();
        let deleted = store.delete_budget(saved.id).unwrap();
        assert!(!deleted.is_active);
        assert!(!store.load_budget(saved.id).unwrap().is_active);
    }

    #[test]
    fn load_missing_budget_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.load_budget(id),
            Err(EngineError::BudgetNotFound(missing)) if missing == id
        ));
    }
}
