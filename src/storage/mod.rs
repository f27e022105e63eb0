pub mod json_backend;
pub mod memory;

use uuid::Uuid;

use crate::{errors::Result, ledger::budget::Budget};

/// Persistence for budget entities.
///
/// `save_budget` performs an optimistic version check: the stored copy must carry
/// the same `version` as the budget being written, otherwise the write is
/// rejected with [`crate::errors::EngineError::PersistenceConflict`]. On success
/// the stored copy, with its version bumped, is returned.
pub trait BudgetStore: Send + Sync {
    fn load_budget(&self, id: Uuid) -> Result<Budget>;
    fn save_budget(&self, budget: &Budget) -> Result<Budget>;
    fn list_budgets(&self, owner_id: Uuid) -> Result<Vec<Budget>>;

    /// Logically deletes a budget by marking it inactive.
    fn delete_budget(&self, id: Uuid) -> Result<Budget> {
        let mut budget = self.load_budget(id)?;
        budget.deactivate();
        self.save_budget(&budget)
    }
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStore;
