use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{category::Category, transaction::Transaction};
use crate::{
    core::services::spending_service::{SpendingQuery, SpendingSource, SpendingTotals},
    errors::Result,
    ledger::budget::CategorySpending,
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// In-memory transaction ledger. Serves as the engine's spending source in
/// tests, the CLI, and embedded use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            categories: Vec::new(),
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl SpendingSource for Ledger {
    fn find_spending(&self, query: &SpendingQuery) -> Result<SpendingTotals> {
        let mut per_category: Vec<CategorySpending> = query
            .category_ids
            .iter()
            .map(|&category_id| CategorySpending {
                category_id,
                spent: 0.0,
                transaction_count: 0,
            })
            .collect();

        for txn in &self.transactions {
            if txn.owner_id != query.owner_id
                || !txn.is_completed_expense()
                || !query.window.contains(txn.date)
            {
                continue;
            }
            let Some(category_id) = txn.category_id else {
                continue;
            };
            if let Some(entry) = per_category
                .iter_mut()
                .find(|entry| entry.category_id == category_id)
            {
                entry.spent += txn.amount;
                entry.transaction_count += 1;
            }
        }

        Ok(SpendingTotals::from_categories(per_category))
    }
}
