use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dated monetary event recorded in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    /// Creates a completed expense, the only kind that counts toward budget spending.
    pub fn expense(owner_id: Uuid, category_id: Uuid, date: NaiveDate, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id: Some(category_id),
            date,
            amount,
            kind: TransactionKind::Expense,
            status: TransactionStatus::Completed,
            notes: None,
        }
    }

    pub fn income(owner_id: Uuid, category_id: Uuid, date: NaiveDate, amount: f64) -> Self {
        Self {
            kind: TransactionKind::Income,
            ..Self::expense(owner_id, category_id, date, amount)
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_completed_expense(&self) -> bool {
        self.kind == TransactionKind::Expense && self.status == TransactionStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}
