use thiserror::Error;
use uuid::Uuid;

/// Error type shared by the budget engine, its storage adapters, and the CLI.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid window: end date {end} must be after start date {start}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("Degenerate amount: {0} (budget amounts must be positive)")]
    DegenerateAmount(f64),
    #[error("Persistence conflict on budget {id}: expected version {expected}, found {found}")]
    PersistenceConflict { id: Uuid, expected: u64, found: u64 },
    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),
    #[error("Ledger query failed: {0}")]
    Ledger(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Returns `true` when the caller may retry the operation against fresh state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::PersistenceConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_and_serde_errors_keep_their_source() {
        let io: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, EngineError::Io(_)));
        assert!(io.source().is_some());

        let parse: EngineError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(parse, EngineError::Serde(_)));
        assert!(parse.source().is_some());
        assert!(!parse.is_retryable());
    }
}
