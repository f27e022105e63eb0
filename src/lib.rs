#![doc(test(attr(deny(warnings))))]

//! Budget Engine aggregates ledger spending into budgets, derives utilisation and
//! projection metrics, drives per-threshold alerts, computes rollover carryover,
//! and ranks a user's budgets.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use errors::{EngineError, Result};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Engine tracing initialized.");
    });
}

/// Initializes tracing with the configured filter directive.
pub fn init_with_filter(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(directive);
        tracing::info!("Budget Engine tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
