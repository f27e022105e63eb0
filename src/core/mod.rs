//! Budget tracking engine: stateless services, the invocation surface, and the
//! coordinator that serialises persisted cycles per budget.

pub mod clock;
pub mod coordinator;
pub mod engine;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{BudgetCoordinator, BudgetFailure, RefreshOutcome, RefreshReport};
pub use engine::BudgetEngine;
