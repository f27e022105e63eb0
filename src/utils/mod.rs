pub mod paths;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_FILTER: &str = "budget_engine=info";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Initializes tracing with `directive` layered over `RUST_LOG`. Output goes to
/// stderr so command output on stdout stays clean. Only the first call has an effect.
pub fn init_tracing_with(directive: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        match directive.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(_) => {
                if let Ok(fallback) = DEFAULT_LOG_FILTER.parse() {
                    filter = filter.add_directive(fallback);
                }
            }
        }

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
