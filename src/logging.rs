//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "TABLE_DEPS_LOG";

/// Install the global subscriber.
///
/// Reads `TABLE_DEPS_LOG` for filter directives, for example
/// `TABLE_DEPS_LOG=table_deps::engine=debug`. Falls back to
/// `table_deps=warn` when unset or invalid. Logs go to stderr so stdout only
/// carries command output. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("table_deps=warn"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
