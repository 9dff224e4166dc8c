//! Logging setup
//!
//! Diagnostics go to stderr so they never interleave with prompts on stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber. `RUST_LOG` wins over `-v` flags.
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    tracing::debug!(level = default_level, "logging initialized");
}
