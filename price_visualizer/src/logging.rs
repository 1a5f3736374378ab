use std::io;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a stderr subscriber so log lines never interleave with prompts
/// on stdout. `RUST_LOG` overrides `default_level`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_level: Level) -> bool {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
