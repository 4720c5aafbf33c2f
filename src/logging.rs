//! Tracing subscriber setup for the binary.

use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

/// Maps `-v` repetitions to a default level: warn, info, debug, then trace.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs a stderr fmt layer filtered by `RUST_LOG`, or by `verbosity`
/// when `RUST_LOG` is unset or unparsable.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level_for(verbosity).into()));
    let _ = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
