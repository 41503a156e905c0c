//! Logging setup
//!
//! Diagnostics are emitted with `tracing` and written to stderr, keeping
//! stdout free for the per-file reports.

use std::env;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install the global subscriber
///
/// `debug` forces DEBUG; otherwise `RUST_LOG` applies, defaulting to INFO.
pub fn initialize_tracing(debug: bool) {
    let (level, env_filter) = if debug {
        (Level::DEBUG, EnvFilter::new("diskchurn=DEBUG"))
    } else {
        parse_rust_log()
    };

    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(format.with_filter(LevelFilter::from(level)))
        .with(env_filter)
        .init();
}

/// Interpret `RUST_LOG` either as a plain level or as a full filter
pub fn parse_rust_log() -> (Level, EnvFilter) {
    let level = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => match value.parse::<Level>() {
            Ok(level) => level,
            Err(_) => return (Level::TRACE, EnvFilter::new(value)),
        },
        Err(_) => Level::INFO,
    };

    (level, EnvFilter::new(format!("WARN,diskchurn={}", level)))
}
