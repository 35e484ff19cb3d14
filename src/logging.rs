//! Global tracing subscriber for the command-line tool.
//!
//! `RUST_LOG` wins when set; otherwise the level passed on the command line
//! applies to this crate and everything else stays at `warn`.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("unknown log level '{0}' (expected error, warn, info, debug or trace)")]
    UnknownLevel(String),
    #[error("tracing subscriber already installed")]
    AlreadyInitialised,
}

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Filter directive for a command-line level.
pub fn directive(level: &str) -> Result<String, InitError> {
    let level = level.to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        return Err(InitError::UnknownLevel(level));
    }
    Ok(format!("warn,fxdescent={}", level))
}

/// Install the stderr subscriber.
pub fn init(level: &str) -> Result<(), InitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(directive(level)?),
    };
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal());
    Registry::default()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|_| InitError::AlreadyInitialised)
}
