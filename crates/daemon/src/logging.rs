// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! The daemon writes to `<state>/daemon.log` through a non-blocking
//! appender; operator commands write to stderr.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "daemon.log";

/// `FM_LOG` / `RUST_LOG` if set and valid, else `default`.
pub fn filter(default: &str) -> EnvFilter {
    crate::env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Log to `<state_dir>/daemon.log`. Keep the guard alive for the life of
/// the process or buffered lines are lost.
pub fn init_daemon(state_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(state_dir)?;
    let appender = tracing_appender::rolling::never(state_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::registry()
        .with(filter("info"))
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .try_init();
    Ok(guard)
}

/// Log warnings and errors to stderr for one-shot commands.
pub fn init_cli() {
    let _ = tracing_subscriber::registry()
        .with(filter("warn"))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
