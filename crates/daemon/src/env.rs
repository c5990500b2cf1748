// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: FM_STATE_DIR > XDG_STATE_HOME/foreman > ~/.local/state/foreman
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = non_empty("FM_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("foreman"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/foreman"))
}

/// Scheduler tick override
pub fn pulse_interval() -> Option<Duration> {
    millis("FM_PULSE_MS")
}

/// Concurrent pulse override
pub fn workers() -> Option<usize> {
    std::env::var("FM_WORKERS").ok().and_then(|s| s.parse::<usize>().ok()).filter(|n| *n > 0)
}

/// Shutdown drain timeout override
pub fn drain_timeout() -> Option<Duration> {
    millis("FM_DRAIN_TIMEOUT_MS")
}

/// Log filter directive: FM_LOG > RUST_LOG
pub fn log_filter() -> Option<String> {
    non_empty("FM_LOG").or_else(|| non_empty("RUST_LOG"))
}

fn millis(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
