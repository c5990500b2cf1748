// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle agent configuration.
//!
//! Every ceiling and remote command is passed into agent constructors from
//! here, so tests can build agents with arbitrary values.

use fm_core::HIGHLIGHT_MARKER;
use std::time::Duration;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Supervision ceilings, measured from `daemon/started`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// Request termination of a run older than this
    pub kill_after: Duration,
    /// Check for a lost container after this
    pub drop_after: Duration,
    /// Check for a lost host after this
    pub dismount_after: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { kill_after: 60 * MINUTE, drop_after: 10 * DAY, dismount_after: 10 * DAY }
    }
}

/// Remote command templates.
///
/// `{dir}` and `{container}` are replaced with shell-escaped values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scripts {
    /// Exits 0 while the run is still going
    pub check: String,
    pub kill: String,
    pub stop: String,
    /// Prints something when the run's process or container still exists
    pub inspect: String,
}

impl Default for Scripts {
    fn default() -> Self {
        Self {
            check: [
                "cd {dir} 2>/dev/null || exit 1",
                "if [ -e status ]; then exit 1; fi",
                "if [ ! -e pid ]; then exit 0; fi",
                "ps -p \"$(cat pid)\" >/dev/null 2>&1",
            ]
            .join("; "),
            kill: [
                "docker rm -f {container} >/dev/null 2>&1 || true",
                "cd {dir} && if [ -e pid ]; then pkill -TERM -P \"$(cat pid)\"; kill -TERM \"$(cat pid)\"; fi",
            ]
            .join("; "),
            stop: "docker stop -t 30 {container}".to_string(),
            inspect: [
                "docker ps -q --filter name=^{container}$ 2>/dev/null",
                "cd {dir} 2>/dev/null && [ -e pid ] && ps -p \"$(cat pid)\" -o pid= 2>/dev/null",
                "true",
            ]
            .join("; "),
        }
    }
}

/// A file uploaded next to `run.sh` before launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// File name inside the working directory
    pub name: String,
    pub content: Vec<u8>,
}

impl Asset {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), content: content.into() }
    }
}

/// What the Start agent ships to the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOptions {
    pub assets: Vec<Asset>,
    /// GPG keyring imported on the worker before launch
    pub keyring: Option<Vec<u8>>,
    /// Version line echoed at the top of every run
    pub banner: String,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            keyring: None,
            banner: format!("foreman {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl StartOptions {
    fm_core::setters! {
        into { banner: String }
        set { assets: Vec<Asset> }
        option { keyring: Vec<u8> }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub timeouts: Timeouts,
    pub scripts: Scripts,
    /// Marker word for highlights and stage signals
    pub marker: String,
    pub start: StartOptions,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            scripts: Scripts::default(),
            marker: HIGHLIGHT_MARKER.to_string(),
            start: StartOptions::default(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
