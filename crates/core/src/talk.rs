// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Talk documents: the per-conversation state tree.
//!
//! A talk owns at most one `daemon` group (the record of one remote run),
//! an optional `shell` group describing the provisioned worker, and the
//! accumulated `archive` of finished runs.
//!
//! ```text
//! talk (name, number)
//!  ├── shell   {host, port, login, key}
//!  ├── daemon  {id, title, script, dir, started, ended, code, tail, highlights, killed, stop}
//!  └── archive [log {id, title, uri}, ...]
//! ```

use crate::id::DaemonId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique conversation name, e.g. `acme/widgets#42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TalkName(String);

impl TalkName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TalkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TalkName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TalkName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for TalkName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for TalkName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The state document of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub name: TalkName,
    /// Sequence number assigned when the talk was created
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<ShellInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon: Option<Daemon>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archive: Vec<ArchiveLog>,
}

impl Talk {
    pub fn new(name: impl Into<TalkName>, number: u64) -> Self {
        Self { name: name.into(), number, shell: None, daemon: None, archive: Vec::new() }
    }

    /// Short status word for listings
    pub fn status(&self) -> &'static str {
        match &self.daemon {
            None if self.archive.is_empty() => "idle",
            None => "archived",
            Some(d) if d.is_live() => "running",
            Some(d) if d.ended.is_some() => "finished",
            Some(d) if d.dir.is_some() => "provisioned",
            Some(_) => "pending",
        }
    }
}

/// Connection fields of the provisioned worker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellInfo {
    pub host: String,
    pub port: u16,
    pub login: String,
    /// Private key material (PEM)
    pub key: String,
}

impl ShellInfo {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        login: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self { host: host.into(), port, login: login.into(), key: key.into() }
    }

    /// True when every connection field is present, so a connection can be attempted.
    pub fn is_reachable(&self) -> bool {
        !self.host.trim().is_empty()
            && self.port != 0
            && !self.login.trim().is_empty()
            && !self.key.trim().is_empty()
    }

    /// `host:port` for log lines
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ShellInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .finish()
    }
}

/// Record of one remote execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Daemon {
    pub id: DaemonId,
    /// Human label of the run (e.g. `merge`, `deploy`)
    pub title: String,
    /// Command to execute remotely
    pub script: String,
    /// Remote working directory, set once provisioning succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    /// When termination was requested after the run overstayed its ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopRequest>,
}

impl Daemon {
    pub fn new(id: DaemonId, title: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            script: script.into(),
            dir: None,
            started: None,
            ended: None,
            code: None,
            tail: None,
            highlights: None,
            killed: None,
            stop: None,
        }
    }

    /// Started and not yet known to have finished
    pub fn is_live(&self) -> bool {
        self.started.is_some() && self.code.is_none() && self.ended.is_none()
    }

    /// Run duration, when both ends are known
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.ended? - self.started?)
    }
}

/// External request to stop a live run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    pub requested: DateTime<Utc>,
    /// Set once the stop command has been sent to the worker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<DateTime<Utc>>,
}

/// `archive/log` entry left behind by a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLog {
    pub id: DaemonId,
    pub title: String,
    /// Durable locator of the full output
    pub uri: String,
}

#[cfg(test)]
#[path = "talk_tests.rs"]
mod tests;
