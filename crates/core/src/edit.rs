// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed edits applied to a talk document.
//!
//! Agents never mutate a [`Talk`] directly. They return an [`Edits`] batch
//! which the pulse applies with [`Talk::apply`]: either every edit in the
//! batch succeeds or the talk is left exactly as it was.

use crate::id::DaemonId;
use crate::talk::{ArchiveLog, Daemon, ShellInfo, StopRequest, Talk};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal facts of a run, always recorded together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub ended: DateTime<Utc>,
    pub code: i32,
    pub tail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
}

impl Outcome {
    pub fn new(ended: DateTime<Utc>, code: i32, tail: impl Into<String>) -> Self {
        Self { ended, code, tail: tail.into(), highlights: None }
    }

    pub fn with_highlights(mut self, highlights: impl Into<String>) -> Self {
        self.highlights = Some(highlights.into());
        self
    }
}

/// One structural change to a talk document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Attach (or replace) the worker connection
    AddShell { shell: ShellInfo },
    RemoveShell,
    /// Create the daemon group; fails if one already exists
    AddDaemon { id: DaemonId, title: String, script: String },
    SetDir { dir: String },
    /// Forget an unusable working directory
    RetractDir,
    Start { at: DateTime<Utc> },
    /// Record `ended`, `code`, `tail` and `highlights` in one step
    Finish { outcome: Outcome },
    MarkKilled { at: DateTime<Utc> },
    RequestStop { at: DateTime<Utc> },
    AcknowledgeStop { at: DateTime<Utc> },
    RemoveDaemon,
    /// Append an `archive/log` entry
    AppendLog { log: ArchiveLog },
}

crate::simple_display! {
    Edit {
        AddShell { .. } => "add shell",
        RemoveShell => "remove shell",
        AddDaemon { .. } => "add daemon",
        SetDir { .. } => "set daemon/dir",
        RetractDir => "retract daemon/dir",
        Start { .. } => "set daemon/started",
        Finish { .. } => "finish daemon",
        MarkKilled { .. } => "set daemon/killed",
        RequestStop { .. } => "request stop",
        AcknowledgeStop { .. } => "acknowledge stop",
        RemoveDaemon => "remove daemon",
        AppendLog { .. } => "append archive/log",
    }
}

/// Errors from applying an edit to a talk
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{edit}: talk has no daemon")]
    NoDaemon { edit: String },
    #[error("talk already has daemon {0}")]
    DaemonExists(DaemonId),
    #[error("daemon {0} already started")]
    AlreadyStarted(DaemonId),
    #[error("daemon {0} already finished")]
    AlreadyFinished(DaemonId),
    #[error("daemon {0} has no dir to retract")]
    NoDir(DaemonId),
    #[error("daemon {0} has no pending stop request")]
    NoStopRequest(DaemonId),
}

/// An ordered batch of edits, applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Edits(Vec<Edit>);

impl Edits {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, edit: Edit) {
        self.0.push(edit);
    }

    /// Builder-style push
    pub fn with(mut self, edit: Edit) -> Self {
        self.0.push(edit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.0.iter()
    }

    /// Comma-separated edit names for log lines
    pub fn summary(&self) -> String {
        self.0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

impl From<Edit> for Edits {
    fn from(edit: Edit) -> Self {
        Self(vec![edit])
    }
}

impl From<Vec<Edit>> for Edits {
    fn from(edits: Vec<Edit>) -> Self {
        Self(edits)
    }
}

impl FromIterator<Edit> for Edits {
    fn from_iter<I: IntoIterator<Item = Edit>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Edits {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Talk {
    /// Apply a batch. On error the talk is unchanged.
    pub fn apply(&mut self, edits: &Edits) -> Result<(), EditError> {
        let mut next = self.clone();
        for edit in edits {
            next.apply_one(edit)?;
        }
        *self = next;
        Ok(())
    }

    fn apply_one(&mut self, edit: &Edit) -> Result<(), EditError> {
        match edit {
            Edit::AddShell { shell } => self.shell = Some(shell.clone()),
            Edit::RemoveShell => self.shell = None,
            Edit::AddDaemon { id, title, script } => {
                if let Some(existing) = &self.daemon {
                    return Err(EditError::DaemonExists(existing.id.clone()));
                }
                self.daemon = Some(Daemon::new(id.clone(), title.clone(), script.clone()));
            }
            Edit::SetDir { dir } => {
                let daemon = self.daemon_mut(edit)?;
                if daemon.ended.is_some() {
                    return Err(EditError::AlreadyFinished(daemon.id.clone()));
                }
                daemon.dir = Some(dir.clone());
            }
            Edit::RetractDir => {
                let daemon = self.daemon_mut(edit)?;
                if daemon.dir.take().is_none() {
                    return Err(EditError::NoDir(daemon.id.clone()));
                }
            }
            Edit::Start { at } => {
                let daemon = self.daemon_mut(edit)?;
                if daemon.started.is_some() {
                    return Err(EditError::AlreadyStarted(daemon.id.clone()));
                }
                daemon.started = Some(*at);
            }
            Edit::Finish { outcome } => {
                let daemon = self.daemon_mut(edit)?;
                if daemon.ended.is_some() || daemon.code.is_some() {
                    return Err(EditError::AlreadyFinished(daemon.id.clone()));
                }
                daemon.ended = Some(outcome.ended);
                daemon.code = Some(outcome.code);
                daemon.tail = Some(outcome.tail.clone());
                daemon.highlights = outcome.highlights.clone();
            }
            Edit::MarkKilled { at } => {
                self.daemon_mut(edit)?.killed = Some(*at);
            }
            Edit::RequestStop { at } => {
                let daemon = self.daemon_mut(edit)?;
                if daemon.stop.is_none() {
                    daemon.stop = Some(StopRequest { requested: *at, issued: None });
                }
            }
            Edit::AcknowledgeStop { at } => {
                let daemon = self.daemon_mut(edit)?;
                match daemon.stop.as_mut() {
                    Some(stop) => stop.issued = Some(*at),
                    None => return Err(EditError::NoStopRequest(daemon.id.clone())),
                }
            }
            Edit::RemoveDaemon => {
                if self.daemon.take().is_none() {
                    return Err(EditError::NoDaemon { edit: edit.to_string() });
                }
            }
            Edit::AppendLog { log } => self.archive.push(log.clone()),
        }
        Ok(())
    }

    fn daemon_mut(&mut self, edit: &Edit) -> Result<&mut Daemon, EditError> {
        self.daemon.as_mut().ok_or_else(|| EditError::NoDaemon { edit: edit.to_string() })
    }
}

#[cfg(test)]
#[path = "edit_tests.rs"]
mod tests;
