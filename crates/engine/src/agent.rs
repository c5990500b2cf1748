// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent contract.
//!
//! An agent is a precondition-gated transition over a talk document. The
//! pulse calls [`Agent::process`] only when [`Agent::matches`] holds, and
//! every agent's preconditions exclude the state its own edits produce, so a
//! second evaluation after a successful one is a no-op.

use crate::error::AgentError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::{ArchiveStore, Shell, ShellProvider};
use fm_core::{Edits, Query, Talk};
use std::sync::Arc;

#[async_trait]
pub trait Agent: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Conjunction of queries that must hold before `process` runs
    fn preconditions(&self) -> Vec<Query>;

    fn matches(&self, talk: &Talk, now: DateTime<Utc>) -> bool {
        Query::all(&self.preconditions(), talk, now)
    }

    /// Edits persisted before `process` starts, so a crash part-way through
    /// still leaves a trace in the document.
    fn reserve(&self, _talk: &Talk, _now: DateTime<Utc>) -> Edits {
        Edits::new()
    }

    /// Compute the edits for a matching talk. An error leaves the talk as is.
    async fn process(&self, talk: &Talk, now: DateTime<Utc>) -> Result<Edits, AgentError>;
}

/// External capabilities the lifecycle agents share
#[derive(Clone)]
pub struct AgentDeps {
    pub shells: Arc<dyn ShellProvider>,
    pub archive: Arc<dyn ArchiveStore>,
}

impl AgentDeps {
    pub fn new(shells: Arc<dyn ShellProvider>, archive: Arc<dyn ArchiveStore>) -> Self {
        Self { shells, archive }
    }

    /// Open a shell to the talk's worker
    pub fn shell(&self, talk: &Talk) -> Result<Arc<dyn Shell>, AgentError> {
        let info = talk.shell.as_ref().ok_or(AgentError::Missing("shell"))?;
        Ok(self.shells.connect(info)?)
    }
}
