// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{daemon, dir};
use crate::agent::{Agent, AgentDeps};
use crate::error::AgentError;
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::ShellExt;
use fm_core::{Edit, Edits, Field, Query, Talk};

/// Issues the stop command for a user-requested stop, once.
pub struct StopsDaemon {
    deps: AgentDeps,
    script: String,
}

impl StopsDaemon {
    pub fn new(deps: AgentDeps, script: String) -> Self {
        Self { deps, script }
    }
}

#[async_trait]
impl Agent for StopsDaemon {
    fn name(&self) -> &'static str {
        "stops"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Started),
            Query::lacks(Field::Code),
            Query::lacks(Field::Ended),
            Query::has(Field::StopRequested),
            Query::lacks(Field::StopIssued),
            Query::has(Field::Dir),
            Query::has(Field::Shell),
        ]
    }

    async fn process(&self, talk: &Talk, now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let daemon = daemon(talk)?;
        let dir = dir(daemon)?;
        let shell = self.deps.shell(talk)?;
        let container = scripts::container_name(talk, daemon);
        tracing::info!(talk = %talk.name, daemon = %daemon.id, %container, "stopping run on request");
        shell.quiet(&scripts::render(&self.script, dir, &container)).await?;
        Ok(Edit::AcknowledgeStop { at: now }.into())
    }
}

#[cfg(test)]
#[path = "stops_tests.rs"]
mod tests;
