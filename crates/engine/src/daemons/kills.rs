// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{daemon, dir};
use crate::agent::{Agent, AgentDeps};
use crate::error::AgentError;
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::ShellExt;
use fm_core::{format_elapsed, Edit, Edits, Field, Query, Talk};
use std::time::Duration;

/// Terminates a run that has been going for longer than the ceiling. Ends
/// records the outcome once the process is gone.
pub struct KillsDaemon {
    deps: AgentDeps,
    after: Duration,
    script: String,
}

impl KillsDaemon {
    pub fn new(deps: AgentDeps, after: Duration, script: String) -> Self {
        Self { deps, after, script }
    }
}

#[async_trait]
impl Agent for KillsDaemon {
    fn name(&self) -> &'static str {
        "kills"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Started),
            Query::lacks(Field::Code),
            Query::lacks(Field::Ended),
            Query::lacks(Field::Killed),
            Query::has(Field::Dir),
            Query::has(Field::Shell),
            Query::older_than(Field::Started, self.after),
        ]
    }

    async fn process(&self, talk: &Talk, now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let daemon = daemon(talk)?;
        let dir = dir(daemon)?;
        let shell = self.deps.shell(talk)?;
        let container = scripts::container_name(talk, daemon);
        tracing::warn!(
            talk = %talk.name,
            daemon = %daemon.id,
            ceiling = %format_elapsed(self.after.as_secs()),
            "run is over the time limit, killing"
        );
        // Killed is only recorded once the kill went through; a failed kill is
        // retried on the next pulse.
        shell.safe(&scripts::render(&self.script, dir, &container), b"").await?;
        Ok(Edit::MarkKilled { at: now }.into())
    }
}

#[cfg(test)]
#[path = "kills_tests.rs"]
mod tests;
