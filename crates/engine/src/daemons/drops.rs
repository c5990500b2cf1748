// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::daemon;
use crate::agent::{Agent, AgentDeps};
use crate::error::AgentError;
use crate::output::CONTAINER_LOST;
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::ShellExt;
use fm_core::{Edit, Edits, Field, Outcome, Query, Talk};
use std::time::Duration;

/// Finishes a long-running daemon whose container has disappeared. No status
/// file will ever appear for it, so Ends cannot.
pub struct DropsDaemon {
    deps: AgentDeps,
    after: Duration,
    inspect: String,
}

impl DropsDaemon {
    pub fn new(deps: AgentDeps, after: Duration, inspect: String) -> Self {
        Self { deps, after, inspect }
    }
}

#[async_trait]
impl Agent for DropsDaemon {
    fn name(&self) -> &'static str {
        "drops"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Started),
            Query::lacks(Field::Code),
            Query::lacks(Field::Ended),
            Query::older_than(Field::Started, self.after),
            Query::has(Field::Shell),
        ]
    }

    async fn process(&self, talk: &Talk, now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let daemon = daemon(talk)?;
        let alive = match daemon.dir.as_deref() {
            Some(dir) => {
                let shell = self.deps.shell(talk)?;
                let container = scripts::container_name(talk, daemon);
                let (_, output) =
                    shell.plain(&scripts::render(&self.inspect, dir, &container)).await?;
                !output.trim().is_empty()
            }
            None => false,
        };
        if alive {
            tracing::info!(talk = %talk.name, daemon = %daemon.id, "container is still there");
            return Ok(Edits::new());
        }
        tracing::warn!(talk = %talk.name, daemon = %daemon.id, "container lost");
        Ok(Edit::Finish { outcome: Outcome::new(now, CONTAINER_LOST, "container lost") }.into())
    }
}

#[cfg(test)]
#[path = "drops_tests.rs"]
mod tests;
