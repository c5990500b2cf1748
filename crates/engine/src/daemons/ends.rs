// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::daemon;
use crate::agent::{Agent, AgentDeps};
use crate::error::AgentError;
use crate::output::{self, Highlighter, NO_STATUS};
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::ShellExt;
use fm_core::{Edit, Edits, Field, Outcome, Query, Talk};

/// Detects a finished run and records its exit code, output tail and
/// highlights.
pub struct EndsDaemon {
    deps: AgentDeps,
    check: String,
    highlighter: Highlighter,
}

impl EndsDaemon {
    pub fn new(deps: AgentDeps, check: String, highlighter: Highlighter) -> Self {
        Self { deps, check, highlighter }
    }
}

#[async_trait]
impl Agent for EndsDaemon {
    fn name(&self) -> &'static str {
        "ends"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![Query::has(Field::Started), Query::lacks(Field::Code), Query::lacks(Field::Ended)]
    }

    async fn process(&self, talk: &Talk, now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let daemon = daemon(talk)?;
        let Some(dir) = daemon.dir.as_deref() else {
            tracing::warn!(talk = %talk.name, daemon = %daemon.id, "run has no working directory");
            let outcome = Outcome::new(now, NO_STATUS, "working directory is gone");
            return Ok(Edit::Finish { outcome }.into());
        };
        let shell = self.deps.shell(talk)?;
        let container = scripts::container_name(talk, daemon);
        let (running, _) = shell.plain(&scripts::render(&self.check, dir, &container)).await?;
        if running == 0 {
            tracing::debug!(talk = %talk.name, daemon = %daemon.id, "still running");
            return Ok(Edits::new());
        }
        let code = output::parse_status(&shell.safe(&scripts::status(dir), b"").await?);
        let stdout = shell.safe(&scripts::stdout(dir), b"").await?;
        let highlights = self.highlighter.extract(output::split_lines(&stdout));
        tracing::info!(talk = %talk.name, daemon = %daemon.id, code, "run finished");
        let outcome = Outcome::new(now, code, output::tail(&stdout)).with_highlights(highlights);
        Ok(Edit::Finish { outcome }.into())
    }
}

#[cfg(test)]
#[path = "ends_tests.rs"]
mod tests;
