// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::agent::{Agent, AgentDeps};
use crate::error::AgentError;
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::ShellExt;
use fm_core::{Edit, Edits, Field, Query, Talk};

/// Creates the remote working directory. The only agent that sets
/// `daemon/dir`.
pub struct MkdirDaemon {
    deps: AgentDeps,
}

impl MkdirDaemon {
    pub fn new(deps: AgentDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Agent for MkdirDaemon {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Shell),
            Query::has(Field::Script),
            Query::lacks(Field::Dir),
            Query::lacks(Field::Started),
        ]
    }

    async fn process(&self, talk: &Talk, _now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let shell = self.deps.shell(talk)?;
        let output = shell.safe(scripts::mkdir(), b"").await?;
        let dir = output.lines().map(str::trim).rfind(|l| !l.is_empty()).unwrap_or_default();
        if !dir.starts_with('/') {
            return Err(AgentError::Remote(format!("mktemp printed {output:?}")));
        }
        tracing::info!(talk = %talk.name, dir, "working directory created");
        Ok(Edit::SetDir { dir: dir.to_string() }.into())
    }
}

#[cfg(test)]
#[path = "mkdir_tests.rs"]
mod tests;
