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

/// Retracts `daemon/dir` when the remote directory no longer exists, so
/// archival can never fire on it.
pub struct SanitizesDaemon {
    deps: AgentDeps,
}

impl SanitizesDaemon {
    pub fn new(deps: AgentDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Agent for SanitizesDaemon {
    fn name(&self) -> &'static str {
        "sanitizes"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![Query::has(Field::Dir), Query::lacks(Field::Ended), Query::has(Field::Shell)]
    }

    async fn process(&self, talk: &Talk, _now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let dir = dir(daemon(talk)?)?;
        let shell = self.deps.shell(talk)?;
        let answer = shell.safe(&scripts::dir_exists(dir), b"").await?;
        match answer.trim() {
            "present" => Ok(Edits::new()),
            "absent" => {
                tracing::warn!(talk = %talk.name, dir, "working directory is gone, retracting");
                Ok(Edit::RetractDir.into())
            }
            other => Err(AgentError::Remote(format!("directory check printed {other:?}"))),
        }
    }
}

#[cfg(test)]
#[path = "sanitizes_tests.rs"]
mod tests;
