// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::agent::{Agent, AgentDeps};
use crate::error::AgentError;
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::{ShellError, ShellExt};
use fm_core::{Edit, Edits, Field, Query, Talk};
use std::time::Duration;

/// Removes a long-running daemon whose host name no longer resolves. A host
/// that refuses or times out may come back, so those errors are retried.
pub struct DismountDaemon {
    deps: AgentDeps,
    after: Duration,
}

impl DismountDaemon {
    pub fn new(deps: AgentDeps, after: Duration) -> Self {
        Self { deps, after }
    }

    async fn ping(&self, talk: &Talk) -> Result<(), ShellError> {
        let Some(info) = &talk.shell else {
            return Ok(());
        };
        let shell = self.deps.shells.connect(info)?;
        shell.quiet(scripts::ping()).await.map(|_| ())
    }
}

#[async_trait]
impl Agent for DismountDaemon {
    fn name(&self) -> &'static str {
        "dismount"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Started),
            Query::lacks(Field::Code),
            Query::lacks(Field::Ended),
            Query::older_than(Field::Started, self.after),
            Query::has(Field::ReachableShell),
        ]
    }

    async fn process(&self, talk: &Talk, _now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let host = talk.shell.as_ref().map(|s| s.address()).unwrap_or_default();
        match self.ping(talk).await {
            Ok(()) => {
                tracing::info!(talk = %talk.name, %host, "host is alive");
                Ok(Edits::new())
            }
            Err(ShellError::HostUnknown { reason, .. }) => {
                tracing::warn!(
                    talk = %talk.name,
                    %host,
                    %reason,
                    "host is gone, dropping the daemon"
                );
                Ok(Edit::RemoveDaemon.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "dismount_tests.rs"]
mod tests;
