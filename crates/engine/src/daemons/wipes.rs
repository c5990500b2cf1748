// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::agent::Agent;
use crate::error::AgentError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_core::{Edit, Edits, Field, Query, Talk};

/// Removes a finished daemon that has no working directory left to archive.
#[derive(Debug, Default)]
pub struct WipesDaemon;

impl WipesDaemon {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for WipesDaemon {
    fn name(&self) -> &'static str {
        "wipes"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Started),
            Query::has(Field::Code),
            Query::has(Field::Ended),
            Query::lacks(Field::Dir),
        ]
    }

    async fn process(&self, talk: &Talk, _now: DateTime<Utc>) -> Result<Edits, AgentError> {
        if let Some(daemon) = &talk.daemon {
            tracing::warn!(
                talk = %talk.name,
                daemon = %daemon.id,
                code = daemon.code,
                "wiping daemon without a working directory, its output is lost"
            );
        }
        Ok(Edit::RemoveDaemon.into())
    }
}

#[cfg(test)]
#[path = "wipes_tests.rs"]
mod tests;
