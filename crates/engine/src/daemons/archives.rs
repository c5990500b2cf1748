// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{daemon, dir};
use crate::agent::{Agent, AgentDeps};
use crate::error::AgentError;
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::ShellExt;
use fm_core::{format_elapsed, ArchiveLog, Daemon, Edit, Edits, Field, Query, Talk};

/// Ships the full output of a finished run to the archive, cleans the
/// working directory and replaces the daemon with an `archive/log` entry.
pub struct ArchivesDaemon {
    deps: AgentDeps,
}

impl ArchivesDaemon {
    pub fn new(deps: AgentDeps) -> Self {
        Self { deps }
    }
}

/// `<title>: <code> (SUCCESS|FAILURE) in <elapsed>, <n> lines`
pub fn log_title(daemon: &Daemon, lines: usize) -> String {
    let code = daemon.code.unwrap_or(1);
    let verdict = if code == 0 { "SUCCESS" } else { "FAILURE" };
    let secs = daemon.duration().map(|d| d.num_seconds().max(0) as u64).unwrap_or(0);
    format!("{}: {code} ({verdict}) in {}, {lines} lines", daemon.title, format_elapsed(secs))
}

/// Archive key: `<yyyy>/<mm>/<daemon id>.txt`
pub fn log_key(daemon: &Daemon, now: DateTime<Utc>) -> String {
    format!("{}/{}.txt", now.format("%Y/%m"), daemon.id)
}

#[async_trait]
impl Agent for ArchivesDaemon {
    fn name(&self) -> &'static str {
        "archives"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Started),
            Query::has(Field::Code),
            Query::has(Field::Ended),
            Query::has(Field::Dir),
            Query::has(Field::Shell),
        ]
    }

    async fn process(&self, talk: &Talk, now: DateTime<Utc>) -> Result<Edits, AgentError> {
        let daemon = daemon(talk)?;
        let dir = dir(daemon)?;
        let shell = self.deps.shell(talk)?;
        let output = shell.safe(&scripts::fetch(dir), b"").await?;
        let lines = output.lines().count();
        let key = log_key(daemon, now);
        let uri = self.deps.archive.put(&key, output.into_bytes(), "text/plain").await?;
        if let Err(e) = shell.quiet(&scripts::cleanup(dir)).await {
            tracing::warn!(talk = %talk.name, dir, error = %e, "failed to clean the working directory");
        }
        let title = log_title(daemon, lines);
        tracing::info!(talk = %talk.name, daemon = %daemon.id, %uri, "{title}");
        let log = ArchiveLog { id: daemon.id.clone(), title, uri };
        Ok(Edits::from(vec![Edit::RemoveDaemon, Edit::AppendLog { log }]))
    }
}

#[cfg(test)]
#[path = "archives_tests.rs"]
mod tests;
