// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{daemon, dir};
use crate::agent::{Agent, AgentDeps};
use crate::config::StartOptions;
use crate::error::AgentError;
use crate::output::PROVISIONING_FAILED;
use crate::scripts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_adapters::ShellExt;
use fm_core::{Edit, Edits, Field, Outcome, Query, Talk};

/// Uploads the run wrapper and its assets, then launches it detached.
///
/// `daemon/started` is reserved before any remote work, so a crash during
/// provisioning cannot launch the same run twice. Provisioning failures
/// finish the daemon with code 128 instead of failing the pulse.
pub struct StartsDaemon {
    deps: AgentDeps,
    options: StartOptions,
}

impl StartsDaemon {
    pub fn new(deps: AgentDeps, options: StartOptions) -> Self {
        Self { deps, options }
    }

    async fn provision(&self, talk: &Talk) -> Result<(), AgentError> {
        let daemon = daemon(talk)?;
        let dir = dir(daemon)?;
        let shell = self.deps.shell(talk)?;
        for asset in &self.options.assets {
            shell.upload(&format!("{dir}/{}", asset.name), &asset.content).await?;
        }
        if let Some(keyring) = &self.options.keyring {
            let code = shell.quiet_with_stdin(scripts::gpg_import(), keyring).await?;
            if code != 0 {
                tracing::warn!(talk = %talk.name, code, "keyring import failed");
            }
        }
        let container = scripts::container_name(talk, daemon);
        let wrapper = scripts::run_wrapper(&daemon.script, &container, &self.options.banner);
        shell.upload(&format!("{dir}/run.sh"), wrapper.as_bytes()).await?;
        shell.safe(&scripts::launch(dir), b"").await?;
        tracing::info!(talk = %talk.name, daemon = %daemon.id, dir, %container, "run launched");
        Ok(())
    }
}

#[async_trait]
impl Agent for StartsDaemon {
    fn name(&self) -> &'static str {
        "starts"
    }

    fn preconditions(&self) -> Vec<Query> {
        vec![
            Query::has(Field::Shell),
            Query::has(Field::Script),
            Query::has(Field::Dir),
            Query::lacks(Field::Started),
            Query::lacks(Field::Ended),
        ]
    }

    fn reserve(&self, _talk: &Talk, now: DateTime<Utc>) -> Edits {
        Edit::Start { at: now }.into()
    }

    async fn process(&self, talk: &Talk, now: DateTime<Utc>) -> Result<Edits, AgentError> {
        match self.provision(talk).await {
            Ok(()) => Ok(Edits::new()),
            Err(e) => {
                tracing::error!(talk = %talk.name, error = %e, "failed to start the run");
                let outcome = Outcome::new(now, PROVISIONING_FAILED, e.to_string());
                Ok(Edit::Finish { outcome }.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "starts_tests.rs"]
mod tests;
