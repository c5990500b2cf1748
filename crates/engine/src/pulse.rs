// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One evaluation pass of every agent against one talk.
//!
//! The pulse holds the talk's lock for its whole duration. Agents run in
//! order; each agent sees the edits of the agents before it. Every
//! non-empty batch is persisted as soon as it is applied, so a crash loses
//! at most the agent that was running.

use crate::agent::Agent;
use crate::error::PulseError;
use fm_core::{Clock, Edits, Talk, TalkName};
use fm_storage::TalkStore;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one pulse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseReport {
    pub talk: TalkName,
    /// Agents whose edits (or reservation) were applied
    pub fired: Vec<&'static str>,
    /// Agents that matched but had nothing to change
    pub idle: Vec<&'static str>,
    /// Agents that failed, with the error text
    pub failed: Vec<(&'static str, String)>,
}

impl PulseReport {
    fn new(talk: TalkName) -> Self {
        Self { talk, fired: Vec::new(), idle: Vec::new(), failed: Vec::new() }
    }

    pub fn changed(&self) -> bool {
        !self.fired.is_empty()
    }
}

pub struct Pulse<C: Clock> {
    store: Arc<dyn TalkStore>,
    agents: Arc<[Box<dyn Agent>]>,
    clock: C,
}

impl<C: Clock> Clone for Pulse<C> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), agents: Arc::clone(&self.agents), clock: self.clock.clone() }
    }
}

impl<C: Clock> Pulse<C> {
    pub fn new(store: Arc<dyn TalkStore>, agents: Vec<Box<dyn Agent>>, clock: C) -> Self {
        Self { store, agents: agents.into(), clock }
    }

    pub fn store(&self) -> &Arc<dyn TalkStore> {
        &self.store
    }

    pub fn agent_names(&self) -> Vec<&'static str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// Run every matching agent against `name` once.
    pub async fn run(&self, name: &TalkName) -> Result<PulseReport, PulseError> {
        let started = Instant::now();
        let _guard = self.store.lock(name).await?;
        let mut talk = self.store.load(name).await?;
        let mut report = PulseReport::new(name.clone());

        for agent in self.agents.iter() {
            let now = self.clock.now();
            if !agent.matches(&talk, now) {
                continue;
            }

            let reservation = agent.reserve(&talk, now);
            if !reservation.is_empty() {
                if let Err(e) = self.commit(&mut talk, agent.name(), &reservation).await? {
                    report.failed.push((agent.name(), e));
                    continue;
                }
            }

            let edits = match agent.process(&talk, now).await {
                Ok(edits) => edits,
                Err(e) => {
                    tracing::warn!(talk = %name, agent = agent.name(), error = %e, "agent failed");
                    report.failed.push((agent.name(), e.to_string()));
                    continue;
                }
            };
            if edits.is_empty() {
                if reservation.is_empty() {
                    tracing::debug!(talk = %name, agent = agent.name(), "agent idle");
                    report.idle.push(agent.name());
                } else {
                    tracing::info!(
                        talk = %name,
                        agent = agent.name(),
                        edits = %reservation.summary(),
                        "agent fired"
                    );
                    report.fired.push(agent.name());
                }
                continue;
            }
            match self.commit(&mut talk, agent.name(), &edits).await? {
                Ok(()) => {
                    tracing::info!(
                        talk = %name,
                        agent = agent.name(),
                        edits = %edits.summary(),
                        "agent fired"
                    );
                    report.fired.push(agent.name());
                }
                Err(e) => report.failed.push((agent.name(), e)),
            }
        }

        tracing::debug!(
            talk = %name,
            fired = report.fired.len(),
            failed = report.failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pulse finished"
        );
        Ok(report)
    }

    /// Apply and persist a batch. A rejected batch leaves `talk` unchanged
    /// and is returned as the inner error; store failures abort the pulse.
    async fn commit(
        &self,
        talk: &mut Talk,
        agent: &'static str,
        edits: &Edits,
    ) -> Result<Result<(), String>, PulseError> {
        if let Err(e) = talk.apply(edits) {
            tracing::warn!(talk = %talk.name, agent, error = %e, "edit batch rejected");
            return Ok(Err(e.to_string()));
        }
        self.store.save(talk).await?;
        Ok(Ok(()))
    }
}

#[cfg(test)]
#[path = "pulse_tests.rs"]
mod tests;
