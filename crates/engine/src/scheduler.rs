// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic pulses over every stored talk.
//!
//! Each tick lists the talks and spawns one pulse per talk, bounded by a
//! semaphore of `workers` permits. A talk whose previous pulse is still
//! running is skipped for that tick, so a hung remote call delays only its
//! own talk.

use crate::pulse::{Pulse, PulseReport};
use fm_core::{Clock, TalkName};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between ticks
    pub interval: Duration,
    /// Pulses allowed to run at once
    pub workers: usize,
    /// How long shutdown waits for in-flight pulses
    pub drain_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            workers: 8,
            drain_timeout: Duration::from_secs(30),
        }
    }
}

pub struct Scheduler<C: Clock> {
    pulse: Pulse<C>,
    config: SchedulerConfig,
    permits: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashSet<TalkName>>>,
}

/// Removes a talk from the in-flight set when its pulse task ends,
/// however it ends.
struct InFlight {
    set: Arc<Mutex<HashSet<TalkName>>>,
    name: TalkName,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set.lock().remove(&self.name);
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn new(pulse: Pulse<C>, config: SchedulerConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.workers.max(1)));
        Self { pulse, config, permits, in_flight: Arc::default() }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Talks with a pulse currently running
    pub fn in_flight(&self) -> Vec<TalkName> {
        let mut names: Vec<_> = self.in_flight.lock().iter().cloned().collect();
        names.sort();
        names
    }

    /// Tick until `cancel` fires, then drain in-flight pulses.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut tasks = JoinSet::new();
        tracing::info!(
            interval_ms = self.config.interval.as_millis() as u64,
            workers = self.config.workers,
            "scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => self.spawn_round(&mut tasks).await,
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => { log_joined(joined); }
            }
        }

        self.drain(tasks).await;
    }

    /// One full round over every talk, awaited to completion.
    pub async fn tick(&self) -> Vec<PulseReport> {
        let mut tasks = JoinSet::new();
        self.spawn_round(&mut tasks).await;
        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Some(report) = log_joined(joined) {
                reports.push(report);
            }
        }
        reports.sort_by(|a, b| a.talk.cmp(&b.talk));
        reports
    }

    async fn spawn_round(&self, tasks: &mut JoinSet<Option<PulseReport>>) {
        let names = match self.pulse.store().names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list talks");
                return;
            }
        };
        for name in names {
            if !self.in_flight.lock().insert(name.clone()) {
                tracing::debug!(talk = %name, "previous pulse still running, skipping");
                continue;
            }
            let marker = InFlight { set: Arc::clone(&self.in_flight), name: name.clone() };
            let pulse = self.pulse.clone();
            let permits = Arc::clone(&self.permits);
            tasks.spawn(async move {
                let _marker = marker;
                let _permit = permits.acquire_owned().await.ok()?;
                match pulse.run(&name).await {
                    Ok(report) => Some(report),
                    Err(e) => {
                        tracing::warn!(talk = %name, error = %e, "pulse failed");
                        None
                    }
                }
            });
        }
    }

    async fn drain(&self, mut tasks: JoinSet<Option<PulseReport>>) {
        if tasks.is_empty() {
            tracing::info!("scheduler stopped");
            return;
        }
        tracing::info!(pending = tasks.len(), "draining in-flight pulses");
        let drained = tokio::time::timeout(self.config.drain_timeout, async {
            while let Some(joined) = tasks.join_next().await {
                log_joined(joined);
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!(pending = tasks.len(), "drain timed out, aborting pulses");
            tasks.abort_all();
        }
        tracing::info!("scheduler stopped");
    }
}

fn log_joined(
    joined: Result<Option<PulseReport>, tokio::task::JoinError>,
) -> Option<PulseReport> {
    match joined {
        Ok(report) => report,
        Err(e) if e.is_cancelled() => None,
        Err(e) => {
            tracing::error!(error = %e, "pulse task panicked");
            None
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
