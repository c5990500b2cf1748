// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use fm_adapters::{FsArchiveStore, LocalShellProvider, ShellRouter, SshShellProvider};
use fm_core::SystemClock;
use fm_engine::{lifecycle_agents, AgentDeps, Pulse, Scheduler};
use fm_storage::FsTalkStore;
use fs2::FileExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{DaemonState, LifecycleError, Paths};
use crate::config::Config;

/// Take the daemon lock and record our PID.
pub fn startup(paths: &Paths) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&paths.state_dir)?;

    // Open without truncating: the file may hold a running daemon's PID
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&paths.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    info!(pid = std::process::id(), state_dir = %paths.state_dir.display(), "daemon started");
    Ok(DaemonState { paths: paths.clone(), lock_file, start_time: Instant::now() })
}

/// Wire the file store, shell router and archive into a pulse over the
/// lifecycle agents.
pub fn build_pulse(config: &Config, paths: &Paths) -> Result<Pulse<SystemClock>, LifecycleError> {
    let store = FsTalkStore::open(&paths.state_dir)?;
    let shells = ShellRouter::new(SshShellProvider::new(config.ssh_options()), LocalShellProvider::new());
    let archive = FsArchiveStore::new(config.archive_root(&paths.state_dir));
    let deps = AgentDeps::new(Arc::new(shells), Arc::new(archive));
    let agents = lifecycle_agents(&deps, &config.lifecycle()?)?;
    Ok(Pulse::new(Arc::new(store), agents, SystemClock))
}

/// Run the scheduler until `cancel` fires, then release the lock.
pub async fn run(config: &Config, paths: &Paths, cancel: CancellationToken) -> Result<(), LifecycleError> {
    let daemon = startup(paths)?;
    let result = match build_pulse(config, paths) {
        Ok(pulse) => {
            info!(agents = ?pulse.agent_names(), "lifecycle agents ready");
            Scheduler::new(pulse, config.scheduler()).run(cancel).await;
            Ok(())
        }
        Err(e) => Err(e),
    };
    daemon.shutdown();
    result
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
