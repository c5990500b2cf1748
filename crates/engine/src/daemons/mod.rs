// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon lifecycle agents.
//!
//! ```text
//!   daemon{script} ──Mkdir──▶ +dir ──Starts──▶ +started ──Ends──▶ +ended +code
//!                                                 │                    │
//!                         Kills / Stops (request) ┤         Archives ──┴─▶ archive/log
//!                   Drops (container lost) ───────┤            Wipes ────▶ (removed)
//!                 Dismount (host lost) ──▶ (removed)
//!             Sanitizes (dir gone) ──▶ -dir
//! ```

mod archives;
mod dismount;
mod drops;
mod ends;
mod kills;
mod mkdir;
mod sanitizes;
mod starts;
mod stops;
mod wipes;

pub use archives::ArchivesDaemon;
pub use dismount::DismountDaemon;
pub use drops::DropsDaemon;
pub use ends::EndsDaemon;
pub use kills::KillsDaemon;
pub use mkdir::MkdirDaemon;
pub use sanitizes::SanitizesDaemon;
pub use starts::StartsDaemon;
pub use stops::StopsDaemon;
pub use wipes::WipesDaemon;

use crate::agent::{Agent, AgentDeps};
use crate::config::LifecycleConfig;
use crate::error::AgentError;
use crate::output::Highlighter;
use fm_core::{Daemon, MarkerProtocol, Talk};

/// Build the lifecycle agents in evaluation order.
pub fn lifecycle_agents(
    deps: &AgentDeps,
    config: &LifecycleConfig,
) -> Result<Vec<Box<dyn Agent>>, regex::Error> {
    let highlighter = Highlighter::new(MarkerProtocol::new(&config.marker)?);
    let t = &config.timeouts;
    let s = &config.scripts;
    Ok(vec![
        Box::new(SanitizesDaemon::new(deps.clone())),
        Box::new(WipesDaemon::new()),
        Box::new(DismountDaemon::new(deps.clone(), t.dismount_after)),
        Box::new(DropsDaemon::new(deps.clone(), t.drop_after, s.inspect.clone())),
        Box::new(MkdirDaemon::new(deps.clone())),
        Box::new(StartsDaemon::new(deps.clone(), config.start.clone())),
        Box::new(KillsDaemon::new(deps.clone(), t.kill_after, s.kill.clone())),
        Box::new(StopsDaemon::new(deps.clone(), s.stop.clone())),
        Box::new(EndsDaemon::new(deps.clone(), s.check.clone(), highlighter)),
        Box::new(ArchivesDaemon::new(deps.clone())),
    ])
}

fn daemon(talk: &Talk) -> Result<&Daemon, AgentError> {
    talk.daemon.as_ref().ok_or(AgentError::Missing("daemon"))
}

fn dir(daemon: &Daemon) -> Result<&str, AgentError> {
    daemon.dir.as_deref().ok_or(AgentError::Missing("daemon/dir"))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
