// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-engine: precondition-gated agents and the pulse loop that drives them

mod agent;
mod config;
pub mod daemons;
mod error;
pub mod output;
mod pulse;
mod scheduler;
pub mod scripts;

#[cfg(test)]
mod test_helpers;

pub use agent::{Agent, AgentDeps};
pub use config::{Asset, LifecycleConfig, Scripts, StartOptions, Timeouts};
pub use daemons::lifecycle_agents;
pub use error::{AgentError, PulseError};
pub use pulse::{Pulse, PulseReport};
pub use scheduler::{Scheduler, SchedulerConfig};
