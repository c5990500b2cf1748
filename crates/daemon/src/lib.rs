// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! foreman daemon library
//!
//! Configuration, logging, lifecycle and the `fmd` commands, exposed so
//! the binary stays a thin wrapper and specs can drive the same code.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod commands;
pub mod config;
pub mod env;
pub mod lifecycle;
pub mod logging;

pub use commands::{Cli, Command};
pub use config::{Config, ConfigError};
pub use lifecycle::{LifecycleError, Paths};
