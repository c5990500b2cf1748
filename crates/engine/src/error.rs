// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types

use fm_adapters::{ArchiveError, ShellError};
use fm_core::EditError;
use fm_storage::StoreError;
use thiserror::Error;

/// Why an agent could not finish its work. The talk is left unchanged and
/// the agent is evaluated again on the next pulse.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("edit rejected: {0}")]
    Edit(#[from] EditError),
    #[error("shell error: {0}")]
    Shell(#[from] ShellError),
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("talk has no {0}")]
    Missing(&'static str),
    #[error("unexpected remote output: {0}")]
    Remote(String),
}

/// Errors that abort a whole pulse
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
