// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The talk store contract

use crate::locks::TalkGuard;
use async_trait::async_trait;
use fm_core::{Talk, TalkName};
use thiserror::Error;

/// Errors that can occur in talk store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("talk not found: {0}")]
    NotFound(TalkName),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported talk file version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Durable storage of one document per talk.
///
/// A pulse holds the [`TalkGuard`] from [`TalkStore::lock`] across its
/// load/apply/save cycle, so saves for one talk never interleave, also
/// across processes sharing a file store. Saves made
/// by this process are visible to its next load.
#[async_trait]
pub trait TalkStore: Send + Sync + 'static {
    /// All stored talk names, sorted
    async fn names(&self) -> Result<Vec<TalkName>, StoreError>;

    async fn exists(&self, name: &TalkName) -> Result<bool, StoreError>;

    async fn load(&self, name: &TalkName) -> Result<Talk, StoreError>;

    async fn save(&self, talk: &Talk) -> Result<(), StoreError>;

    /// Wait for exclusive access to one talk
    async fn lock(&self, name: &TalkName) -> Result<TalkGuard, StoreError>;

    /// Sequence number for a newly created talk
    async fn next_number(&self) -> Result<u64, StoreError>;
}
