// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory talk store for tests and ephemeral runs

use crate::locks::{TalkGuard, TalkLocks};
use crate::store::{StoreError, TalkStore};
use async_trait::async_trait;
use fm_core::{Talk, TalkName};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryTalkStore {
    talks: Arc<Mutex<BTreeMap<TalkName, Talk>>>,
    locks: TalkLocks,
}

impl MemoryTalkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert talks up front
    pub fn with_talks(talks: impl IntoIterator<Item = Talk>) -> Self {
        let store = Self::new();
        {
            let mut map = store.talks.lock();
            for talk in talks {
                map.insert(talk.name.clone(), talk);
            }
        }
        store
    }

    /// Current copy of a talk, if stored
    pub fn get(&self, name: &str) -> Option<Talk> {
        self.talks.lock().get(name).cloned()
    }
}

#[async_trait]
impl TalkStore for MemoryTalkStore {
    async fn names(&self) -> Result<Vec<TalkName>, StoreError> {
        Ok(self.talks.lock().keys().cloned().collect())
    }

    async fn exists(&self, name: &TalkName) -> Result<bool, StoreError> {
        Ok(self.talks.lock().contains_key(name))
    }

    async fn load(&self, name: &TalkName) -> Result<Talk, StoreError> {
        self.talks.lock().get(name).cloned().ok_or_else(|| StoreError::NotFound(name.clone()))
    }

    async fn save(&self, talk: &Talk) -> Result<(), StoreError> {
        self.talks.lock().insert(talk.name.clone(), talk.clone());
        Ok(())
    }

    async fn lock(&self, name: &TalkName) -> Result<TalkGuard, StoreError> {
        Ok(self.locks.lock(name).await)
    }

    async fn next_number(&self) -> Result<u64, StoreError> {
        Ok(self.talks.lock().values().map(|t| t.number).max().unwrap_or(0) + 1)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
