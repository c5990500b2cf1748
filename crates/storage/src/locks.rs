// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-talk async mutual exclusion

use fm_core::TalkName;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map of talk name to its async mutex.
///
/// Entries that nobody holds or waits on are pruned on the next `lock`.
#[derive(Clone, Default)]
pub struct TalkLocks {
    inner: Arc<Mutex<HashMap<TalkName, Arc<AsyncMutex<()>>>>>,
}

/// Exclusive access to one talk, released on drop.
///
/// File-backed stores also hold an OS lock on the talk's lock file, so
/// other processes sharing the state directory are excluded too.
pub struct TalkGuard {
    name: TalkName,
    // Dropped before the in-process guard, so a waiter in this process
    // never finds the file still locked
    file: Option<File>,
    _guard: OwnedMutexGuard<()>,
}

impl TalkGuard {
    pub fn name(&self) -> &TalkName {
        &self.name
    }

    /// Keep `file` (already locked) until the guard drops
    pub(crate) fn hold_file(mut self, file: File) -> Self {
        self.file = Some(file);
        self
    }

    pub fn holds_file_lock(&self) -> bool {
        self.file.is_some()
    }
}

impl std::fmt::Debug for TalkGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TalkGuard").field("name", &self.name).finish()
    }
}

impl TalkLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, name: &TalkName) -> TalkGuard {
        let mutex = {
            let mut map = self.inner.lock();
            map.retain(|_, m| Arc::strong_count(m) > 1);
            Arc::clone(map.entry(name.clone()).or_default())
        };
        TalkGuard { name: name.clone(), file: None, _guard: mutex.lock_owned().await }
    }

    /// Non-blocking attempt, `None` while another holder exists
    pub fn try_lock(&self, name: &TalkName) -> Option<TalkGuard> {
        let mutex = Arc::clone(self.inner.lock().entry(name.clone()).or_default());
        let guard = mutex.try_lock_owned().ok()?;
        Some(TalkGuard { name: name.clone(), file: None, _guard: guard })
    }

    /// Number of names with a live mutex entry
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
