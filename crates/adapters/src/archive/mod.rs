// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for finished run output

mod fs;

pub use fs::FsArchiveStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid archive key: {0}")]
    InvalidKey(String),
    #[error("archive store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value object store that hands back a durable locator.
#[async_trait]
pub trait ArchiveStore: Send + Sync + 'static {
    /// Store `bytes` under `key` and return its URI
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, ArchiveError>;
}

/// Reject keys that could escape a root directory or bucket prefix.
pub(crate) fn validate_key(key: &str) -> Result<(), ArchiveError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(ArchiveError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{validate_key, ArchiveError, ArchiveStore};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeArchiveState {
        objects: BTreeMap<String, (Vec<u8>, String)>,
        unavailable: bool,
    }

    /// In-memory archive returning `mem://<bucket>/<key>` locators
    #[derive(Clone)]
    pub struct FakeArchiveStore {
        bucket: String,
        inner: Arc<Mutex<FakeArchiveState>>,
    }

    impl Default for FakeArchiveStore {
        fn default() -> Self {
            Self::new("logs")
        }
    }

    impl FakeArchiveStore {
        pub fn new(bucket: &str) -> Self {
            Self { bucket: bucket.to_string(), inner: Arc::default() }
        }

        /// Fail every `put` while set
        pub fn set_unavailable(&self, unavailable: bool) {
            self.inner.lock().unavailable = unavailable;
        }

        pub fn keys(&self) -> Vec<String> {
            self.inner.lock().objects.keys().cloned().collect()
        }

        pub fn get(&self, key: &str) -> Option<String> {
            self.inner
                .lock()
                .objects
                .get(key)
                .map(|(bytes, _)| String::from_utf8_lossy(bytes).into_owned())
        }

        pub fn content_type(&self, key: &str) -> Option<String> {
            self.inner.lock().objects.get(key).map(|(_, ct)| ct.clone())
        }
    }

    #[async_trait]
    impl ArchiveStore for FakeArchiveStore {
        async fn put(
            &self,
            key: &str,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<String, ArchiveError> {
            validate_key(key)?;
            let mut state = self.inner.lock();
            if state.unavailable {
                return Err(ArchiveError::Unavailable("bucket offline".to_string()));
            }
            state.objects.insert(key.to_string(), (bytes, content_type.to_string()));
            Ok(format!("mem://{}/{}", self.bucket, key))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeArchiveStore;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
