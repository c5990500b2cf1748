// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{validate_key, ArchiveError, ArchiveStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Archive under a local directory, returning `file://` locators.
#[derive(Debug, Clone)]
pub struct FsArchiveStore {
    root: PathBuf,
}

impl FsArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArchiveStore for FsArchiveStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ArchiveError> {
        validate_key(key)?;
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("part");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        let absolute = tokio::fs::canonicalize(&path).await?;
        tracing::info!(key, content_type, bytes = bytes.len(), "archived");
        Ok(format!("file://{}", absolute.display()))
    }
}
