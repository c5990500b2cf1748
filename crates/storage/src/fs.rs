// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed talk store.
//!
//! Each talk lives in `<root>/talks/<escaped-name>.json`, wrapped in a
//! versioned envelope. Saves write a temp file and rename it over the
//! target; the previous content is kept in rotating `.bak` files.

use crate::locks::{TalkGuard, TalkLocks};
use crate::store::{StoreError, TalkStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fm_core::{Talk, TalkName};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current talk file schema version
pub const CURRENT_TALK_VERSION: u32 = 1;

const MAX_BAK_FILES: u32 = 3;

/// Poll interval while another process holds a talk's lock file
const LOCK_RETRY: Duration = Duration::from_millis(25);

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    #[serde(rename = "v")]
    version: u32,
    saved_at: DateTime<Utc>,
    talk: &'a Talk,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "v")]
    version: u32,
    talk: Talk,
}

#[derive(Clone)]
pub struct FsTalkStore {
    dir: PathBuf,
    locks: TalkLocks,
}

impl FsTalkStore {
    /// Open (creating if needed) the store under `root/talks`
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = root.as_ref().join("talks");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, locks: TalkLocks::new() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &TalkName) -> PathBuf {
        self.dir.join(format!("{}.json", escape_name(name.as_str())))
    }

    /// Lock file shared by every process using this directory
    pub fn lock_path_for(&self, name: &TalkName) -> PathBuf {
        self.dir.join(format!("{}.lock", escape_name(name.as_str())))
    }
}

#[async_trait]
impl TalkStore for FsTalkStore {
    async fn names(&self) -> Result<Vec<TalkName>, StoreError> {
        let dir = self.dir.clone();
        blocking(move || list_names(&dir)).await
    }

    async fn exists(&self, name: &TalkName) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(self.path_for(name)).await?)
    }

    async fn load(&self, name: &TalkName) -> Result<Talk, StoreError> {
        let path = self.path_for(name);
        let name = name.clone();
        blocking(move || read_talk(&path, &name)).await
    }

    async fn save(&self, talk: &Talk) -> Result<(), StoreError> {
        let path = self.path_for(&talk.name);
        let bytes = serde_json::to_vec_pretty(&EnvelopeRef {
            version: CURRENT_TALK_VERSION,
            saved_at: Utc::now(),
            talk,
        })?;
        blocking(move || write_atomic(&path, &bytes)).await?;
        tracing::debug!(talk = %talk.name, "talk saved");
        Ok(())
    }

    async fn lock(&self, name: &TalkName) -> Result<TalkGuard, StoreError> {
        let guard = self.locks.lock(name).await;
        let path = self.lock_path_for(name);
        let file = blocking(move || Ok(open_lock_file(&path)?)).await?;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(guard.hold_file(file)),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    tokio::time::sleep(LOCK_RETRY).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn next_number(&self) -> Result<u64, StoreError> {
        let mut max = 0;
        for name in self.names().await? {
            max = max.max(self.load(&name).await?.number);
        }
        Ok(max + 1)
    }
}

async fn blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}

fn list_names(dir: &Path) -> Result<Vec<TalkName>, StoreError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match unescape_name(stem) {
            Some(name) => names.push(TalkName::new(name)),
            None => tracing::warn!(path = %path.display(), "skipping talk file with bad name"),
        }
    }
    names.sort();
    Ok(names)
}

fn read_talk(path: &Path, name: &TalkName) -> Result<Talk, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(name.clone()));
        }
        Err(e) => return Err(e.into()),
    };
    let envelope: Envelope = serde_json::from_slice(&bytes)?;
    if envelope.version > CURRENT_TALK_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: envelope.version,
            supported: CURRENT_TALK_VERSION,
        });
    }
    Ok(envelope.talk)
}

fn open_lock_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().read(true).write(true).create(true).truncate(false).open(path)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    if path.exists() {
        let bak = rotate_bak_path(path);
        if let Err(e) = fs::copy(path, &bak) {
            tracing::warn!(path = %bak.display(), error = %e, "failed to write talk backup");
        }
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("json.bak")
        } else {
            path.with_extension(format!("json.bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Reversible file-name encoding: `[A-Za-z0-9_-]` and inner dots pass
/// through, every other byte becomes `%XX`.
pub(crate) fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, b) in name.bytes().enumerate() {
        let plain = b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || (b == b'.' && i > 0);
        if plain {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

pub(crate) fn unescape_name(escaped: &str) -> Option<String> {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = escaped.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
