// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote shell capability.
//!
//! # Module layout
//!
//! - [`ssh`]: OpenSSH client transport for provisioned workers
//! - [`local`]: `bash -c` on the daemon host
//! - [`router`]: picks one of the two per descriptor
//! - `fake`: scripted shell for tests (feature `test-support`)
//!
//! Agents talk to a [`Shell`] through the [`ShellExt`] helpers, which pick
//! strict or best-effort semantics per call.

mod local;
mod router;
mod ssh;

pub use local::{LocalShell, LocalShellProvider};
pub use router::{ShellRouter, LOCAL_HOST};
pub use ssh::{SshOptions, SshShell, SshShellProvider};

use crate::subprocess::RunError;
use async_trait::async_trait;
use fm_core::ShellInfo;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from shell operations
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("host {host} unreachable: {reason}")]
    Unreachable { host: String, reason: String },
    /// The host name no longer resolves
    #[error("host {host} unknown: {reason}")]
    HostUnknown { host: String, reason: String },
    #[error("shell I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("exit code {code} from `{command}`")]
    NonZero { code: i32, command: String },
    #[error("command timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ShellError {
    /// Covers both a refused or timed out connection and an unknown host
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ShellError::Unreachable { .. } | ShellError::HostUnknown { .. })
    }

    pub fn is_host_unknown(&self) -> bool {
        matches!(self, ShellError::HostUnknown { .. })
    }

    pub(crate) fn from_run(err: RunError, timeout: Duration) -> Self {
        match err {
            RunError::Spawn(e) => ShellError::Io(e),
            RunError::TimedOut => ShellError::Timeout(timeout),
        }
    }
}

/// A place to run commands.
#[async_trait]
pub trait Shell: Send + Sync + 'static {
    /// Run `command`, feeding `stdin`, writing its output to the sinks.
    /// Returns the exit code; non-zero is not an error at this level.
    async fn exec(
        &self,
        command: &str,
        stdin: &[u8],
        stdout: &mut (dyn Write + Send),
        stderr: &mut (dyn Write + Send),
    ) -> Result<i32, ShellError>;
}

/// Strict and best-effort conveniences over [`Shell::exec`].
#[async_trait]
pub trait ShellExt: Shell {
    /// Strict: fails with [`ShellError::NonZero`] on a non-zero exit.
    /// Returns stdout.
    async fn safe(&self, command: &str, stdin: &[u8]) -> Result<String, ShellError> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = self.exec(command, stdin, &mut stdout, &mut stderr).await?;
        if code != 0 {
            tracing::warn!(
                code,
                stderr = %String::from_utf8_lossy(&stderr).trim(),
                "remote command failed"
            );
            return Err(ShellError::NonZero { code, command: command.to_string() });
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    /// Any exit code; returns it with stdout followed by stderr.
    async fn plain(&self, command: &str) -> Result<(i32, String), ShellError> {
        self.plain_with_stdin(command, b"").await
    }

    /// [`ShellExt::plain`] feeding `stdin` to the command.
    async fn plain_with_stdin(&self, command: &str, stdin: &[u8]) -> Result<(i32, String), ShellError> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = self.exec(command, stdin, &mut stdout, &mut stderr).await?;
        stdout.extend_from_slice(&stderr);
        Ok((code, String::from_utf8_lossy(&stdout).into_owned()))
    }

    /// Best-effort: output goes to the log, a non-zero exit is only a warning.
    /// Transport errors still propagate.
    async fn quiet(&self, command: &str) -> Result<i32, ShellError> {
        self.quiet_with_stdin(command, b"").await
    }

    /// [`ShellExt::quiet`] feeding `stdin` to the command.
    async fn quiet_with_stdin(&self, command: &str, stdin: &[u8]) -> Result<i32, ShellError> {
        let (code, output) = self.plain_with_stdin(command, stdin).await?;
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            tracing::info!(target: "fm::remote", "{line}");
        }
        if code != 0 {
            tracing::warn!(code, "best-effort remote command exited non-zero");
        }
        Ok(code)
    }

    /// Strict write of `content` to a remote `path`.
    async fn upload(&self, path: &str, content: &[u8]) -> Result<(), ShellError> {
        self.safe(&format!("cat > {}", escape(path)), content).await.map(|_| ())
    }
}

impl<T: Shell + ?Sized> ShellExt for T {}

/// Single-quote a string for a POSIX shell.
pub fn escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Opens shells for a talk's `shell` descriptor.
pub trait ShellProvider: Send + Sync + 'static {
    fn connect(&self, info: &ShellInfo) -> Result<Arc<dyn Shell>, ShellError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeReply, FakeShell, FakeShellProvider, ShellCall};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
