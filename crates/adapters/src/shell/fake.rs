// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted shell for tests.
//!
//! Replies are matched by command substring; the most recently added rule
//! wins. Unmatched commands succeed with empty output.

use super::{Shell, ShellError, ShellProvider};
use async_trait::async_trait;
use fm_core::ShellInfo;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Recorded command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCall {
    pub command: String,
    pub stdin: Vec<u8>,
}

impl ShellCall {
    pub fn stdin_str(&self) -> String {
        String::from_utf8_lossy(&self.stdin).into_owned()
    }
}

/// Scripted outcome of a matching command
#[derive(Debug, Clone)]
pub enum FakeReply {
    Output { code: i32, stdout: String, stderr: String },
    /// Transport failure, surfaces as [`ShellError::Io`]
    Io(String),
    /// Connection refused
    Unreachable,
    /// Host name does not resolve
    HostUnknown,
}

impl FakeReply {
    pub fn ok(stdout: impl Into<String>) -> Self {
        FakeReply::Output { code: 0, stdout: stdout.into(), stderr: String::new() }
    }

    pub fn code(code: i32) -> Self {
        FakeReply::Output { code, stdout: String::new(), stderr: String::new() }
    }
}

#[derive(Default)]
struct FakeShellState {
    rules: Vec<(String, FakeReply)>,
    calls: Vec<ShellCall>,
    unreachable: bool,
    host_unknown: bool,
    broken: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeShell {
    inner: Arc<Mutex<FakeShellState>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every command containing `pattern`
    pub fn on(&self, pattern: &str, reply: FakeReply) -> &Self {
        self.inner.lock().rules.push((pattern.to_string(), reply));
        self
    }

    /// Forget every rule containing `pattern`
    pub fn forget(&self, pattern: &str) -> &Self {
        self.inner.lock().rules.retain(|(p, _)| p != pattern);
        self
    }

    /// Every command fails as if the connection were refused
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unreachable = unreachable;
    }

    /// Every command fails as if the host name no longer resolved
    pub fn set_host_unknown(&self, unknown: bool) {
        self.inner.lock().host_unknown = unknown;
    }

    /// Every command fails with an I/O error
    pub fn set_broken(&self, reason: Option<&str>) {
        self.inner.lock().broken = reason.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<ShellCall> {
        self.inner.lock().calls.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.inner.lock().calls.iter().map(|c| c.command.clone()).collect()
    }

    /// Recorded calls whose command contains `pattern`
    pub fn calls_matching(&self, pattern: &str) -> Vec<ShellCall> {
        self.inner.lock().calls.iter().filter(|c| c.command.contains(pattern)).cloned().collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }
}

#[async_trait]
impl Shell for FakeShell {
    async fn exec(
        &self,
        command: &str,
        stdin: &[u8],
        stdout: &mut (dyn Write + Send),
        stderr: &mut (dyn Write + Send),
    ) -> Result<i32, ShellError> {
        let reply = {
            let mut state = self.inner.lock();
            state.calls.push(ShellCall { command: command.to_string(), stdin: stdin.to_vec() });
            if state.host_unknown {
                FakeReply::HostUnknown
            } else if state.unreachable {
                FakeReply::Unreachable
            } else if let Some(reason) = &state.broken {
                FakeReply::Io(reason.clone())
            } else {
                state
                    .rules
                    .iter()
                    .rev()
                    .find(|(pattern, _)| command.contains(pattern.as_str()))
                    .map(|(_, reply)| reply.clone())
                    .unwrap_or_else(|| FakeReply::ok(""))
            }
        };
        match reply {
            FakeReply::Output { code, stdout: out, stderr: err } => {
                stdout.write_all(out.as_bytes())?;
                stderr.write_all(err.as_bytes())?;
                Ok(code)
            }
            FakeReply::Io(reason) => Err(ShellError::Io(std::io::Error::other(reason))),
            FakeReply::Unreachable => Err(ShellError::Unreachable {
                host: "fake".to_string(),
                reason: "connection refused".to_string(),
            }),
            FakeReply::HostUnknown => Err(ShellError::HostUnknown {
                host: "fake".to_string(),
                reason: "Could not resolve hostname fake".to_string(),
            }),
        }
    }
}

/// Hands out the same [`FakeShell`] for every descriptor and records hosts.
#[derive(Clone, Default)]
pub struct FakeShellProvider {
    shell: FakeShell,
    connects: Arc<Mutex<Vec<String>>>,
}

impl FakeShellProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(shell: FakeShell) -> Self {
        Self { shell, connects: Arc::default() }
    }

    pub fn shell(&self) -> &FakeShell {
        &self.shell
    }

    /// Hosts passed to `connect`, in order
    pub fn connects(&self) -> Vec<String> {
        self.connects.lock().clone()
    }
}

impl ShellProvider for FakeShellProvider {
    fn connect(&self, info: &ShellInfo) -> Result<Arc<dyn Shell>, ShellError> {
        self.connects.lock().push(info.host.clone());
        Ok(Arc::new(self.shell.clone()))
    }
}
