// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell over the OpenSSH client.
//!
//! Each call runs `ssh ... login@host -- command` in batch mode. The private
//! key is written to a 0600 temp file that lives as long as the shell.

use super::{Shell, ShellError, ShellProvider};
use crate::subprocess::{exit_code, run_with_timeout, REMOTE_COMMAND_TIMEOUT, SSH_CONNECT_TIMEOUT};
use async_trait::async_trait;
use fm_core::ShellInfo;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// ssh reserves this exit code for its own failures
const SSH_FAILURE: i32 = 255;

/// Resolver messages ssh prints when the host name does not resolve
const HOST_UNKNOWN_MARKERS: [&str; 2] = ["Could not resolve hostname", "Name or service not known"];

/// Connection tuning shared by every [`SshShell`]
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// ssh binary, `ssh` from `PATH` by default
    pub program: PathBuf,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub keep_alive: Duration,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ssh"),
            connect_timeout: SSH_CONNECT_TIMEOUT,
            command_timeout: REMOTE_COMMAND_TIMEOUT,
            keep_alive: Duration::from_secs(30),
        }
    }
}

pub struct SshShell {
    host: String,
    port: u16,
    login: String,
    key: NamedTempFile,
    options: SshOptions,
}

impl SshShell {
    pub fn new(info: &ShellInfo, options: SshOptions) -> Result<Self, ShellError> {
        let mut key = NamedTempFile::with_prefix("fm-key-")?;
        key.write_all(info.key.as_bytes())?;
        if !info.key.ends_with('\n') {
            key.write_all(b"\n")?;
        }
        key.flush()?;
        Ok(Self {
            host: info.host.clone(),
            port: info.port,
            login: info.login.clone(),
            key,
            options,
        })
    }

    pub(crate) fn args(&self, command: &str) -> Vec<String> {
        let opt = |o: String| ["-o".to_string(), o];
        let mut args = vec![
            "-i".to_string(),
            self.key.path().display().to_string(),
            "-p".to_string(),
            self.port.to_string(),
        ];
        for o in [
            "BatchMode=yes".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "LogLevel=ERROR".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout.as_secs()),
            format!("ServerAliveInterval={}", self.options.keep_alive.as_secs()),
        ] {
            args.extend(opt(o));
        }
        args.push(format!("{}@{}", self.login, self.host));
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }
}

#[async_trait]
impl Shell for SshShell {
    async fn exec(
        &self,
        command: &str,
        stdin: &[u8],
        stdout: &mut (dyn Write + Send),
        stderr: &mut (dyn Write + Send),
    ) -> Result<i32, ShellError> {
        let mut cmd = Command::new(&self.options.program);
        cmd.args(self.args(command));
        let timeout = self.options.command_timeout;
        let started = std::time::Instant::now();
        let output = run_with_timeout(cmd, stdin, timeout, "ssh")
            .await
            .map_err(|e| ShellError::from_run(e, timeout))?;
        let code = exit_code(output.status);
        tracing::debug!(
            host = %self.host,
            code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ssh command finished"
        );

        if code == SSH_FAILURE {
            let reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(connection_error(&self.host, reason));
        }
        stdout.write_all(&output.stdout)?;
        stderr.write_all(&output.stderr)?;
        Ok(code)
    }
}

fn connection_error(host: &str, reason: String) -> ShellError {
    let host = host.to_string();
    if HOST_UNKNOWN_MARKERS.iter().any(|m| reason.contains(m)) {
        ShellError::HostUnknown { host, reason }
    } else {
        ShellError::Unreachable { host, reason }
    }
}

/// Opens an [`SshShell`] per connection descriptor.
#[derive(Debug, Clone, Default)]
pub struct SshShellProvider {
    options: SshOptions,
}

impl SshShellProvider {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }
}

impl ShellProvider for SshShellProvider {
    fn connect(&self, info: &ShellInfo) -> Result<Arc<dyn Shell>, ShellError> {
        if info.host.trim().is_empty() {
            return Err(ShellError::Unreachable {
                host: String::new(),
                reason: "no host in shell descriptor".to_string(),
            });
        }
        Ok(Arc::new(SshShell::new(info, self.options.clone())?))
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
