// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell that runs commands on the daemon host itself

use super::{Shell, ShellError, ShellProvider};
use crate::subprocess::{exit_code, run_with_timeout, REMOTE_COMMAND_TIMEOUT};
use async_trait::async_trait;
use fm_core::ShellInfo;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct LocalShell {
    timeout: Duration,
}

impl Default for LocalShell {
    fn default() -> Self {
        Self { timeout: REMOTE_COMMAND_TIMEOUT }
    }
}

impl LocalShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Shell for LocalShell {
    async fn exec(
        &self,
        command: &str,
        stdin: &[u8],
        stdout: &mut (dyn Write + Send),
        stderr: &mut (dyn Write + Send),
    ) -> Result<i32, ShellError> {
        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(command);
        let output = run_with_timeout(cmd, stdin, self.timeout, "bash")
            .await
            .map_err(|e| ShellError::from_run(e, self.timeout))?;
        stdout.write_all(&output.stdout)?;
        stderr.write_all(&output.stderr)?;
        Ok(exit_code(output.status))
    }
}

/// Ignores connection fields and always hands out a [`LocalShell`].
#[derive(Debug, Clone, Default)]
pub struct LocalShellProvider {
    shell: LocalShell,
}

impl LocalShellProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShellProvider for LocalShellProvider {
    fn connect(&self, _info: &ShellInfo) -> Result<Arc<dyn Shell>, ShellError> {
        Ok(Arc::new(self.shell.clone()))
    }
}
