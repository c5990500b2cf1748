// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child process helpers shared by the shell adapters

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Upper bound for a single remote command (status checks, uploads, fetches)
pub const REMOTE_COMMAND_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Upper bound for the ssh handshake
pub const SSH_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum RunError {
    Spawn(std::io::Error),
    TimedOut,
}

/// Run `cmd` to completion, feeding `stdin` and capturing stdout/stderr.
///
/// The child is killed when the timeout elapses.
pub async fn run_with_timeout(
    mut cmd: Command,
    stdin: &[u8],
    timeout: Duration,
    label: &str,
) -> Result<Output, RunError> {
    cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    let mut child = cmd.spawn().map_err(RunError::Spawn)?;

    let writer = child.stdin.take().map(|mut pipe| {
        let data = stdin.to_vec();
        tokio::spawn(async move {
            if let Err(e) = pipe.write_all(&data).await {
                tracing::debug!(error = %e, "stdin closed early");
            }
        })
    });

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => {
            if let Some(writer) = writer {
                let _ = writer.await;
            }
            result.map_err(RunError::Spawn)
        }
        Err(_) => {
            tracing::warn!(label, timeout_secs = timeout.as_secs(), "command timed out");
            Err(RunError::TimedOut)
        }
    }
}

/// Exit code of a finished process; signal deaths map to `128 + signal`.
pub fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
