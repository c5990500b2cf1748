// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn bash(script: &str) -> Command {
    let mut cmd = Command::new("bash");
    cmd.arg("-c").arg(script);
    cmd
}

#[tokio::test]
async fn captures_output_and_feeds_stdin() {
    let out = run_with_timeout(bash("cat; echo err >&2"), b"hello", Duration::from_secs(5), "t")
        .await
        .unwrap();
    assert_eq!(out.stdout, b"hello");
    assert_eq!(out.stderr, b"err\n");
    assert_eq!(exit_code(out.status), 0);
}

#[tokio::test]
async fn reports_exit_code() {
    let out = run_with_timeout(bash("exit 3"), b"", Duration::from_secs(5), "t").await.unwrap();
    assert_eq!(exit_code(out.status), 3);
}

#[tokio::test]
async fn times_out_long_commands() {
    let err = run_with_timeout(bash("sleep 5"), b"", Duration::from_millis(100), "t")
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::TimedOut));
}

#[tokio::test]
async fn missing_binary_is_spawn_error() {
    let cmd = Command::new("/nonexistent/fm-no-such-binary");
    let err = run_with_timeout(cmd, b"", Duration::from_secs(1), "t").await.unwrap_err();
    assert!(matches!(err, RunError::Spawn(_)));
}
