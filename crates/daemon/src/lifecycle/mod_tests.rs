// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn paths_live_under_the_state_dir() {
    let paths = Paths::new("/state");
    assert_eq!(paths.lock_path, Path::new("/state/daemon.pid"));
    assert_eq!(paths.log_path, Path::new("/state/daemon.log"));
}

#[test]
fn lock_failure_names_the_running_daemon() {
    let err = LifecycleError::LockFailed(std::io::Error::other("busy"));
    assert_eq!(err.to_string(), "Failed to acquire lock: daemon already running?");
}
