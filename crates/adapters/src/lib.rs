// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-adapters: remote shell and archive store capabilities

pub mod archive;
pub mod shell;
pub mod subprocess;

pub use archive::{ArchiveError, ArchiveStore, FsArchiveStore};
pub use shell::{
    escape, LocalShell, LocalShellProvider, Shell, ShellError, ShellExt, ShellProvider,
    ShellRouter, SshOptions, SshShell, SshShellProvider, LOCAL_HOST,
};

#[cfg(any(test, feature = "test-support"))]
pub use archive::FakeArchiveStore;
#[cfg(any(test, feature = "test-support"))]
pub use shell::{FakeReply, FakeShell, FakeShellProvider, ShellCall};
