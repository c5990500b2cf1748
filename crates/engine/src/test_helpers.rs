// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for agent and pulse tests

use crate::agent::AgentDeps;
use fm_adapters::{FakeArchiveStore, FakeReply, FakeShell, FakeShellProvider};
use fm_core::test_support::at_minute;
use fm_core::{Edits, Talk};
use std::sync::Arc;

/// Fakes behind an [`AgentDeps`], kept around for assertions.
pub(crate) struct Fixture {
    pub shells: FakeShellProvider,
    pub archive: FakeArchiveStore,
    pub deps: AgentDeps,
}

impl Fixture {
    pub fn new() -> Self {
        let shells = FakeShellProvider::new();
        let archive = FakeArchiveStore::default();
        let deps = AgentDeps::new(Arc::new(shells.clone()), Arc::new(archive.clone()));
        Self { shells, archive, deps }
    }

    pub fn shell(&self) -> &FakeShell {
        self.shells.shell()
    }

    /// A worker that creates `/tmp/fm.work`, has a finished run exiting 0
    /// and prints `output`.
    pub fn with_finished_worker(self, output: &str) -> Self {
        self.shell()
            .on("mktemp", FakeReply::ok("/tmp/fm.work\n"))
            .on("if [ -d", FakeReply::ok("present\n"))
            .on("ps -p", FakeReply::code(1))
            .on("cat status", FakeReply::ok("0\n"))
            .on("stat -c%s stdout", FakeReply::ok(output))
            .on("iconv", FakeReply::ok(output));
        self
    }
}

/// Apply `edits` to a copy of `talk`.
pub(crate) fn applied(talk: &Talk, edits: &Edits) -> Talk {
    let mut next = talk.clone();
    next.apply(edits).unwrap();
    next
}

/// Minute 0 of the fake clock, used as "now" when timing does not matter.
pub(crate) fn now() -> chrono::DateTime<chrono::Utc> {
    at_minute(0)
}
