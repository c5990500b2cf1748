// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{applied, now};
use fm_core::test_support::{at_minute, TalkBuilder};

#[yare::parameterized(
    finished_without_dir = { TalkBuilder::new("a").finished(at_minute(0), at_minute(5), 2).build(), true },
    finished_with_dir = { TalkBuilder::new("a").dir("/tmp/fm.x").finished(at_minute(0), at_minute(5), 0).build(), false },
    running = { TalkBuilder::new("a").started(at_minute(0)).build(), false },
    idle = { TalkBuilder::new("a").build(), false },
)]
fn matches(talk: Talk, expected: bool) {
    assert_eq!(WipesDaemon::new().matches(&talk, now()), expected);
}

#[tokio::test]
async fn removes_the_daemon_and_keeps_the_shell() {
    let talk = TalkBuilder::new("a").shell().finished(at_minute(0), at_minute(5), 2).build();
    let edits = WipesDaemon::new().process(&talk, now()).await.unwrap();
    let next = applied(&talk, &edits);
    assert!(next.daemon.is_none());
    assert!(next.shell.is_some());
    assert!(next.archive.is_empty());
}
