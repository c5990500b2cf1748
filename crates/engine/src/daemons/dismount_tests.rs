// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{applied, Fixture};
use fm_adapters::FakeReply;
use fm_core::test_support::{at_minute, TalkBuilder};

const TEN_DAYS: Duration = Duration::from_secs(10 * 24 * 60 * 60);

fn stale() -> Talk {
    TalkBuilder::new("a").shell().script("make").dir("/tmp/fm.x").started(at_minute(0)).build()
}

fn eleven_days() -> DateTime<Utc> {
    at_minute(11 * 24 * 60)
}

#[yare::parameterized(
    old_run = { stale(), eleven_days(), true },
    young_run = { stale(), at_minute(60), false },
    finished = { TalkBuilder::new("a").shell().finished(at_minute(0), at_minute(1), 0).build(), eleven_days(), false },
    no_shell = { TalkBuilder::new("a").started(at_minute(0)).build(), eleven_days(), false },
)]
fn matches(talk: Talk, at: DateTime<Utc>, expected: bool) {
    let fx = Fixture::new();
    assert_eq!(DismountDaemon::new(fx.deps, TEN_DAYS).matches(&talk, at), expected);
}

#[tokio::test]
async fn answering_host_keeps_the_daemon() {
    let fx = Fixture::new();
    fx.shell().on("pwd", FakeReply::ok("/home/build\n"));
    let edits = DismountDaemon::new(fx.deps.clone(), TEN_DAYS).process(&stale(), eleven_days()).await.unwrap();
    assert!(edits.is_empty());
    assert_eq!(fx.shell().commands(), vec!["pwd".to_string()]);
}

#[tokio::test]
async fn unknown_host_removes_the_daemon() {
    let fx = Fixture::new();
    fx.shell().set_host_unknown(true);
    let talk = stale();
    let edits = DismountDaemon::new(fx.deps, TEN_DAYS).process(&talk, eleven_days()).await.unwrap();
    let next = applied(&talk, &edits);
    assert!(next.daemon.is_none());
    assert!(next.archive.is_empty());
}

#[tokio::test]
async fn refused_connection_keeps_the_daemon() {
    let fx = Fixture::new();
    fx.shell().set_unreachable(true);
    let err = DismountDaemon::new(fx.deps, TEN_DAYS).process(&stale(), eleven_days()).await.unwrap_err();
    assert!(matches!(err, AgentError::Shell(ShellError::Unreachable { .. })), "{err}");
}

#[tokio::test]
async fn other_transport_errors_propagate() {
    let fx = Fixture::new();
    fx.shell().set_broken(Some("broken pipe"));
    let err = DismountDaemon::new(fx.deps, TEN_DAYS).process(&stale(), eleven_days()).await.unwrap_err();
    assert!(matches!(err, AgentError::Shell(_)));
}
