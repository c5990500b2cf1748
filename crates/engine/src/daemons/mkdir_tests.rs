// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{applied, now, Fixture};
use fm_adapters::FakeReply;
use fm_core::test_support::{at_minute, TalkBuilder};

#[yare::parameterized(
    fresh = { TalkBuilder::new("a").shell().script("make").build(), true },
    blank_script = { TalkBuilder::new("a").shell().script("  ").build(), false },
    no_shell = { TalkBuilder::new("a").script("make").build(), false },
    has_dir = { TalkBuilder::new("a").shell().script("make").dir("/tmp/x").build(), false },
    started = { TalkBuilder::new("a").shell().script("make").started(at_minute(0)).build(), false },
    no_daemon = { TalkBuilder::new("a").shell().build(), false },
)]
fn matches(talk: Talk, expected: bool) {
    assert_eq!(MkdirDaemon::new(Fixture::new().deps).matches(&talk, now()), expected);
}

#[tokio::test]
async fn records_the_created_directory() {
    let fx = Fixture::new();
    fx.shell().on("mktemp", FakeReply::ok("/tmp/foreman-Ab12Cd34\n"));
    let agent = MkdirDaemon::new(fx.deps.clone());
    let talk = TalkBuilder::new("a").shell().script("make").build();
    let next = applied(&talk, &agent.process(&talk, now()).await.unwrap());
    assert_eq!(next.daemon.as_ref().unwrap().dir.as_deref(), Some("/tmp/foreman-Ab12Cd34"));
    assert!(!agent.matches(&next, now()));
}

#[tokio::test]
async fn empty_output_is_an_error() {
    let fx = Fixture::new();
    fx.shell().on("mktemp", FakeReply::ok("\n"));
    let talk = TalkBuilder::new("a").shell().script("make").build();
    let err = MkdirDaemon::new(fx.deps).process(&talk, now()).await.unwrap_err();
    assert!(matches!(err, AgentError::Remote(_)));
}

#[tokio::test]
async fn failing_mktemp_is_an_error() {
    let fx = Fixture::new();
    fx.shell().on("mktemp", FakeReply::code(1));
    let talk = TalkBuilder::new("a").shell().script("make").build();
    let err = MkdirDaemon::new(fx.deps).process(&talk, now()).await.unwrap_err();
    assert!(matches!(err, AgentError::Shell(_)));
}
