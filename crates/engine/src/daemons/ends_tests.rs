// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::Scripts;
use crate::test_helpers::{applied, Fixture};
use fm_adapters::FakeReply;
use fm_core::test_support::{at_minute, TalkBuilder};
use fm_core::MarkerProtocol;

fn agent(fx: &Fixture) -> EndsDaemon {
    let highlighter = Highlighter::new(MarkerProtocol::new("FOREMAN").unwrap());
    EndsDaemon::new(fx.deps.clone(), Scripts::default().check, highlighter)
}

fn running() -> Talk {
    TalkBuilder::new("a").shell().script("make").dir("/tmp/fm.x").started(at_minute(0)).build()
}

#[yare::parameterized(
    running = { super::running(), true },
    running_without_dir = { TalkBuilder::new("a").shell().started(at_minute(0)).build(), true },
    not_started = { TalkBuilder::new("a").shell().dir("/tmp/x").build(), false },
    finished = { TalkBuilder::new("a").shell().dir("/tmp/x").finished(at_minute(0), at_minute(1), 0).build(), false },
)]
fn matches(talk: Talk, expected: bool) {
    assert_eq!(agent(&Fixture::new()).matches(&talk, at_minute(2)), expected);
}

#[tokio::test]
async fn running_process_produces_no_edits() {
    let fx = Fixture::new();
    fx.shell().on("ps -p", FakeReply::code(0));
    let edits = agent(&fx).process(&running(), at_minute(2)).await.unwrap();
    assert!(edits.is_empty());
    assert_eq!(fx.shell().commands().len(), 1);
}

#[tokio::test]
async fn finished_run_records_code_tail_and_highlights() {
    let fx = Fixture::new();
    fx.shell()
        .on("ps -p", FakeReply::code(1))
        .on("cat status", FakeReply::ok("3\n"))
        .on("stat -c%s stdout", FakeReply::ok("compiling\nFOREMAN: 2 tests failed\nFOREMAN:4:SPEC:pass\ndone\n"));
    let talk = running();
    let edits = agent(&fx).process(&talk, at_minute(9)).await.unwrap();
    let daemon = applied(&talk, &edits).daemon.unwrap();
    assert_eq!(daemon.code, Some(3));
    assert_eq!(daemon.ended, Some(at_minute(9)));
    assert_eq!(daemon.tail.as_deref(), Some("compiling\nFOREMAN: 2 tests failed\nFOREMAN:4:SPEC:pass\ndone"));
    assert_eq!(daemon.highlights.as_deref(), Some("2 tests failed\nspec: pass"));
}

#[tokio::test]
async fn missing_status_file_maps_to_127() {
    let fx = Fixture::new();
    fx.shell().on("ps -p", FakeReply::code(1)).on("cat status", FakeReply::ok("127\n"));
    let talk = running();
    let edits = agent(&fx).process(&talk, at_minute(9)).await.unwrap();
    let daemon = applied(&talk, &edits).daemon.unwrap();
    assert_eq!(daemon.code, Some(127));
    assert_eq!(daemon.tail.as_deref(), Some(""));
    assert_eq!(daemon.highlights.as_deref(), Some(""));
}

#[tokio::test]
async fn missing_dir_finishes_without_remote_calls() {
    let fx = Fixture::new();
    let talk = TalkBuilder::new("a").shell().started(at_minute(0)).build();
    let edits = agent(&fx).process(&talk, at_minute(3)).await.unwrap();
    assert_eq!(applied(&talk, &edits).daemon.unwrap().code, Some(127));
    assert!(fx.shell().commands().is_empty());
}

#[tokio::test]
async fn failing_status_read_is_retried() {
    let fx = Fixture::new();
    fx.shell().on("ps -p", FakeReply::code(1)).on("cat status", FakeReply::Io("reset".into()));
    let err = agent(&fx).process(&running(), at_minute(3)).await.unwrap_err();
    assert!(matches!(err, AgentError::Shell(_)));
}
