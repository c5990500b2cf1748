// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::Scripts;
use crate::test_helpers::{applied, Fixture};
use fm_adapters::FakeReply;
use fm_core::test_support::{at_minute, TalkBuilder};

const TEN_DAYS: Duration = Duration::from_secs(10 * 24 * 60 * 60);

fn agent(fx: &Fixture) -> DropsDaemon {
    DropsDaemon::new(fx.deps.clone(), TEN_DAYS, Scripts::default().inspect)
}

fn stale() -> Talk {
    TalkBuilder::new("a/b#7").shell().script("make").dir("/tmp/fm.x").started(at_minute(0)).build()
}

fn eleven_days() -> DateTime<Utc> {
    at_minute(11 * 24 * 60)
}

#[yare::parameterized(
    old_run = { stale(), eleven_days(), true },
    young_run = { stale(), at_minute(9 * 24 * 60), false },
    exactly_at_ceiling = { stale(), at_minute(10 * 24 * 60), false },
    finished = { TalkBuilder::new("a").shell().finished(at_minute(0), at_minute(1), 0).build(), eleven_days(), false },
)]
fn matches(talk: Talk, at: DateTime<Utc>, expected: bool) {
    assert_eq!(agent(&Fixture::new()).matches(&talk, at), expected);
}

#[tokio::test]
async fn live_container_is_left_alone() {
    let fx = Fixture::new();
    fx.shell().on("docker ps", FakeReply::ok("3f2a9c\n"));
    let edits = agent(&fx).process(&stale(), eleven_days()).await.unwrap();
    assert!(edits.is_empty());
    let inspect = &fx.shell().commands()[0];
    assert!(inspect.contains("'fm-a-b-7-1'"), "{inspect}");
}

#[tokio::test]
async fn lost_container_finishes_with_code_one() {
    let fx = Fixture::new();
    fx.shell().on("docker ps", FakeReply::ok(""));
    let talk = stale();
    let edits = agent(&fx).process(&talk, eleven_days()).await.unwrap();
    let daemon = applied(&talk, &edits).daemon.unwrap();
    assert_eq!(daemon.code, Some(1));
    assert_eq!(daemon.ended, Some(eleven_days()));
    assert_eq!(daemon.tail.as_deref(), Some("container lost"));
}

#[tokio::test]
async fn missing_dir_counts_as_lost_without_probing() {
    let fx = Fixture::new();
    let talk = TalkBuilder::new("a").shell().script("make").started(at_minute(0)).build();
    let edits = agent(&fx).process(&talk, eleven_days()).await.unwrap();
    assert_eq!(applied(&talk, &edits).daemon.unwrap().code, Some(1));
    assert!(fx.shell().commands().is_empty());
}
