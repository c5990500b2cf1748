// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle specs: talks stored on disk, driven through whole pulses
//! against fake workers.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use fm_adapters::{FakeArchiveStore, FakeReply, FakeShell, FakeShellProvider};
use fm_core::test_support::{at_minute, TalkBuilder};
use fm_core::{FakeClock, Talk, TalkName};
use fm_engine::{lifecycle_agents, AgentDeps, LifecycleConfig, Pulse, PulseReport};
use fm_storage::{FsTalkStore, TalkStore};
use tempfile::TempDir;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

struct World {
    state: TempDir,
    store: Arc<FsTalkStore>,
    shells: FakeShellProvider,
    archive: FakeArchiveStore,
    clock: FakeClock,
    pulse: Pulse<FakeClock>,
}

impl World {
    fn new() -> Self {
        let state = tempfile::tempdir().unwrap();
        let store = Arc::new(FsTalkStore::open(state.path()).unwrap());
        let shells = FakeShellProvider::new();
        let archive = FakeArchiveStore::default();
        let clock = FakeClock::new();
        let deps = AgentDeps::new(Arc::new(shells.clone()), Arc::new(archive.clone()));
        let agents = lifecycle_agents(&deps, &LifecycleConfig::default()).unwrap();
        let pulse = Pulse::new(store.clone(), agents, clock.clone());
        Self { state, store, shells, archive, clock, pulse }
    }

    fn worker(&self) -> &FakeShell {
        self.shells.shell()
    }

    /// A worker whose run already finished with `status` and printed `output`
    fn finished_worker(&self, status: &str, output: &str) -> &FakeShell {
        self.worker()
            .on("mktemp", FakeReply::ok("/tmp/fm.work\n"))
            .on("if [ -d", FakeReply::ok("present\n"))
            .on("ps -p", FakeReply::code(1))
            .on("cat status", FakeReply::ok(status))
            .on("stat -c%s stdout", FakeReply::ok(output))
            .on("iconv", FakeReply::ok(output))
    }

    async fn put(&self, talk: Talk) {
        self.store.save(&talk).await.unwrap();
    }

    async fn pulse(&self, name: &str) -> PulseReport {
        self.pulse.run(&TalkName::new(name)).await.unwrap()
    }

    /// Reads through a fresh store so only what reached disk is seen
    async fn load(&self, name: &str) -> Talk {
        FsTalkStore::open(self.state.path()).unwrap().load(&TalkName::new(name)).await.unwrap()
    }
}

fn submitted(name: &str) -> Talk {
    TalkBuilder::new(name).shell().title("deploy").script("make deploy").build()
}

#[tokio::test]
async fn successful_run_is_archived_and_the_daemon_removed() {
    let world = World::new();
    world.finished_worker("0\n", "compiling\nFOREMAN: all green\ndone\n");
    world.put(submitted("acme/app#1")).await;

    let report = world.pulse("acme/app#1").await;
    assert_eq!(report.fired, ["mkdir", "starts", "ends", "archives"]);

    let talk = world.load("acme/app#1").await;
    assert!(talk.daemon.is_none());
    assert_eq!(talk.archive.len(), 1);
    assert_eq!(talk.archive[0].title, "deploy: 0 (SUCCESS) in 0s, 3 lines");

    let keys = world.archive.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("2026/01/"), "{}", keys[0]);
    assert_eq!(world.archive.get(&keys[0]).unwrap(), "compiling\nFOREMAN: all green\ndone\n");
    assert_eq!(world.archive.content_type(&keys[0]).as_deref(), Some("text/plain"));
    assert_eq!(world.worker().calls_matching("rm -rf").len(), 1);
}

#[tokio::test]
async fn settled_talk_stays_put() {
    let world = World::new();
    world.finished_worker("0\n", "ok\n");
    world.put(submitted("a")).await;
    world.pulse("a").await;
    let settled = world.load("a").await;
    world.worker().clear_calls();

    world.clock.advance(DAY);
    let report = world.pulse("a").await;
    assert!(!report.changed());
    assert!(report.failed.is_empty());
    assert_eq!(world.load("a").await, settled);
    assert!(world.worker().commands().is_empty());
}

#[tokio::test]
async fn missing_status_file_reads_as_127() {
    let world = World::new();
    world.finished_worker("127\n", "killed by oom\n");
    world.put(submitted("a")).await;
    world.pulse("a").await;

    let talk = world.load("a").await;
    assert_eq!(talk.archive[0].title, "deploy: 127 (FAILURE) in 0s, 1 lines");
}

#[tokio::test]
async fn failing_script_is_archived_as_failure() {
    let world = World::new();
    world.finished_worker("3\n", "error: tests failed\n");
    world.put(submitted("a")).await;
    world.pulse("a").await;

    let talk = world.load("a").await;
    assert!(talk.daemon.is_none());
    assert!(talk.archive[0].title.starts_with("deploy: 3 (FAILURE)"), "{}", talk.archive[0].title);
}

#[tokio::test]
async fn failed_provisioning_finishes_with_128() {
    let world = World::new();
    world
        .worker()
        .on("mktemp", FakeReply::ok("/tmp/fm.work\n"))
        .on("cat > ", FakeReply::Output { code: 1, stdout: String::new(), stderr: "disk full".into() })
        .on("iconv", FakeReply::ok("run.sh failed to start\n"));
    world.put(submitted("a")).await;

    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["mkdir", "starts", "archives"]);
    assert!(world.worker().calls_matching("nohup").is_empty());
    let talk = world.load("a").await;
    assert!(talk.archive[0].title.starts_with("deploy: 128 (FAILURE)"), "{}", talk.archive[0].title);
}

#[tokio::test]
async fn running_build_is_left_alone_until_it_finishes() {
    let world = World::new();
    world.finished_worker("0\n", "ok\n").on("ps -p", FakeReply::code(0));
    world.put(submitted("a")).await;

    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["mkdir", "starts"]);
    assert_eq!(report.idle, ["ends"]);
    assert_eq!(world.load("a").await.status(), "running");

    world.worker().forget("ps -p");
    world.worker().on("ps -p", FakeReply::code(1));
    world.clock.advance(Duration::from_secs(90));
    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["ends", "archives"]);
    assert_eq!(world.load("a").await.archive[0].title, "deploy: 0 (SUCCESS) in 1m30s, 1 lines");
}

#[tokio::test]
async fn vanished_directory_ends_in_a_wipe() {
    let world = World::new();
    world.worker().on("if [ -d", FakeReply::ok("absent\n"));
    world.put(TalkBuilder::new("a").shell().dir("/tmp/fm.gone").started(at_minute(0)).build()).await;

    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["sanitizes", "ends"]);
    let daemon = world.load("a").await.daemon.unwrap();
    assert_eq!(daemon.code, Some(127));
    assert!(daemon.dir.is_none());

    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["wipes"]);
    let talk = world.load("a").await;
    assert!(talk.daemon.is_none());
    assert!(talk.archive.is_empty());
}

#[tokio::test]
async fn overdue_run_is_killed_once() {
    let world = World::new();
    world.worker().on("if [ -d", FakeReply::ok("present\n")).on("ps -p", FakeReply::code(0));
    world.put(TalkBuilder::new("a").shell().dir("/tmp/fm.work").started(at_minute(0)).build()).await;

    world.clock.advance(Duration::from_secs(59 * 60));
    let report = world.pulse("a").await;
    assert!(report.fired.is_empty(), "{report:?}");

    world.clock.advance(Duration::from_secs(2 * 60));
    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["kills"]);
    assert_eq!(world.load("a").await.daemon.unwrap().killed, Some(at_minute(61)));

    let report = world.pulse("a").await;
    assert!(report.fired.is_empty(), "{report:?}");
    assert_eq!(world.worker().calls_matching("kill -TERM").len(), 1);
}

#[tokio::test]
async fn unknown_host_is_dismounted_after_the_ceiling() {
    let world = World::new();
    world.worker().set_host_unknown(true);
    let talk = TalkBuilder::new("a").shell().dir("/tmp/fm.work").started(at_minute(0)).killed(at_minute(61));
    world.put(talk.build()).await;

    world.clock.advance(9 * DAY);
    let report = world.pulse("a").await;
    assert!(report.fired.is_empty(), "{report:?}");
    assert_eq!(report.failed.len(), 2, "{report:?}");
    assert!(world.load("a").await.daemon.is_some());

    world.clock.advance(2 * DAY);
    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["dismount"]);
    assert!(world.load("a").await.daemon.is_none());
}

#[tokio::test]
async fn refusing_host_is_not_dismounted() {
    let world = World::new();
    world.worker().set_unreachable(true);
    let talk = TalkBuilder::new("a").shell().dir("/tmp/fm.work").started(at_minute(0)).killed(at_minute(61));
    world.put(talk.build()).await;

    world.clock.advance(11 * DAY);
    let report = world.pulse("a").await;
    assert!(report.fired.is_empty(), "{report:?}");
    assert!(report.failed.iter().any(|(agent, _)| *agent == "dismount"), "{report:?}");
    assert!(world.load("a").await.daemon.is_some());
}

#[tokio::test]
async fn lost_container_is_finished_and_archived() {
    let world = World::new();
    world.finished_worker("0\n", "partial\n").on("ps -p", FakeReply::code(0));
    let talk = TalkBuilder::new("a")
        .shell()
        .title("deploy")
        .dir("/tmp/fm.work")
        .started(at_minute(0))
        .killed(at_minute(61));
    world.put(talk.build()).await;

    world.clock.advance(11 * DAY);
    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["drops", "archives"]);
    let talk = world.load("a").await;
    assert!(talk.daemon.is_none());
    assert!(talk.archive[0].title.starts_with("deploy: 1 (FAILURE)"), "{}", talk.archive[0].title);
}

#[tokio::test]
async fn stop_request_is_issued_once() {
    let world = World::new();
    world.worker().on("if [ -d", FakeReply::ok("present\n")).on("ps -p", FakeReply::code(0));
    let talk = TalkBuilder::new("a")
        .shell()
        .dir("/tmp/fm.work")
        .started(at_minute(0))
        .stop_requested(at_minute(1));
    world.put(talk.build()).await;

    world.clock.advance(Duration::from_secs(2 * 60));
    let report = world.pulse("a").await;
    assert_eq!(report.fired, ["stops"]);
    let stop = world.load("a").await.daemon.unwrap().stop.unwrap();
    assert_eq!(stop.issued, Some(at_minute(2)));

    let report = world.pulse("a").await;
    assert!(report.fired.is_empty());
    assert_eq!(world.worker().calls_matching("docker stop").len(), 1);
}
