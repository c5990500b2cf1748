// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, h, m, 0).unwrap()
}

#[test]
fn new_talk_has_no_groups() {
    let talk = Talk::new("acme/widgets#1", 7);
    assert_eq!(talk.name.as_str(), "acme/widgets#1");
    assert_eq!(talk.number, 7);
    assert!(talk.shell.is_none());
    assert!(talk.daemon.is_none());
    assert!(talk.archive.is_empty());
    assert_eq!(talk.status(), "idle");
}

#[test]
fn empty_groups_are_omitted_from_json() {
    let talk = Talk::new("t", 1);
    let json = serde_json::to_value(&talk).unwrap();
    assert_eq!(json, serde_json::json!({ "name": "t", "number": 1 }));
}

#[test]
fn daemon_json_uses_rfc3339_timestamps() {
    let mut daemon = Daemon::new(DaemonId::from("run-1"), "merge", "make");
    daemon.started = Some(at(12, 0));
    let json = serde_json::to_value(&daemon).unwrap();
    assert_eq!(json["started"], "2026-01-15T12:00:00Z");
    assert!(json.get("ended").is_none());
}

#[test]
fn shell_debug_hides_key() {
    let shell = ShellInfo::new("10.0.0.1", 22, "build", "-----BEGIN SECRET-----");
    let debug = format!("{shell:?}");
    assert!(debug.contains("10.0.0.1"));
    assert!(!debug.contains("SECRET"));
    assert!(debug.contains("<22 bytes>"));
}

#[yare::parameterized(
    complete     = { "h", 22, "u", "k", true },
    no_host      = { "",  22, "u", "k", false },
    zero_port    = { "h", 0,  "u", "k", false },
    blank_login  = { "h", 22, " ", "k", false },
    no_key       = { "h", 22, "u", "",  false },
)]
fn shell_reachability(host: &str, port: u16, login: &str, key: &str, expected: bool) {
    assert_eq!(ShellInfo::new(host, port, login, key).is_reachable(), expected);
}

#[test]
fn daemon_liveness_and_duration() {
    let mut daemon = Daemon::new(DaemonId::from("run-1"), "merge", "make");
    assert!(!daemon.is_live());
    assert!(daemon.duration().is_none());

    daemon.started = Some(at(12, 0));
    assert!(daemon.is_live());

    daemon.ended = Some(at(12, 5));
    daemon.code = Some(0);
    assert!(!daemon.is_live());
    assert_eq!(daemon.duration().unwrap().num_minutes(), 5);
}

#[test]
fn status_follows_daemon_shape() {
    let mut talk = Talk::new("t", 1);
    let mut daemon = Daemon::new(DaemonId::from("run-1"), "merge", "make");
    talk.daemon = Some(daemon.clone());
    assert_eq!(talk.status(), "pending");

    daemon.dir = Some("/tmp/x".into());
    talk.daemon = Some(daemon.clone());
    assert_eq!(talk.status(), "provisioned");

    daemon.started = Some(at(12, 0));
    talk.daemon = Some(daemon.clone());
    assert_eq!(talk.status(), "running");

    daemon.ended = Some(at(12, 1));
    daemon.code = Some(1);
    talk.daemon = Some(daemon);
    assert_eq!(talk.status(), "finished");

    talk.daemon = None;
    talk.archive.push(ArchiveLog {
        id: DaemonId::from("run-1"),
        title: "t".into(),
        uri: "mem://b/k".into(),
    });
    assert_eq!(talk.status(), "archived");
}
