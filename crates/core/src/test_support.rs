// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Daemon, DaemonId, FakeClock, ShellInfo, StopRequest, Talk, TalkName};
use crate::Clock;
use chrono::{DateTime, Duration, Utc};

/// `FakeClock::new()` plus `minutes`
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    FakeClock::new().now() + Duration::minutes(minutes)
}

/// A complete shell descriptor pointing at a test host
pub fn test_shell() -> ShellInfo {
    ShellInfo::new("worker.test", 22, "build", "-----BEGIN TEST KEY-----")
}

// ── Talk builder ────────────────────────────────────────────────────────────

/// Builds talks in a given lifecycle shape.
///
/// Daemon setters create the daemon group on first use with id `run-1`.
pub struct TalkBuilder {
    talk: Talk,
}

impl TalkBuilder {
    pub fn new(name: impl Into<TalkName>) -> Self {
        Self { talk: Talk::new(name, 1) }
    }

    pub fn number(mut self, number: u64) -> Self {
        self.talk.number = number;
        self
    }

    pub fn shell(mut self) -> Self {
        self.talk.shell = Some(test_shell());
        self
    }

    pub fn shell_info(mut self, shell: ShellInfo) -> Self {
        self.talk.shell = Some(shell);
        self
    }

    pub fn script(mut self, script: &str) -> Self {
        self.daemon().script = script.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.daemon().title = title.to_string();
        self
    }

    pub fn dir(mut self, dir: &str) -> Self {
        self.daemon().dir = Some(dir.to_string());
        self
    }

    pub fn started(mut self, at: DateTime<Utc>) -> Self {
        self.daemon().started = Some(at);
        self
    }

    pub fn finished(mut self, started: DateTime<Utc>, ended: DateTime<Utc>, code: i32) -> Self {
        let daemon = self.daemon();
        daemon.started = Some(started);
        daemon.ended = Some(ended);
        daemon.code = Some(code);
        daemon.tail = Some(String::new());
        self
    }

    pub fn killed(mut self, at: DateTime<Utc>) -> Self {
        self.daemon().killed = Some(at);
        self
    }

    pub fn stop_requested(mut self, at: DateTime<Utc>) -> Self {
        self.daemon().stop = Some(StopRequest { requested: at, issued: None });
        self
    }

    pub fn build(self) -> Talk {
        self.talk
    }

    fn daemon(&mut self) -> &mut Daemon {
        self.talk
            .daemon
            .get_or_insert_with(|| Daemon::new(DaemonId::from("run-1"), "build", "true"))
    }
}

// ── Proptest strategies ─────────────────────────────────────────────────────

/// Proptest strategies over talk shapes.
pub mod strategies {
    use super::{at_minute, test_shell, TalkBuilder};
    use crate::Talk;
    use proptest::prelude::*;

    fn arb_minute() -> impl Strategy<Value = i64> {
        prop_oneof![0i64..120, 14_000i64..15_000]
    }

    /// Any talk with an optional shell and daemon, timestamps within the
    /// first few minutes of `FakeClock::new()` or days later.
    pub fn arb_talk() -> impl Strategy<Value = Talk> {
        (
            any::<bool>(),
            any::<bool>(),
            proptest::option::of("/tmp/fm\\.[a-z]{4}"),
            proptest::option::of(arb_minute()),
            proptest::option::of((1i64..60, -1i32..130)),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(shell, daemon, dir, started, finished, killed, stop)| {
                let mut b = TalkBuilder::new("prop/talk#1");
                if shell {
                    b = b.shell_info(test_shell());
                }
                if !daemon {
                    return b.build();
                }
                b = b.script("make");
                if let Some(dir) = dir {
                    b = b.dir(&dir);
                }
                if let Some(start) = started {
                    b = b.started(at_minute(start));
                    if let Some((len, code)) = finished {
                        b = b.finished(at_minute(start), at_minute(start + len), code);
                    }
                    if killed {
                        b = b.killed(at_minute(start + 61));
                    }
                    if stop {
                        b = b.stop_requested(at_minute(start));
                    }
                }
                b.build()
            })
    }
}
