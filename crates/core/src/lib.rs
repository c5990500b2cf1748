// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-core: Talk documents, edits, and precondition queries for foreman

pub mod macros;

pub mod clock;
pub mod edit;
pub mod id;
pub mod marker;
pub mod query;
pub mod talk;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use edit::{Edit, EditError, Edits, Outcome};
pub use id::{short, DaemonId};
pub use marker::{MarkerProtocol, Signal, Stage, HIGHLIGHT_MARKER};
pub use query::{Field, Query};
pub use talk::{ArchiveLog, Daemon, ShellInfo, StopRequest, Talk, TalkName};
pub use time_fmt::{format_elapsed, parse_duration, DurationParseError};
