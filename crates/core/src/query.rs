// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Precondition queries over a talk document.
//!
//! An agent's preconditions are a conjunction of [`Query`] values. Each query
//! inspects one [`Field`] for presence, absence, or age.

use crate::talk::Talk;
use crate::time_fmt::format_elapsed;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Addressable fields of a talk document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Shell,
    /// A shell descriptor with every connection field filled in
    ReachableShell,
    Daemon,
    Script,
    Dir,
    Started,
    Ended,
    Code,
    Killed,
    StopRequested,
    StopIssued,
}

crate::simple_display! {
    Field {
        Shell => "shell",
        ReachableShell => "shell[reachable]",
        Daemon => "daemon",
        Script => "daemon/script",
        Dir => "daemon/dir",
        Started => "daemon/started",
        Ended => "daemon/ended",
        Code => "daemon/code",
        Killed => "daemon/killed",
        StopRequested => "daemon/stop/requested",
        StopIssued => "daemon/stop/issued",
    }
}

impl Field {
    pub fn is_present(self, talk: &Talk) -> bool {
        let daemon = talk.daemon.as_ref();
        match self {
            Field::Shell => talk.shell.is_some(),
            Field::ReachableShell => talk.shell.as_ref().is_some_and(|s| s.is_reachable()),
            Field::Daemon => daemon.is_some(),
            Field::Script => daemon.is_some_and(|d| !d.script.trim().is_empty()),
            Field::Dir => daemon.is_some_and(|d| d.dir.is_some()),
            Field::Started => daemon.is_some_and(|d| d.started.is_some()),
            Field::Ended => daemon.is_some_and(|d| d.ended.is_some()),
            Field::Code => daemon.is_some_and(|d| d.code.is_some()),
            Field::Killed => daemon.is_some_and(|d| d.killed.is_some()),
            Field::StopRequested => daemon.is_some_and(|d| d.stop.is_some()),
            Field::StopIssued => {
                daemon.and_then(|d| d.stop.as_ref()).is_some_and(|s| s.issued.is_some())
            }
        }
    }

    /// Timestamp value of the field, if it is a timestamp and present
    pub fn timestamp(self, talk: &Talk) -> Option<DateTime<Utc>> {
        let daemon = talk.daemon.as_ref()?;
        match self {
            Field::Started => daemon.started,
            Field::Ended => daemon.ended,
            Field::Killed => daemon.killed,
            Field::StopRequested => daemon.stop.as_ref().map(|s| s.requested),
            Field::StopIssued => daemon.stop.as_ref().and_then(|s| s.issued),
            _ => None,
        }
    }
}

/// A single precondition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Has(Field),
    Lacks(Field),
    /// The timestamp field is present and more than `limit` in the past
    OlderThan { field: Field, limit: Duration },
}

impl Query {
    pub fn has(field: Field) -> Self {
        Query::Has(field)
    }

    pub fn lacks(field: Field) -> Self {
        Query::Lacks(field)
    }

    pub fn older_than(field: Field, limit: Duration) -> Self {
        Query::OlderThan { field, limit }
    }

    pub fn holds(&self, talk: &Talk, now: DateTime<Utc>) -> bool {
        match self {
            Query::Has(field) => field.is_present(talk),
            Query::Lacks(field) => !field.is_present(talk),
            Query::OlderThan { field, limit } => {
                let Some(at) = field.timestamp(talk) else {
                    return false;
                };
                let Ok(limit) = chrono::Duration::from_std(*limit) else {
                    return false;
                };
                now - at > limit
            }
        }
    }

    /// True when every query holds
    pub fn all(queries: &[Query], talk: &Talk, now: DateTime<Utc>) -> bool {
        queries.iter().all(|q| q.holds(talk, now))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Has(field) => write!(f, "{field}"),
            Query::Lacks(field) => write!(f, "!{field}"),
            Query::OlderThan { field, limit } => {
                write!(f, "{field} > {}", format_elapsed(limit.as_secs()))
            }
        }
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
