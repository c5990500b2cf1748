// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Marker protocol embedded in captured build output.
//!
//! Two kinds of marked lines are recognized:
//!
//! - highlights: `FOREMAN: text`, surfaced to the conversation as-is
//! - stage signals: `FOREMAN:<len>:<STAGE>:<payload>`, where `len` is the
//!   byte length of the escaped payload
//!
//! Signals may follow arbitrary text on the same line (timestamps, log
//! prefixes). Anything that does not parse exactly is ignored.

use regex::Regex;
use std::fmt;

/// Default marker word
pub const HIGHLIGHT_MARKER: &str = "FOREMAN";

/// Pipeline stage boundary announced by a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Spec,
    Start,
    Success,
    Failure,
}

crate::simple_display! {
    Stage {
        Spec => "spec",
        Start => "start",
        Success => "success",
        Failure => "failure",
    }
}

impl Stage {
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "SPEC" => Some(Stage::Spec),
            "START" => Some(Stage::Start),
            "SUCCESS" => Some(Stage::Success),
            "FAILURE" => Some(Stage::Failure),
            _ => None,
        }
    }

    fn wire(self) -> &'static str {
        match self {
            Stage::Spec => "SPEC",
            Stage::Start => "START",
            Stage::Success => "SUCCESS",
            Stage::Failure => "FAILURE",
        }
    }
}

/// A decoded stage signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub stage: Stage,
    pub payload: String,
}

impl Signal {
    pub fn new(stage: Stage, payload: impl Into<String>) -> Self {
        Self { stage, payload: payload.into() }
    }

    /// Render the signal line a build script would print.
    pub fn encode(&self, marker: &str) -> String {
        let escaped = escape(&self.payload);
        format!("{marker}:{}:{}:{escaped}", escaped.len(), self.stage.wire())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.payload)
    }
}

/// Recognizes marked lines for one marker word.
#[derive(Debug, Clone)]
pub struct MarkerProtocol {
    prefix: String,
    signal: Regex,
}

impl MarkerProtocol {
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let signal = Regex::new(&format!(
            r"{}:(\d+):(SPEC|START|SUCCESS|FAILURE):([\x20-\x7E]*)$",
            regex::escape(marker)
        ))?;
        Ok(Self { prefix: format!("{marker}: "), signal })
    }

    /// `MARKER: ` as it appears at the start of highlight lines
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Text of a highlight line with the prefix stripped
    pub fn highlight<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.strip_prefix(self.prefix.as_str())
    }

    pub fn signal(&self, line: &str) -> Option<Signal> {
        let caps = self.signal.captures(line.trim_end_matches('\r'))?;
        let len: usize = caps.get(1)?.as_str().parse().ok()?;
        let stage = Stage::from_wire(caps.get(2)?.as_str())?;
        let raw = caps.get(3)?.as_str();
        if raw.len() != len {
            return None;
        }
        Some(Signal { stage, payload: unescape(raw) })
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "marker_tests.rs"]
mod tests;
