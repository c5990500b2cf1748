// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Captured output processing: tails, highlights, exit statuses

use fm_core::MarkerProtocol;

/// Largest slice of remote `stdout` fetched when a run ends
pub const STDOUT_CEILING: u64 = 4_000_000;

/// Lines kept in `daemon/tail`
pub const TAIL_LINES: usize = 60;

/// Character cap on `daemon/tail`
pub const TAIL_CHARS: usize = 100_000;

/// Sentinel for a run that never wrote a status file
pub const NO_STATUS: i32 = 127;

/// Sentinel for a run that could not be provisioned
pub const PROVISIONING_FAILED: i32 = 128;

/// Sentinel for a run whose container or host disappeared
pub const CONTAINER_LOST: i32 = 1;

pub fn split_lines(output: &str) -> Vec<&str> {
    output.lines().collect()
}

/// The last [`TAIL_LINES`] lines joined with `\n`, then cut to the last
/// [`TAIL_CHARS`] characters. Always a suffix of the joined lines.
pub fn tail(output: &str) -> String {
    let lines = split_lines(output);
    let start = lines.len().saturating_sub(TAIL_LINES);
    let joined = lines[start..].join("\n");
    last_chars(&joined, TAIL_CHARS).to_string()
}

fn last_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    match s.char_indices().nth(count - n) {
        Some((start, _)) => &s[start..],
        None => s,
    }
}

/// Decode the output of the status script: digits only, empty means 1.
pub fn parse_status(raw: &str) -> i32 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 1;
    }
    digits.parse().unwrap_or(1)
}

/// Extracts highlight lines and stage signals from build output
#[derive(Debug, Clone)]
pub struct Highlighter {
    protocol: MarkerProtocol,
}

impl Highlighter {
    pub fn new(protocol: MarkerProtocol) -> Self {
        Self { protocol }
    }

    /// Marked lines in order, newline-joined: highlight text with the
    /// prefix stripped, stage signals as `stage: payload`.
    pub fn extract<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> String {
        let mut out = Vec::new();
        for line in lines {
            if let Some(text) = self.protocol.highlight(line) {
                out.push(text.to_string());
            } else if let Some(signal) = self.protocol.signal(line) {
                out.push(signal.to_string());
            }
        }
        out.join("\n")
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
