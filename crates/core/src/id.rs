// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run identifiers

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

const ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Identifier of one remote run (the `daemon` group of a talk).
///
/// Generated ids are `run-` plus 12 random lowercase alphanumerics, which
/// keeps them inline in a `SmolStr` and safe inside archive keys and
/// container names. Ids read back from documents are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaemonId(SmolStr);

impl DaemonId {
    pub const PREFIX: &'static str = "run-";

    pub fn new() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(12, &ALPHABET))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The random part, or the whole id when it lacks the prefix
    pub fn suffix(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl Default for DaemonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DaemonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DaemonId {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for DaemonId {
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl PartialEq<&str> for DaemonId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
