// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable durations for titles, listings and configuration

use std::time::Duration;
use thiserror::Error;

/// Format a number of seconds as a compact two-unit string.
///
/// `45s`, `3m12s`, `2h5m`, `3d4h`. A zero lower unit is dropped (`1h`).
pub fn format_elapsed(secs: u64) -> String {
    const MIN: u64 = 60;
    const HOUR: u64 = 60 * MIN;
    const DAY: u64 = 24 * HOUR;

    let (major, major_unit, minor, minor_unit) = if secs < MIN {
        return format!("{secs}s");
    } else if secs < HOUR {
        (secs / MIN, "m", secs % MIN, "s")
    } else if secs < DAY {
        (secs / HOUR, "h", (secs % HOUR) / MIN, "m")
    } else {
        (secs / DAY, "d", (secs % DAY) / HOUR, "h")
    };
    if minor == 0 {
        format!("{major}{major_unit}")
    } else {
        format!("{major}{major_unit}{minor}{minor_unit}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {input:?}: expected a number with an optional s/m/h/d suffix")]
pub struct DurationParseError {
    pub input: String,
}

/// Parse `90s`, `60m`, `3h`, `10d`, or bare seconds (`300`).
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let err = || DurationParseError { input: input.to_string() };
    let trimmed = input.trim();
    let split = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let value: u64 = digits.parse().map_err(|_| err())?;
    let scale = match unit.trim() {
        "" | "s" | "sec" | "secs" => 1,
        "m" | "min" | "mins" => 60,
        "h" | "hr" | "hrs" => 3_600,
        "d" | "day" | "days" => 86_400,
        _ => return Err(err()),
    };
    value.checked_mul(scale).map(Duration::from_secs).ok_or_else(err)
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
