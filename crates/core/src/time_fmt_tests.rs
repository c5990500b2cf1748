// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    zero          = { 0, "0s" },
    seconds       = { 45, "45s" },
    minutes       = { 192, "3m12s" },
    whole_minute  = { 120, "2m" },
    hours         = { 7_500, "2h5m" },
    whole_hour    = { 3_600, "1h" },
    days          = { 273_600, "3d4h" },
    whole_days    = { 864_000, "10d" },
)]
fn formats(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[yare::parameterized(
    bare      = { "300", 300 },
    seconds   = { "90s", 90 },
    minutes   = { "60m", 3_600 },
    hours     = { "3h", 10_800 },
    days      = { "10d", 864_000 },
    spaced    = { " 5 min ", 300 },
)]
fn parses(input: &str, secs: u64) {
    assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(secs));
}

#[yare::parameterized(
    empty     = { "" },
    unit_only = { "m" },
    unknown   = { "5w" },
    negative  = { "-5s" },
    overflow  = { "99999999999999999999d" },
)]
fn rejects(input: &str) {
    let err = parse_duration(input).unwrap_err();
    assert_eq!(err.input, input);
}

#[test]
fn parse_then_format_agrees_for_whole_units() {
    for input in ["45s", "3m", "2h", "10d"] {
        let secs = parse_duration(input).unwrap().as_secs();
        assert_eq!(format_elapsed(secs), input);
    }
}
