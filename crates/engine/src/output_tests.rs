// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

fn rultor() -> Highlighter {
    Highlighter::new(MarkerProtocol::new("RULTOR").unwrap())
}

#[test]
fn highlights_strip_prefix() {
    let lines = ["RULTOR: A", "plain", "RULTOR: B"];
    assert_eq!(rultor().extract(lines), "A\nB");
}

#[test]
fn highlights_include_stage_signals() {
    let lines = ["+ make", "RULTOR:5:START:build", "ok", "RULTOR:7:FAILURE:deploy!", "RULTOR:9:SPEC:bad"];
    assert_eq!(rultor().extract(lines), "start: build\nfailure: deploy!");
}

#[test]
fn no_marked_lines_is_empty() {
    assert_eq!(rultor().extract(["a", "b"]), "");
}

#[test]
fn tail_keeps_last_sixty_lines() {
    let output: String = (1..=100).map(|n| format!("line {n}\n")).collect();
    let t = tail(&output);
    let lines: Vec<&str> = t.lines().collect();
    assert_eq!(lines.len(), 60);
    assert_eq!(lines[0], "line 41");
    assert_eq!(lines[59], "line 100");
}

#[test]
fn tail_of_single_long_line_is_its_suffix() {
    let line = format!("{}{}", "a".repeat(150_000), "z".repeat(10));
    let t = tail(&line);
    assert_eq!(t.chars().count(), TAIL_CHARS);
    assert!(line.ends_with(&t));
    assert!(t.ends_with("zzzzzzzzzz"));
}

#[test]
fn tail_at_exact_boundary_is_unchanged() {
    let line = "x".repeat(TAIL_CHARS);
    assert_eq!(tail(&line), line);
}

#[test]
fn tail_cuts_on_char_boundaries() {
    let line = "é".repeat(TAIL_CHARS + 5);
    let t = tail(&line);
    assert_eq!(t.chars().count(), TAIL_CHARS);
}

#[test]
fn tail_normalizes_crlf() {
    assert_eq!(tail("a\r\nb\r\n"), "a\nb");
}

#[yare::parameterized(
    zero       = { "0\n", 0 },
    three      = { "3", 3 },
    missing    = { "127\n", 127 },
    noisy      = { " exit: 2 ", 2 },
    empty      = { "", 1 },
    garbage    = { "oops", 1 },
    overflow   = { "99999999999999", 1 },
)]
fn status_parsing(raw: &str, expected: i32) {
    assert_eq!(parse_status(raw), expected);
}

proptest! {
    #[test]
    fn tail_is_bounded_suffix(lines in proptest::collection::vec("[a-z ]{0,3000}", 0..120)) {
        let output = lines.join("\n");
        let t = tail(&output);
        prop_assert!(t.chars().count() <= TAIL_CHARS);
        prop_assert!(t.lines().count() <= TAIL_LINES);
        let normalized = output.lines().collect::<Vec<_>>().join("\n");
        prop_assert!(normalized.ends_with(&t));
    }
}
