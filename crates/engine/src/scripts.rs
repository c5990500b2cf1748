// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote shell commands issued by the lifecycle agents

use crate::output::STDOUT_CEILING;
use fm_adapters::escape;
use fm_core::{Daemon, Talk};

/// Environment variable exported to user scripts with the container name
pub const CONTAINER_ENV: &str = "FOREMAN_CONTAINER";

/// Substitute `{dir}` and `{container}` with escaped values.
pub fn render(template: &str, dir: &str, container: &str) -> String {
    template.replace("{dir}", &escape(dir)).replace("{container}", &escape(container))
}

/// Docker-safe container name for a run: `fm-<talk>-<run suffix>`.
///
/// Lowercase `[a-z0-9_.-]`, runs of other characters collapse to `-`,
/// at most 63 characters.
pub fn container_name(talk: &Talk, daemon: &Daemon) -> String {
    let mut slug = String::new();
    for c in talk.name.as_str().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let name = format!("fm-{}-{}", slug, daemon.id.suffix().to_lowercase());
    let name = name.replace("--", "-");
    fm_core::short(&name, 63).trim_end_matches('-').to_string()
}

pub fn mkdir() -> &'static str {
    "mktemp -d -t foreman-XXXXXXXX"
}

pub fn dir_exists(dir: &str) -> String {
    format!("if [ -d {0} ]; then echo present; else echo absent; fi", escape(dir))
}

/// The wrapper that records the pid, prints the banner and runs the script.
pub fn run_wrapper(script: &str, container: &str, banner: &str) -> String {
    [
        "#!/bin/bash".to_string(),
        "set -x".to_string(),
        "set -e".to_string(),
        "set -o pipefail".to_string(),
        "cd \"$(dirname \"$0\")\"".to_string(),
        "echo $$ > pid".to_string(),
        format!("export {CONTAINER_ENV}={}", escape(container)),
        format!("echo {}", escape(banner)),
        "date".to_string(),
        "uptime || true".to_string(),
        script.to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Launch `run.sh` detached; its output lands in `stdout`, its exit code in
/// `status` once it finishes.
pub fn launch(dir: &str) -> String {
    format!(
        "cd {} && chmod a+x run.sh && echo 'run.sh failed to start' > stdout && \
         ( ( nohup ./run.sh </dev/null >stdout 2>&1; echo $? >status ) </dev/null >/dev/null 2>&1 & )",
        escape(dir)
    )
}

/// Import a keyring read from stdin
pub fn gpg_import() -> &'static str {
    "gpg --import && gpg --version && (gpgconf --reload gpg-agent || true) && gpg --list-keys"
}

/// Exit status of a finished run; `127` if it never wrote one
pub fn status(dir: &str) -> String {
    format!("cd {} && if [ ! -e status ]; then echo 127; exit; fi; cat status", escape(dir))
}

/// Bounded read of the run output
pub fn stdout(dir: &str) -> String {
    format!(
        "cd {} && if [ ! -e stdout ]; then exit 0; fi; size=$(stat -c%s stdout); \
         if [ \"$size\" -gt {max} ]; then echo \"Output is too big ($size bytes)\"; \
         echo \"You see only the last {max} bytes\"; tail -c {max} stdout; else cat stdout; fi",
        escape(dir),
        max = STDOUT_CEILING
    )
}

/// Full output, re-encoded as clean UTF-8 without control sequences
pub fn fetch(dir: &str) -> String {
    let dir = escape(dir);
    format!(
        "if [ -d {dir} ]; then cd {dir}; else echo 'Build directory is absent, internal error'; exit; fi; \
         if [ -r stdout ]; then cat stdout | iconv -f utf-8 -t utf-8 -c | LANG=en_US.UTF-8 col -bx; \
         else echo 'Stdout not found, internal error'; fi"
    )
}

pub fn cleanup(dir: &str) -> String {
    let dir = escape(dir);
    format!("sudo rm -rf {dir} || rm -rf {dir}")
}

/// Trivial command used to test that a host answers
pub fn ping() -> &'static str {
    "pwd"
}

#[cfg(test)]
#[path = "scripts_tests.rs"]
mod tests;
