// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file (`foreman.toml`).
//!
//! Every section is optional; missing values fall back to the engine
//! defaults. Durations are written as `90s`, `60m`, `3h`, `10d` or a bare
//! number of seconds. Environment overrides are applied on top by
//! [`Config::apply_env`].

use fm_adapters::SshOptions;
use fm_engine::{Asset, LifecycleConfig, SchedulerConfig, Scripts, StartOptions, Timeouts};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the state directory when `--config` is absent
pub const CONFIG_FILE: &str = "foreman.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scheduler: SchedulerSection,
    pub timeouts: TimeoutsSection,
    pub scripts: ScriptsSection,
    /// Marker word for highlights and stage signals
    pub marker: Option<String>,
    pub start: StartSection,
    pub archive: ArchiveSection,
    pub ssh: SshSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSection {
    #[serde(with = "human_duration")]
    pub interval: Duration,
    pub workers: usize,
    #[serde(with = "human_duration")]
    pub drain_timeout: Duration,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        let d = SchedulerConfig::default();
        Self { interval: d.interval, workers: d.workers, drain_timeout: d.drain_timeout }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutsSection {
    #[serde(with = "human_duration")]
    pub kill_after: Duration,
    #[serde(with = "human_duration")]
    pub drop_after: Duration,
    #[serde(with = "human_duration")]
    pub dismount_after: Duration,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        let d = Timeouts::default();
        Self { kill_after: d.kill_after, drop_after: d.drop_after, dismount_after: d.dismount_after }
    }
}

/// Remote command overrides; `None` keeps the built-in template
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsSection {
    pub check: Option<String>,
    pub kill: Option<String>,
    pub stop: Option<String>,
    pub inspect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartSection {
    pub assets: Vec<AssetEntry>,
    /// GPG keyring file imported on workers before each run
    pub keyring: Option<PathBuf>,
    pub banner: Option<String>,
}

/// Local file uploaded into every run's working directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveSection {
    /// Defaults to `<state>/archive`
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshSection {
    pub program: PathBuf,
    #[serde(with = "human_duration")]
    pub connect_timeout: Duration,
    #[serde(with = "human_duration")]
    pub command_timeout: Duration,
    #[serde(with = "human_duration")]
    pub keep_alive: Duration,
}

impl Default for SshSection {
    fn default() -> Self {
        let d = SshOptions::default();
        Self {
            program: d.program,
            connect_timeout: d.connect_timeout,
            command_timeout: d.command_timeout,
            keep_alive: d.keep_alive,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load `explicit` if given, else `<state_dir>/foreman.toml` when it
    /// exists, else defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>, state_dir: &Path) -> Result<Self, ConfigError> {
        let fallback = state_dir.join(CONFIG_FILE);
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => fallback.exists().then_some(fallback),
        };
        let mut config = match path {
            Some(path) => {
                let text = read(&path)?;
                tracing::debug!(path = %path.display(), "loaded configuration");
                Self::parse(&text)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `FM_PULSE_MS`, `FM_WORKERS` and `FM_DRAIN_TIMEOUT_MS`.
    pub fn apply_env(&mut self) {
        if let Some(interval) = crate::env::pulse_interval() {
            self.scheduler.interval = interval;
        }
        if let Some(workers) = crate::env::workers() {
            self.scheduler.workers = workers;
        }
        if let Some(drain) = crate::env::drain_timeout() {
            self.scheduler.drain_timeout = drain;
        }
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.scheduler.interval,
            workers: self.scheduler.workers.max(1),
            drain_timeout: self.scheduler.drain_timeout,
        }
    }

    /// Lifecycle settings with asset and keyring files read from disk.
    pub fn lifecycle(&self) -> Result<LifecycleConfig, ConfigError> {
        let defaults = LifecycleConfig::default();
        let s = &self.scripts;
        let scripts = Scripts {
            check: s.check.clone().unwrap_or(defaults.scripts.check),
            kill: s.kill.clone().unwrap_or(defaults.scripts.kill),
            stop: s.stop.clone().unwrap_or(defaults.scripts.stop),
            inspect: s.inspect.clone().unwrap_or(defaults.scripts.inspect),
        };
        let mut start = StartOptions::default();
        for asset in &self.start.assets {
            let content = std::fs::read(&asset.path)
                .map_err(|source| ConfigError::Read { path: asset.path.clone(), source })?;
            start.assets.push(Asset::new(asset.name.clone(), content));
        }
        if let Some(path) = &self.start.keyring {
            let keyring = std::fs::read(path)
                .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            start = start.keyring(keyring);
        }
        if let Some(banner) = &self.start.banner {
            start = start.banner(banner.clone());
        }
        Ok(LifecycleConfig {
            timeouts: Timeouts {
                kill_after: self.timeouts.kill_after,
                drop_after: self.timeouts.drop_after,
                dismount_after: self.timeouts.dismount_after,
            },
            scripts,
            marker: self.marker.clone().unwrap_or(defaults.marker),
            start,
        })
    }

    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            program: self.ssh.program.clone(),
            connect_timeout: self.ssh.connect_timeout,
            command_timeout: self.ssh.command_timeout,
            keep_alive: self.ssh.keep_alive,
        }
    }

    pub fn archive_root(&self, state_dir: &Path) -> PathBuf {
        self.archive.root.clone().unwrap_or_else(|| state_dir.join("archive"))
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })
}

/// Durations as human strings (`60m`) or bare seconds
mod human_duration {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => fm_core::parse_duration(&text).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
