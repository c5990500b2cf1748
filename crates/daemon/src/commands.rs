// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fmd` command line: the foreground daemon plus operator commands that
//! edit talk documents directly in the state directory.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use fm_adapters::LOCAL_HOST;
use fm_core::{DaemonId, Edit, Edits, ShellInfo, Talk, TalkName};
use fm_engine::PulseReport;
use fm_storage::{FsTalkStore, TalkStore};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::lifecycle::{self, Paths};

#[derive(Parser, Debug)]
#[command(name = "fmd", version, about = "Reconcile remote build runs recorded in talk documents")]
pub struct Cli {
    /// Configuration file (default: <state>/foreman.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the daemon in the foreground until Ctrl-C or SIGTERM
    Run,
    /// Attach a new run to a talk, creating the talk if needed
    Submit(SubmitArgs),
    /// Print a talk document as JSON
    Show {
        talk: String,
    },
    /// List talks with their number and status
    List,
    /// Ask a live run to stop
    Stop {
        talk: String,
    },
    /// Evaluate every agent against one talk once and print what fired
    Pulse {
        talk: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    pub talk: String,

    /// Command executed on the worker
    #[arg(long)]
    pub script: String,

    /// Label used in archive titles
    #[arg(long, default_value = "build")]
    pub title: String,

    /// Worker host
    #[arg(long, required_unless_present = "local", conflicts_with = "local")]
    pub host: Option<String>,

    #[arg(long, default_value_t = 22)]
    pub port: u16,

    /// Worker login
    #[arg(long, required_unless_present = "local", conflicts_with = "local")]
    pub login: Option<String>,

    /// Private key file (PEM)
    #[arg(long, required_unless_present = "local", conflicts_with = "local")]
    pub key_file: Option<PathBuf>,

    /// Run on this machine instead of over SSH
    #[arg(long)]
    pub local: bool,
}

impl SubmitArgs {
    fn shell(&self) -> Result<ShellInfo> {
        if self.local {
            let login = std::env::var("USER").unwrap_or_else(|_| "root".to_string());
            return Ok(ShellInfo::new(LOCAL_HOST, self.port, login, ""));
        }
        let (Some(host), Some(login), Some(key_file)) = (&self.host, &self.login, &self.key_file)
        else {
            bail!("--host, --login and --key-file are required without --local");
        };
        let key = std::fs::read_to_string(key_file)
            .with_context(|| format!("reading key file {}", key_file.display()))?;
        Ok(ShellInfo::new(host.clone(), self.port, login.clone(), key))
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let paths = Paths::load()?;
    let config = Config::load(cli.config.as_deref(), &paths.state_dir)?;

    if let Command::Run = cli.command {
        let _guard = crate::logging::init_daemon(&paths.state_dir)
            .with_context(|| format!("opening log in {}", paths.state_dir.display()))?;
        let cancel = CancellationToken::new();
        lifecycle::cancel_on_signal(cancel.clone());
        lifecycle::run(&config, &paths, cancel).await?;
        return Ok(());
    }

    crate::logging::init_cli();
    let store = FsTalkStore::open(&paths.state_dir)?;
    match cli.command {
        Command::Run => {}
        Command::Submit(args) => {
            let talk = submit(&store, &args).await?;
            println!("{} #{}: {}", talk.name, talk.number, talk.status());
        }
        Command::Show { talk } => println!("{}", show(&store, &TalkName::new(talk)).await?),
        Command::List => print!("{}", list(&store).await?),
        Command::Stop { talk } => {
            let talk = stop(&store, &TalkName::new(talk)).await?;
            println!("{}: stop requested", talk.name);
        }
        Command::Pulse { talk } => {
            let pulse = lifecycle::build_pulse(&config, &paths)?;
            let report = pulse.run(&TalkName::new(talk)).await?;
            print!("{}", format_report(&report));
        }
    }
    Ok(())
}

/// Attach a shell and a fresh daemon to `args.talk`.
pub async fn submit(store: &dyn TalkStore, args: &SubmitArgs) -> Result<Talk> {
    let shell = args.shell()?;
    let name = TalkName::new(args.talk.clone());
    let _guard = store.lock(&name).await?;
    let mut talk = if store.exists(&name).await? {
        store.load(&name).await?
    } else {
        Talk::new(name.clone(), store.next_number().await?)
    };
    let edits = Edits::from(vec![
        Edit::AddShell { shell },
        Edit::AddDaemon { id: DaemonId::new(), title: args.title.clone(), script: args.script.clone() },
    ]);
    talk.apply(&edits).with_context(|| format!("cannot submit to {name}"))?;
    store.save(&talk).await?;
    tracing::info!(talk = %name, number = talk.number, "run submitted");
    Ok(talk)
}

pub async fn show(store: &dyn TalkStore, name: &TalkName) -> Result<String> {
    let talk = store.load(name).await?;
    Ok(serde_json::to_string_pretty(&talk)?)
}

/// One `name  number  status` line per talk
pub async fn list(store: &dyn TalkStore) -> Result<String> {
    let mut out = String::new();
    for name in store.names().await? {
        let talk = store.load(&name).await?;
        out.push_str(&format!("{}\t{}\t{}\n", talk.name, talk.number, talk.status()));
    }
    Ok(out)
}

pub async fn stop(store: &dyn TalkStore, name: &TalkName) -> Result<Talk> {
    let _guard = store.lock(name).await?;
    let mut talk = store.load(name).await?;
    match &talk.daemon {
        Some(daemon) if daemon.is_live() => {}
        Some(_) => bail!("{name}: run is not live"),
        None => bail!("{name}: no run to stop"),
    }
    talk.apply(&Edit::RequestStop { at: Utc::now() }.into())?;
    store.save(&talk).await?;
    Ok(talk)
}

pub fn format_report(report: &PulseReport) -> String {
    let mut out = format!("{}\n", report.talk);
    if !report.fired.is_empty() {
        out.push_str(&format!("  fired: {}\n", report.fired.join(", ")));
    }
    if !report.idle.is_empty() {
        out.push_str(&format!("  idle:  {}\n", report.idle.join(", ")));
    }
    for (agent, error) in &report.failed {
        out.push_str(&format!("  failed {agent}: {error}\n"));
    }
    if !report.changed() && report.failed.is_empty() {
        out.push_str("  nothing to do\n");
    }
    out
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
