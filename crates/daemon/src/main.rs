// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fmd`: the foreman daemon and its operator commands

use clap::Parser;
use fm_daemon::{commands, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = commands::execute(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
