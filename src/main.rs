// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Parley - chat with AI providers from your terminal
//!
//! Entry point for the parley CLI application.

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;

use parley::cli::{Cli, Commands};
use parley::config::Settings;
use parley::error::Result;

#[path = "main/cli_commands.rs"]
mod cli_commands;

use cli_commands::{run_ask, run_chat, run_providers};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let settings = Settings::load()?;
    init_tracing(cli.verbose)?;

    match cli.command() {
        Commands::Chat => run_chat(&cli, settings).await,
        Commands::Ask(args) => run_ask(&cli, args, &settings).await,
        Commands::Providers => run_providers(&cli, &settings),
    }
}

/// Log to a file: the TUI owns the terminal. `RUST_LOG` still takes precedence.
fn init_tracing(verbose: u8) -> Result<()> {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    let directive = match verbose {
        0 => None,
        1 => Some("parley=debug"),
        _ => Some("parley=trace"),
    };
    if let Some(parsed) = directive.and_then(|d| d.parse().ok()) {
        env_filter = env_filter.add_directive(parsed);
    }

    let path = Settings::log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
