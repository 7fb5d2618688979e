// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parley - chat with AI providers from your terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version, about = "Chat with AI providers from your terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Provider descriptor file (JSON array of {name, endpoint, stream})
    #[arg(long, global = true, value_name = "FILE")]
    pub providers: Option<PathBuf>,

    /// Provider to use, by registered name
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Model to use
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Disable streaming replies
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start interactive chat session (default when no command given)
    Chat,

    /// Ask a single question (non-interactive)
    Ask(AskArgs),

    /// List the providers that would be registered
    Providers,
}

/// Arguments for the ask subcommand
#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct AskArgs {
    /// The question to ask
    pub prompt: String,

    /// API key to use instead of the configured one
    #[arg(long)]
    pub api_key: Option<String>,
}

impl Cli {
    /// The subcommand to run, defaulting to chat
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_is_chat() {
        let cli = Cli::parse_from(["parley"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.command(), &Commands::Chat);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.no_stream);
    }

    #[test]
    fn test_cli_verbose_multiple() {
        let cli = Cli::parse_from(["parley", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "parley",
            "providers",
            "--providers",
            "/tmp/providers.json",
        ]);
        assert_eq!(cli.command(), &Commands::Providers);
        assert_eq!(cli.providers, Some(PathBuf::from("/tmp/providers.json")));
    }

    #[test]
    fn test_cli_ask() {
        let cli = Cli::parse_from([
            "parley",
            "ask",
            "What is Rust?",
            "--provider",
            "OpenRouter Stream",
            "-m",
            "openai/gpt-4o",
            "--api-key",
            "sk-or-1",
        ]);
        match cli.command() {
            Commands::Ask(args) => {
                assert_eq!(args.prompt, "What is Rust?");
                assert_eq!(args.api_key.as_deref(), Some("sk-or-1"));
            }
            other => panic!("Expected Ask, got {:?}", other),
        }
        assert_eq!(cli.provider.as_deref(), Some("OpenRouter Stream"));
        assert_eq!(cli.model.as_deref(), Some("openai/gpt-4o"));
    }

    #[test]
    fn test_cli_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["parley", "ask"]).is_err());
    }
}
