// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::i18n::Language;

/// Careline - talk to customer support from your terminal
#[derive(Parser, Debug)]
#[command(name = "careline")]
#[command(version, about = "Customer support chat from your terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat service base URL (overrides settings)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive chat (default when no command given)
    Chat,

    /// Send a single message and print the reply
    Send(SendArgs),

    /// Print the conversation for the current session
    History,

    /// Start a new chat with a fresh session id
    New(NewArgs),

    /// Show or change the preferred language
    #[command(alias = "lang")]
    Language(LanguageArgs),

    /// Show the current session id and language
    Session,

    /// Show the effective settings
    #[command(alias = "config")]
    Settings,
}

/// Arguments for the send subcommand
#[derive(clap::Args, Debug)]
pub struct SendArgs {
    /// Message text
    #[arg(required = true)]
    pub message: Vec<String>,
}

impl SendArgs {
    /// Message words joined with single spaces
    pub fn text(&self) -> String {
        self.message.join(" ")
    }
}

/// Arguments for the new subcommand
#[derive(clap::Args, Debug, Default)]
pub struct NewArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the language subcommand
#[derive(clap::Args, Debug)]
pub struct LanguageArgs {
    /// Language code to switch to; prints the current one when omitted
    #[arg(value_parser = parse_language)]
    pub code: Option<Language>,
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse::<Language>().map_err(|e| e.to_string())
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_no_command() {
        let cli = Cli::parse_from(["careline"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.api_url.is_none());
    }

    #[test]
    fn test_cli_verbose_count() {
        let cli = Cli::parse_from(["careline", "-vv", "chat"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Chat)));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "careline",
            "history",
            "--format",
            "json",
            "--api-url",
            "http://10.0.2.2:8000/api",
        ]);
        assert!(matches!(cli.command, Some(Commands::History)));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.2.2:8000/api"));
    }

    #[test]
    fn test_send_joins_words() {
        let cli = Cli::parse_from(["careline", "send", "When", "is", "my", "appointment?"]);
        match cli.command {
            Some(Commands::Send(args)) => assert_eq!(args.text(), "When is my appointment?"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_send_requires_message() {
        assert!(Cli::try_parse_from(["careline", "send"]).is_err());
    }

    #[test]
    fn test_new_yes_flag() {
        let cli = Cli::parse_from(["careline", "new", "--yes"]);
        match cli.command {
            Some(Commands::New(args)) => assert!(args.yes),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_language_parses_code() {
        let cli = Cli::parse_from(["careline", "lang", "TA"]);
        match cli.command {
            Some(Commands::Language(args)) => assert_eq!(args.code, Some(Language::Ta)),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::parse_from(["careline", "language"]);
        match cli.command {
            Some(Commands::Language(args)) => assert!(args.code.is_none()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_language_rejects_unknown_code() {
        assert!(Cli::try_parse_from(["careline", "language", "fr"]).is_err());
    }

    #[test]
    fn test_settings_alias() {
        let cli = Cli::parse_from(["careline", "config"]);
        assert!(matches!(cli.command, Some(Commands::Settings)));
    }
}
