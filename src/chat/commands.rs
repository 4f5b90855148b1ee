// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Command handling for the interactive chat
//!
//! Lines starting with `/` are slash commands; everything else is a message
//! for the assistant.

/// Represents the different types of commands that can be issued in chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Exit the chat loop
    Exit,
    /// Show help information
    Help,
    /// Start a new chat (new session id)
    New,
    /// Print the conversation so far
    History,
    /// Print the session id and language
    Session,
    /// Switch language; holds the code as typed
    Language(String),
    /// Ask for a human agent directly
    Agent,
    /// Regular user message (not a command)
    Message(String),
    /// Empty input
    Empty,
    /// Unknown slash command
    Unknown(String),
}

/// Check if user input is an exit command. Bare words are messages.
pub fn is_exit_command(input: &str) -> bool {
    let trimmed = input.trim().to_lowercase();
    matches!(trimmed.as_str(), "/exit" | "/quit")
}

/// Check if user input cancels a handoff prompt.
pub fn is_cancel_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("/cancel")
}

/// Split a slash command into its lowercased name and trimmed argument.
fn split_slash_command(input: &str) -> Option<(String, Option<&str>)> {
    let rest = input.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    Some((name.to_lowercase(), arg))
}

/// Parse user input into a ChatCommand
pub fn parse_command(input: &str) -> ChatCommand {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return ChatCommand::Empty;
    }

    if is_exit_command(trimmed) {
        return ChatCommand::Exit;
    }

    let Some((name, arg)) = split_slash_command(trimmed) else {
        return ChatCommand::Message(trimmed.to_string());
    };

    match (name.as_str(), arg) {
        ("help", None) => ChatCommand::Help,
        ("new", None) => ChatCommand::New,
        ("history", None) => ChatCommand::History,
        ("session", None) => ChatCommand::Session,
        ("agent", None) | ("human", None) => ChatCommand::Agent,
        ("lang" | "language", Some(code)) => ChatCommand::Language(code.to_string()),
        ("lang" | "language", None) => ChatCommand::Unknown(format!("/{}", name)),
        _ => ChatCommand::Unknown(trimmed.to_string()),
    }
}

/// Format help text for display
pub fn format_help_text() -> String {
    r#"Careline Commands:

  /help         - Show this help message
  /new          - Start a new chat
  /history      - Show the conversation so far
  /session      - Show the session id and language
  /lang <code>  - Switch language (en, ta)
  /agent        - Talk to a human agent
  /exit, /quit  - Leave the chat

While entering details for an agent, type /cancel to stop."#
        .to_string()
}
