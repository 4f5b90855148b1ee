// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use careline::chat::Alert;
use careline::conversation::{Message, Origin};
use careline::error::Result;
use careline::i18n::Language;

/// Name shown before assistant messages
pub(super) const ASSISTANT_NAME: &str = "careline";

/// Print the welcome banner
pub(super) fn print_welcome(session_label: &str, language: Language) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    println!("careline v{}", env!("CARGO_PKG_VERSION"));
    stdout.execute(ResetColor)?;
    println!("Customer support chat");
    println!("Session: ...{}", session_label);
    println!("Language: {}", language.strings().display_name);
    println!("Type /help for commands, /exit to leave.");
    println!();
    Ok(())
}

/// Print one conversation message with a colored speaker prefix
pub(super) fn print_message(message: &Message) -> Result<()> {
    let mut stdout = io::stdout();
    let (color, name) = speaker(message.origin);
    stdout.execute(SetForegroundColor(color))?;
    print!("{}", name);
    stdout.execute(ResetColor)?;
    println!(" [{}]: {}", format_time(message), message.text);
    Ok(())
}

pub(super) fn print_messages(messages: &[Message]) -> Result<()> {
    for message in messages {
        print_message(message)?;
    }
    Ok(())
}

/// Print a modal-style alert on stderr
pub(super) fn print_alert(alert: &Alert) -> Result<()> {
    let mut stderr = io::stderr();
    stderr.execute(SetForegroundColor(Color::Red))?;
    eprint!("{}: ", alert.title());
    stderr.execute(ResetColor)?;
    eprintln!("{}", alert.message());
    Ok(())
}

/// Print a dimmed informational line
pub(super) fn print_notice(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::DarkGrey))?;
    println!("{}", text);
    stdout.execute(ResetColor)?;
    Ok(())
}

/// Read user input. `None` means stdin was closed.
pub(super) fn read_user_input() -> Result<Option<String>> {
    prompt_line("you", Color::Green)
}

/// Prompt for a single line. `None` means stdin was closed.
pub(super) fn prompt_line(label: &str, color: Color) -> Result<Option<String>> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(color))?;
    print!("{}: ", label);
    stdout.execute(ResetColor)?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

/// Ask a yes/no question. Anything but y/yes (or a read failure) is no.
pub(super) fn confirm(question: &str) -> bool {
    match prompt_line(&format!("{} [y/N]", question), Color::Yellow) {
        Ok(Some(answer)) => is_yes(&answer),
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read confirmation");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn speaker(origin: Origin) -> (Color, &'static str) {
    match origin {
        Origin::User => (Color::Green, "you"),
        Origin::Assistant => (Color::Cyan, ASSISTANT_NAME),
    }
}

/// Local wall-clock time of a message, `HH:MM`
fn format_time(message: &Message) -> String {
    message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M")
        .to_string()
}
