// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::Path;

use careline::chat::{ChatController, SendOutcome};
use careline::cli::OutputFormat;
use careline::config::Settings;
use careline::error::Result;
use careline::i18n::Language;
use careline::service::ReplyKind;

use super::display::{confirm, print_alert, print_message, print_messages, print_notice};

/// Send one message and print the reply
pub(super) async fn run_send(
    mut controller: ChatController,
    text: &str,
    format: OutputFormat,
) -> Result<()> {
    controller.start().await;

    match controller.send_message(text).await? {
        SendOutcome::Replied { reply, kind, .. } => {
            let wants_agent = kind == ReplyKind::CollectHumanDetails;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "reply": reply,
                        "collect_human_details": wants_agent,
                    }))?
                ),
                OutputFormat::Text => {
                    print_message(&reply)?;
                    if wants_agent {
                        print_notice(
                            "An agent can call you back. Run `careline chat` and type /agent.",
                        )?;
                    }
                }
            }
        }
        SendOutcome::Failed { message, alert } => match format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "error": message.text,
                    "alert": alert.as_ref().map(|a| a.message()),
                }))?
            ),
            OutputFormat::Text => {
                print_message(&message)?;
                if let Some(alert) = &alert {
                    print_alert(alert)?;
                }
            }
        },
        SendOutcome::Ignored => print_notice("Nothing to send.")?,
        SendOutcome::Busy => print_notice("A message is already being sent.")?,
    }

    Ok(())
}

/// Print the conversation for the current session
pub(super) async fn run_history(mut controller: ChatController, format: OutputFormat) -> Result<()> {
    controller.start().await;
    let messages = controller.conversation().messages();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&messages)?),
        OutputFormat::Text => print_messages(&messages)?,
    }
    Ok(())
}

/// Replace the session id, asking first unless `yes` is set
pub(super) async fn run_new(mut controller: ChatController, yes: bool) -> Result<()> {
    controller.start().await;
    let started = controller
        .start_new_chat(|| yes || confirm("Start a new chat? The current conversation will be cleared."))
        .await;

    match started {
        Some(session) => println!("New chat started. Session: {}", session.id),
        None => print_notice("Cancelled.")?,
    }
    Ok(())
}

/// Print or change the preferred language
pub(super) async fn run_language(
    mut controller: ChatController,
    code: Option<Language>,
    format: OutputFormat,
) -> Result<()> {
    controller.start().await;
    if let Some(language) = code {
        controller.change_language(language).await?;
    }

    let language = controller.language();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "language": language,
                "display_name": language.strings().display_name,
            }))?
        ),
        OutputFormat::Text => println!(
            "Language: {} ({})",
            language.strings().display_name,
            language.code()
        ),
    }
    Ok(())
}

/// Print the session id and language
pub(super) async fn run_session(mut controller: ChatController, format: OutputFormat) -> Result<()> {
    let session = controller.start().await;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "session_id": session.id,
                "language": session.language,
                "messages": controller.conversation().len(),
            }))?
        ),
        OutputFormat::Text => {
            println!("Session: {}", session.id);
            println!("Language: {}", session.language.strings().display_name);
            println!("Messages: {}", controller.conversation().len());
        }
    }
    Ok(())
}

/// Print the effective settings
pub(super) fn run_settings(
    settings: &Settings,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let default_path = Settings::default_path();
    let path = config_path.unwrap_or(&default_path);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(settings)?),
        OutputFormat::Text => {
            println!("Settings file: {}", path.display());
            println!("Store file: {}", Settings::store_path().display());
            println!("Service URL: {}", settings.get_base_url());
            if !settings.service.base_url_env.is_empty() {
                println!(
                    "  (env {} overrides service.base_url)",
                    settings.service.base_url_env
                );
            }
            println!("Request timeout: {}s", settings.service.timeout_secs);
            println!("Session id namespace: {}", settings.session.id_namespace);
            println!(
                "Handoff form delay: {}ms",
                settings.handoff.activation_delay_ms
            );
        }
    }
    Ok(())
}
