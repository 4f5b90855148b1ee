// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crossterm::style::Color;

use careline::chat::commands::{format_help_text, is_cancel_command};
use careline::chat::{parse_command, ChatCommand, ChatController, SendOutcome};
use careline::error::Result;
use careline::handoff::{HandoffField, HandoffOutcome};
use careline::i18n::Language;

use super::display::{
    confirm, print_alert, print_message, print_messages, print_notice, print_welcome, prompt_line,
    read_user_input,
};

/// Run the interactive chat loop until the user exits or stdin closes.
pub(super) async fn run_chat(mut controller: ChatController) -> Result<()> {
    let session = controller.start().await;
    print_welcome(session.id.short(), session.language)?;
    print_messages(&controller.conversation().messages())?;

    loop {
        let Some(line) = read_user_input()? else {
            break;
        };

        match parse_command(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Exit => break,
            ChatCommand::Help => println!("{}\n", format_help_text()),
            ChatCommand::New => {
                let started = controller
                    .start_new_chat(|| {
                        confirm("Start a new chat? The current conversation will be cleared.")
                    })
                    .await;
                if let Some(session) = started {
                    print_notice(&format!("New chat started (session ...{})", session.id.short()))?;
                    print_messages(&controller.conversation().messages())?;
                }
            }
            ChatCommand::History => print_messages(&controller.conversation().messages())?,
            ChatCommand::Session => {
                if let Some(session) = controller.session() {
                    print_notice(&format!(
                        "Session: {}\nLanguage: {}",
                        session.id,
                        session.language.strings().display_name
                    ))?;
                }
            }
            ChatCommand::Language(code) => match Language::from_code(&code) {
                Some(language) => {
                    let notice = controller.change_language(language).await?;
                    print_message(&notice)?;
                }
                None => print_notice(&format!(
                    "Unsupported language '{}'. Available: {}",
                    code,
                    language_codes()
                ))?,
            },
            ChatCommand::Agent => {
                controller.activate_handoff();
                collect_handoff(&mut controller).await?;
            }
            ChatCommand::Unknown(cmd) => {
                print_notice(&format!("Unknown command: {}. Type /help for commands.", cmd))?
            }
            ChatCommand::Message(text) => send(&mut controller, &text).await?,
        }
    }

    Ok(())
}

async fn send(controller: &mut ChatController, text: &str) -> Result<()> {
    match controller.send_message(text).await? {
        SendOutcome::Replied { reply, handoff, .. } => {
            print_message(&reply)?;
            if let Some(activation) = handoff {
                if controller.complete_scheduled_handoff(activation).await {
                    collect_handoff(controller).await?;
                }
            }
        }
        SendOutcome::Failed { message, alert } => {
            print_message(&message)?;
            if let Some(alert) = alert {
                print_alert(&alert)?;
            }
        }
        SendOutcome::Ignored | SendOutcome::Busy => {}
    }
    Ok(())
}

/// Prompt for handoff details until they are submitted or the user cancels.
async fn collect_handoff(controller: &mut ChatController) -> Result<()> {
    let strings = controller.language().strings();
    print_notice(&format!("{} (type /cancel to stop)", strings.human_form_title))?;

    loop {
        let missing = controller.handoff().request().missing_fields();
        for field in missing {
            let label = match field {
                HandoffField::Name => strings.name_label,
                HandoffField::Phone => strings.phone_label,
                HandoffField::Problem => strings.problem_label,
            };
            let value = match prompt_line(label, Color::Yellow)? {
                Some(value) if !is_cancel_command(&value) => value,
                _ => {
                    controller.cancel_handoff();
                    print_notice("Request cancelled.")?;
                    return Ok(());
                }
            };
            controller.handoff_mut().set_field(field, value);
        }

        let outcome = controller.submit_handoff().await;
        if let Some(notice) = outcome.notice() {
            print_notice(&notice)?;
        }

        match outcome {
            HandoffOutcome::Confirmed { confirmation, .. } => {
                print_message(&confirmation)?;
                return Ok(());
            }
            HandoffOutcome::Rejected { .. } => continue,
            HandoffOutcome::RetryNeeded => {
                if !confirm("Try again?") {
                    controller.cancel_handoff();
                    return Ok(());
                }
            }
            HandoffOutcome::NotCollecting => return Ok(()),
        }
    }
}

fn language_codes() -> String {
    Language::ALL
        .iter()
        .map(|l| l.code())
        .collect::<Vec<_>>()
        .join(", ")
}
