// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Careline - customer support chat from your terminal
//!
//! Entry point for the careline CLI application.

use std::sync::Arc;

use clap::Parser;

use careline::chat::ChatController;
use careline::cli::{Cli, Commands};
use careline::config::Settings;
use careline::error::Result;
use careline::service::HttpChatService;
use careline::store::{FileStore, KeyValueStore, MemoryStore};

#[path = "main/chat_loop.rs"]
mod chat_loop;
#[path = "main/cli_commands.rs"]
mod cli_commands;
#[path = "main/display.rs"]
mod display;

use chat_loop::run_chat;
use cli_commands::{
    run_history, run_language, run_new, run_send, run_session, run_settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on the crate's own diagnostics. `RUST_LOG` still applies.
    if cli.verbose > 0 {
        let directive = if cli.verbose > 1 {
            "careline=trace"
        } else {
            "careline=debug"
        };
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(url) = &cli.api_url {
        apply_base_url_override(&mut settings, url);
    }
    settings.validate()?;

    let format = cli.format;
    match cli.command {
        None | Some(Commands::Chat) => {
            let controller = build_controller(&settings)?;
            run_chat(controller).await?;
        }
        Some(Commands::Send(args)) => {
            let controller = build_controller(&settings)?;
            run_send(controller, &args.text(), format).await?;
        }
        Some(Commands::History) => {
            let controller = build_controller(&settings)?;
            run_history(controller, format).await?;
        }
        Some(Commands::New(args)) => {
            let controller = build_controller(&settings)?;
            run_new(controller, args.yes).await?;
        }
        Some(Commands::Language(args)) => {
            let controller = build_controller(&settings)?;
            run_language(controller, args.code, format).await?;
        }
        Some(Commands::Session) => {
            let controller = build_controller(&settings)?;
            run_session(controller, format).await?;
        }
        Some(Commands::Settings) => {
            run_settings(&settings, cli.config.as_deref(), format)?;
        }
    }

    Ok(())
}

/// A `--api-url` flag beats both the settings file and the environment.
fn apply_base_url_override(settings: &mut Settings, url: &str) {
    settings.service.base_url = url.to_string();
    settings.service.base_url_env = String::new();
}

fn build_controller(settings: &Settings) -> Result<ChatController> {
    let service = HttpChatService::from_settings(settings)?;
    tracing::debug!(base_url = service.base_url(), "Using chat service");
    Ok(ChatController::new(
        settings,
        Arc::new(service),
        open_store(),
    ))
}

/// File store under the careline home, or a process-lifetime store when the
/// home directory cannot be created.
fn open_store() -> Arc<dyn KeyValueStore> {
    match Settings::ensure_directories() {
        Ok(()) => Arc::new(FileStore::open()),
        Err(e) => {
            tracing::warn!(
                error = %e,
                home = %Settings::careline_home().display(),
                "Careline home is unusable, session will not be saved"
            );
            Arc::new(MemoryStore::new())
        }
    }
}
