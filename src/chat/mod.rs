// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat flow
//!
//! - `protocol`: one user message in, one assistant message out
//! - `controller`: session, conversation and handoff behind one front-end API
//! - `commands`: slash command parsing for the interactive loop

pub mod commands;
pub mod controller;
pub mod protocol;

pub use commands::{parse_command, ChatCommand};
pub use controller::ChatController;
pub use protocol::{Alert, ChatProtocolClient, ScheduledActivation, SendOutcome};
