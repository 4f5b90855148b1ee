// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Human agent handoff
//!
//! A short-lived state machine that collects contact details, validates
//! them locally, submits them, and records the confirmation in the
//! conversation:
//!
//! ```text
//! Inactive -> CollectingDetails -> Submitting -> Confirmed -> Inactive
//!                  ^    |               |
//!                  |    +-- cancel -----+--> Inactive
//!                  +-- failure / rejected --+
//! ```

use std::fmt;

use crate::conversation::{ConversationStore, Message, Origin};
use crate::service::{ChatService, HandoffSubmission};
use crate::session::SessionId;

/// Workflow state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HandoffState {
    #[default]
    Inactive,
    CollectingDetails,
    Submitting,
    /// Transient. `submit` moves on to `Inactive` as soon as the confirmation
    /// is recorded, so callers see this through `HandoffOutcome::Confirmed`.
    Confirmed { reference_number: Option<String> },
}

/// A required handoff field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffField {
    Name,
    Phone,
    Problem,
}

impl fmt::Display for HandoffField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandoffField::Name => "name",
            HandoffField::Phone => "phone",
            HandoffField::Problem => "problem",
        })
    }
}

/// Details being collected for a human agent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HumanHandoffRequest {
    pub name: String,
    pub phone: String,
    pub problem: String,
    /// Assigned by the service on successful submission
    pub reference_number: Option<String>,
}

impl HumanHandoffRequest {
    /// Fields that are empty after trimming, in form order
    pub fn missing_fields(&self) -> Vec<HandoffField> {
        [
            (HandoffField::Name, &self.name),
            (HandoffField::Phone, &self.phone),
            (HandoffField::Problem, &self.problem),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Result of [`HandoffWorkflow::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// The workflow was not collecting details; nothing happened
    NotCollecting,
    /// Local validation failed; no request was sent
    Rejected { missing: Vec<HandoffField> },
    /// The service accepted the request; a confirmation was appended
    Confirmed {
        reference_number: Option<String>,
        confirmation: Message,
    },
    /// The service failed or declined; entered details are kept
    RetryNeeded,
}

impl HandoffOutcome {
    /// Text for the notice shown to the user, if this outcome has one
    pub fn notice(&self) -> Option<String> {
        match self {
            HandoffOutcome::Rejected { .. } => Some("Please fill all fields".to_string()),
            HandoffOutcome::RetryNeeded => {
                Some("Failed to submit request. Please try again.".to_string())
            }
            HandoffOutcome::Confirmed {
                reference_number, ..
            } => Some(match reference_number {
                Some(reference) => format!(
                    "Your request has been submitted. Reference #: {}\n\nAn agent will contact you within 24 hours.",
                    reference
                ),
                None => "Your request has been submitted.\n\nAn agent will contact you within 24 hours."
                    .to_string(),
            }),
            HandoffOutcome::NotCollecting => None,
        }
    }
}

/// Collects, validates and submits a human handoff request
#[derive(Debug, Default)]
pub struct HandoffWorkflow {
    state: HandoffState,
    request: HumanHandoffRequest,
}

impl HandoffWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HandoffState {
        &self.state
    }

    pub fn request(&self) -> &HumanHandoffRequest {
        &self.request
    }

    pub fn is_active(&self) -> bool {
        self.state != HandoffState::Inactive
    }

    /// Open the details form with an empty request. Re-activating while
    /// already collecting keeps what has been entered.
    pub fn activate(&mut self) {
        match self.state {
            HandoffState::Inactive | HandoffState::Confirmed { .. } => {
                self.request = HumanHandoffRequest::default();
                self.state = HandoffState::CollectingDetails;
                tracing::debug!("Handoff details collection started");
            }
            HandoffState::CollectingDetails | HandoffState::Submitting => {}
        }
    }

    /// Discard entered details and return to `Inactive`.
    pub fn cancel(&mut self) {
        if self.state != HandoffState::Inactive {
            tracing::debug!("Handoff cancelled");
        }
        self.request = HumanHandoffRequest::default();
        self.state = HandoffState::Inactive;
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        self.edit(|r| r.name = name.into())
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) -> bool {
        self.edit(|r| r.phone = phone.into())
    }

    pub fn set_problem(&mut self, problem: impl Into<String>) -> bool {
        self.edit(|r| r.problem = problem.into())
    }

    /// Set a field by kind. Returns `false` when not collecting details.
    pub fn set_field(&mut self, field: HandoffField, value: impl Into<String>) -> bool {
        match field {
            HandoffField::Name => self.set_name(value),
            HandoffField::Phone => self.set_phone(value),
            HandoffField::Problem => self.set_problem(value),
        }
    }

    fn edit(&mut self, f: impl FnOnce(&mut HumanHandoffRequest)) -> bool {
        if self.state != HandoffState::CollectingDetails {
            return false;
        }
        f(&mut self.request);
        true
    }

    /// Validate and submit the collected details.
    pub async fn submit(
        &mut self,
        service: &dyn ChatService,
        session_id: &SessionId,
        conversation: &ConversationStore,
    ) -> HandoffOutcome {
        if self.state != HandoffState::CollectingDetails {
            return HandoffOutcome::NotCollecting;
        }

        let missing = self.request.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(?missing, "Handoff submission rejected locally");
            return HandoffOutcome::Rejected { missing };
        }

        self.state = HandoffState::Submitting;
        let submission = HandoffSubmission {
            session_id: session_id.to_string(),
            name: self.request.name.trim().to_string(),
            phone: self.request.phone.trim().to_string(),
            problem_summary: self.request.problem.trim().to_string(),
        };

        let receipt = match service.request_human(&submission).await {
            Ok(receipt) if receipt.success => receipt,
            Ok(receipt) => {
                tracing::warn!(message = ?receipt.message, "Handoff request was not accepted");
                self.state = HandoffState::CollectingDetails;
                return HandoffOutcome::RetryNeeded;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error submitting human request");
                self.state = HandoffState::CollectingDetails;
                return HandoffOutcome::RetryNeeded;
            }
        };

        let reference_number = receipt.reference_number;
        self.request.reference_number = reference_number.clone();
        self.state = HandoffState::Confirmed {
            reference_number: reference_number.clone(),
        };
        tracing::info!(reference = ?reference_number, "Handoff request confirmed");

        let text = confirmation_text(&submission, reference_number.as_deref());
        let confirmation = conversation.append_new(Origin::Assistant, text);

        self.request = HumanHandoffRequest::default();
        self.state = HandoffState::Inactive;
        tracing::debug!(confirmation = %confirmation.id, "Handoff closed after confirmation");

        HandoffOutcome::Confirmed {
            reference_number,
            confirmation,
        }
    }
}

fn confirmation_text(submission: &HandoffSubmission, reference: Option<&str>) -> String {
    match reference {
        Some(reference) => format!(
            "Thank you {}! Your request (#{}) has been submitted. Our agent will contact you at {}.",
            submission.name, reference, submission.phone
        ),
        None => format!(
            "Thank you {}! Your request has been submitted. Our agent will contact you at {}.",
            submission.name, submission.phone
        ),
    }
}
