// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Supported languages and their static UI text.
//!
//! Selecting a language only selects which [`LanguageStrings`] record is
//! active; the records themselves are never edited at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CarelineError;

/// A supported language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (primary)
    #[default]
    En,
    /// Tamil
    Ta,
}

impl Language {
    /// All supported languages, primary first.
    pub const ALL: [Language; 2] = [Language::En, Language::Ta];

    /// Wire/storage code.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ta => "ta",
        }
    }

    /// Parse a stored or user-entered code. Unsupported codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "ta" => Some(Language::Ta),
            _ => None,
        }
    }

    /// The UI text record for this language.
    pub fn strings(self) -> &'static LanguageStrings {
        match self {
            Language::En => &EN_STRINGS,
            Language::Ta => &TA_STRINGS,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CarelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| {
            CarelineError::InvalidInput(format!(
                "unsupported language '{}' (expected one of: en, ta)",
                s
            ))
        })
    }
}

/// UI text for one language.
#[derive(Debug, PartialEq, Eq)]
pub struct LanguageStrings {
    pub display_name: &'static str,
    pub greeting: &'static str,
    pub placeholder: &'static str,
    pub send: &'static str,
    pub request_human: &'static str,
    pub human_form_title: &'static str,
    pub name_label: &'static str,
    pub phone_label: &'static str,
    pub problem_label: &'static str,
    pub submit: &'static str,
    pub cancel: &'static str,
    /// Shown as the assistant message when a send fails
    pub error: &'static str,
    /// Shown in the connectivity alert
    pub connection_error: &'static str,
}

static EN_STRINGS: LanguageStrings = LanguageStrings {
    display_name: "English",
    greeting: "Hello! I'm AstroTamil Assistant. How can I help you with your astrologer queries today?",
    placeholder: "Type your message...",
    send: "Send",
    request_human: "Request Human Agent",
    human_form_title: "Contact Details",
    name_label: "Your Name",
    phone_label: "Contact Number",
    problem_label: "Problem Summary",
    submit: "Submit",
    cancel: "Cancel",
    error: "Sorry, I encountered an error. Please check your connection and try again.",
    connection_error: "Please make sure the chat service is running and reachable.",
};

static TA_STRINGS: LanguageStrings = LanguageStrings {
    display_name: "Tamil",
    greeting: "வணக்கம்! நான் ஆஸ்ட்ரோதமிழ் உதவியாளர். உங்கள் ஜோதிட சந்தேகங்களுக்கு எவ்வாறு உதவ முடியும்?",
    placeholder: "உங்கள் செய்தியை தட்டவும்...",
    send: "அனுப்பு",
    request_human: "மனித முகவரிடம் கேளுங்கள்",
    human_form_title: "தொடர்பு விவரங்கள்",
    name_label: "உங்கள் பெயர்",
    phone_label: "தொடர்பு எண்",
    problem_label: "சிக்கல் சுருக்கம்",
    submit: "சமர்ப்பிக்கவும்",
    cancel: "ரத்துசெய்யவும்",
    error: "மன்னிக்கவும், எனக்கு ஒரு பிழை ஏற்பட்டது. உங்கள் இணைப்பை சரிபார்த்து மீண்டும் முயற்சி செய்யவும்.",
    connection_error: "அரட்டை சேவை இயங்குகிறது என்பதை உறுதி செய்யவும்.",
};
