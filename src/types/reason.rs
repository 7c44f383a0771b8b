//! Rule codes: which step of a selection policy produced a reply

use serde::{Deserialize, Serialize};

/// Selection rules, in the order the policies evaluate them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum SelectionRule {
    // =========================================================================
    // S1xx: Sam policy
    // =========================================================================
    /// Category requested directly by the caller
    S100_DIRECT,
    /// Early turn without keywords, opening stance
    S101_OPENING,
    /// Quoted the student's words, then answered a matched topic
    S102_QUOTED_CALLBACK,
    /// A matched topic that had not been raised yet
    S103_NEW_TOPIC,
    /// Enough objections raised, steering to alternatives
    S104_ALTERNATIVES,
    /// Most objections raised, moving to close
    S105_CLOSING,
    /// Re-answering an already addressed topic
    S106_MATCHED,
    /// No keywords, drawing from an unused category
    S107_UNUSED,
    /// Nothing left, default category
    S108_DEFAULT,
    /// Category missing from the script, apology text
    S109_FALLBACK,

    // =========================================================================
    // I2xx: Instructor policy
    // =========================================================================
    /// Section requested directly by the caller
    I200_DIRECT,
    /// First section of a dialogue
    I201_INTRODUCTION,
    /// Keyword routed to a section
    I202_KEYWORD,
    /// Next uncovered section
    I203_PROGRESSION,
    /// Follow-up connective plus next section
    I204_FOLLOW_UP,
    /// Every section covered, closing
    I205_CLOSING,
}

impl SelectionRule {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::S100_DIRECT => "S100_DIRECT",
            Self::S101_OPENING => "S101_OPENING",
            Self::S102_QUOTED_CALLBACK => "S102_QUOTED_CALLBACK",
            Self::S103_NEW_TOPIC => "S103_NEW_TOPIC",
            Self::S104_ALTERNATIVES => "S104_ALTERNATIVES",
            Self::S105_CLOSING => "S105_CLOSING",
            Self::S106_MATCHED => "S106_MATCHED",
            Self::S107_UNUSED => "S107_UNUSED",
            Self::S108_DEFAULT => "S108_DEFAULT",
            Self::S109_FALLBACK => "S109_FALLBACK",
            Self::I200_DIRECT => "I200_DIRECT",
            Self::I201_INTRODUCTION => "I201_INTRODUCTION",
            Self::I202_KEYWORD => "I202_KEYWORD",
            Self::I203_PROGRESSION => "I203_PROGRESSION",
            Self::I204_FOLLOW_UP => "I204_FOLLOW_UP",
            Self::I205_CLOSING => "I205_CLOSING",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::S100_DIRECT => "Requested category",
            Self::S101_OPENING => "Opening stance",
            Self::S102_QUOTED_CALLBACK => "Quoted the student",
            Self::S103_NEW_TOPIC => "New objection",
            Self::S104_ALTERNATIVES => "Suggesting alternatives",
            Self::S105_CLOSING => "Closing remarks",
            Self::S106_MATCHED => "Revisited objection",
            Self::S107_UNUSED => "Unprompted objection",
            Self::S108_DEFAULT => "Default category",
            Self::S109_FALLBACK => "Unknown category",
            Self::I200_DIRECT => "Requested section",
            Self::I201_INTRODUCTION => "Introduction",
            Self::I202_KEYWORD => "Answered a question",
            Self::I203_PROGRESSION => "Next section",
            Self::I204_FOLLOW_UP => "Followed up",
            Self::I205_CLOSING => "Closing",
        }
    }
}

impl std::fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
