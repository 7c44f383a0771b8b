//! Feedback and transcript records produced after a simulation

use serde::{Deserialize, Serialize};
use crate::types::Turn;

/// Simple counts over a finished conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMetrics {
    pub conversation_length: usize,
    pub user_turns: usize,
    pub character_turns: usize,
    /// Mean user message length in characters
    pub average_user_response_length: f64,
}

/// Metrics plus static guidance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub metrics: FeedbackMetrics,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub overall_assessment: String,
}

/// Saved conversation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub user_id: String,
    /// `YYYYmmdd-HHMMSS`
    pub timestamp: String,
    /// Hex SHA-256 of the serialized conversation
    pub digest: String,
    pub conversation: Vec<Turn>,
}
