//! Post-simulation feedback
//!
//! Counts over the simulation history plus fixed guidance text. The guidance
//! does not depend on what was said.

use std::collections::BTreeMap;
use std::fmt::Write;
use crate::types::{ConversationHistory, Feedback, FeedbackMetrics};

const STRENGTHS: &[&str] = &[
    "You maintained a professional tone throughout the conversation.",
    "You persisted despite encountering resistance.",
];

const AREAS_FOR_IMPROVEMENT: &[&str] = &[
    "Consider addressing underlying concerns more directly.",
    "Try using more data-driven arguments to support your position.",
];

const OVERALL_ASSESSMENT: &str = "You demonstrated persistence in addressing resistance.";

/// Turn counts and mean user message length (characters)
pub fn compute_metrics(history: &ConversationHistory) -> FeedbackMetrics {
    let user_turns = history.user_turns().count();
    let user_chars: usize = history.user_turns().map(|t| t.text.chars().count()).sum();

    FeedbackMetrics {
        conversation_length: history.len(),
        user_turns,
        character_turns: history.len() - user_turns,
        average_user_response_length: user_chars as f64 / user_turns.max(1) as f64,
    }
}

pub fn generate_feedback(history: &ConversationHistory) -> Feedback {
    Feedback {
        metrics: compute_metrics(history),
        strengths: STRENGTHS.iter().map(|s| s.to_string()).collect(),
        areas_for_improvement: AREAS_FOR_IMPROVEMENT.iter().map(|s| s.to_string()).collect(),
        overall_assessment: OVERALL_ASSESSMENT.to_string(),
    }
}

/// Plain-text evaluation report. Reflection answers are appended when given.
pub fn render_report(feedback: &Feedback, reflection: Option<&BTreeMap<String, String>>) -> String {
    let mut out = String::new();
    let m = &feedback.metrics;

    // Writing to a String cannot fail
    let _ = writeln!(out, "SIMULATION EVALUATION REPORT");
    let _ = writeln!(out, "============================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Conversation summary");
    let _ = writeln!(out, "  Total exchanges:         {}", m.conversation_length);
    let _ = writeln!(out, "  Your responses:          {}", m.user_turns);
    let _ = writeln!(out, "  Character responses:     {}", m.character_turns);
    let _ = writeln!(
        out,
        "  Average response length: {} characters",
        m.average_user_response_length as usize
    );

    section(&mut out, "Strengths", &feedback.strengths);
    section(&mut out, "Areas for improvement", &feedback.areas_for_improvement);

    let _ = writeln!(out);
    let _ = writeln!(out, "Overall assessment");
    let _ = writeln!(out, "  {}", feedback.overall_assessment);

    if let Some(answers) = reflection.filter(|r| !r.is_empty()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Self-reflection");
        for (question, answer) in answers {
            let _ = writeln!(out, "  Q: {}", question);
            let _ = writeln!(out, "  A: {}", answer);
        }
    }
    out
}

fn section(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Speaker, Turn};
    use pretty_assertions::assert_eq;

    fn history() -> ConversationHistory {
        let mut h = ConversationHistory::new();
        h.push(Turn::new(Speaker::Sam, "What do you want?"));
        h.push(Turn::new(Speaker::User, "abcd"));
        h.push(Turn::new(Speaker::Sam, "No."));
        h.push(Turn::new(Speaker::User, "abcdefgh"));
        h.push(Turn::new(Speaker::Sam, "Still no."));
        h
    }

    #[test]
    fn test_metrics() {
        let metrics = compute_metrics(&history());
        assert_eq!(
            metrics,
            FeedbackMetrics {
                conversation_length: 5,
                user_turns: 2,
                character_turns: 3,
                average_user_response_length: 6.0,
            }
        );
    }

    #[test]
    fn test_no_user_turns_does_not_divide_by_zero() {
        let mut h = ConversationHistory::new();
        h.push(Turn::new(Speaker::Sam, "Hello?"));
        let metrics = compute_metrics(&h);
        assert_eq!(metrics.user_turns, 0);
        assert_eq!(metrics.average_user_response_length, 0.0);
        assert_eq!(compute_metrics(&ConversationHistory::new()).conversation_length, 0);
    }

    #[test]
    fn test_character_count_not_bytes() {
        let mut h = ConversationHistory::new();
        h.push(Turn::new(Speaker::User, "héé"));
        assert_eq!(compute_metrics(&h).average_user_response_length, 3.0);
    }

    #[test]
    fn test_report_sections() {
        let feedback = generate_feedback(&history());
        let mut reflection = BTreeMap::new();
        reflection.insert(
            "What would you do differently?".to_string(),
            "Lead with the outbreak data.".to_string(),
        );

        let report = render_report(&feedback, Some(&reflection));
        assert!(report.contains("Total exchanges:         5"));
        assert!(report.contains("  - You persisted despite encountering resistance."));
        assert!(report.contains("Q: What would you do differently?"));
        assert!(report.contains("A: Lead with the outbreak data."));

        let bare = render_report(&feedback, None);
        assert!(!bare.contains("Self-reflection"));
    }
}
