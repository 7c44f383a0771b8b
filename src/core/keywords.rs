//! Keyword tables: trigger term -> categories, sections, emotion tags
//!
//! Single-word triggers hit when any lowercase token contains them
//! ("staffing" hits "staff"). Multi-word triggers hit on the raw lowercase
//! text. Results are de-duplicated in table order.

use std::collections::BTreeSet;
use lazy_static::lazy_static;
use regex::Regex;
use crate::core::naturalizer::{split_sentences, trim_terminal};
use crate::types::Emotion;

lazy_static! {
    static ref RE_TOKEN: Regex = Regex::new(r"[a-z0-9']+").unwrap();
}

/// Ordered trigger table
#[derive(Debug)]
pub struct KeywordTable<T: 'static> {
    entries: &'static [(&'static str, &'static [T])],
}

impl<T: Copy + PartialEq> KeywordTable<T> {
    pub const fn new(entries: &'static [(&'static str, &'static [T])]) -> Self {
        Self { entries }
    }

    /// Every target whose trigger appears in `text`
    pub fn matches(&self, text: &str) -> Vec<T> {
        let lower = text.to_lowercase();
        let tokens = tokenize(&lower);
        let mut found: Vec<T> = Vec::new();

        for (keyword, targets) in self.entries {
            if !keyword_hit(keyword, &lower, &tokens) {
                continue;
            }
            for target in targets.iter() {
                if !found.contains(target) {
                    found.push(*target);
                }
            }
        }
        found
    }

}

/// Lowercase word tokens, punctuation dropped
pub fn tokenize(lower: &str) -> Vec<&str> {
    RE_TOKEN.find_iter(lower).map(|m| m.as_str()).collect()
}

fn keyword_hit(keyword: &str, lower: &str, tokens: &[&str]) -> bool {
    if keyword.contains(' ') {
        lower.contains(keyword)
    } else {
        tokens.iter().any(|t| t.contains(keyword))
    }
}

// =============================================================================
// SAM: objection categories
// =============================================================================

pub static SAM_KEYWORDS: KeywordTable<&'static str> = KeywordTable::new(&[
    ("staff", &["staffing_issues"]),
    ("officer", &["staffing_issues"]),
    ("manpower", &["staffing_issues"]),
    ("security", &["security_concerns"]),
    ("risk", &["security_concerns", "inmate_resistance"]),
    ("space", &["space_limitations"]),
    ("room", &["space_limitations"]),
    ("facility", &["space_limitations", "security_concerns"]),
    ("paperwork", &["paperwork_burden"]),
    ("documentation", &["paperwork_burden"]),
    ("consent", &["paperwork_burden", "inmate_resistance"]),
    ("budget", &["budget_concerns"]),
    ("cost", &["budget_concerns"]),
    ("money", &["budget_concerns"]),
    ("expense", &["budget_concerns"]),
    ("inmate", &["inmate_resistance"]),
    ("refuse", &["inmate_resistance"]),
    ("voluntary", &["inmate_resistance"]),
    ("schedule", &["scheduling_disruptions"]),
    ("time", &["scheduling_disruptions"]),
    ("routine", &["scheduling_disruptions"]),
    ("previous", &["past_failures"]),
    ("before", &["past_failures"]),
    ("last year", &["past_failures"]),
    ("evidence", &["evidence_response"]),
    ("data", &["evidence_response"]),
    ("research", &["evidence_response"]),
    ("alternative", &["alternative_suggestions"]),
    ("option", &["alternative_suggestions"]),
    ("compromise", &["alternative_suggestions"]),
]);

/// Words marking a student sentence worth calling back to
pub const KEY_POINT_MARKERS: &[&str] = &[
    "important",
    "critical",
    "necessary",
    "need",
    "should",
    "must",
    "benefit",
    "advantage",
    "solution",
];

/// Sentences of `text` containing a marker word and more than 3 words,
/// without their closing punctuation
pub fn extract_key_points(text: &str) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| {
            let lower = s.to_lowercase();
            KEY_POINT_MARKERS.iter().any(|m| lower.contains(m))
        })
        .filter(|s| s.split_whitespace().count() > 3)
        .map(|s| trim_terminal(&s).to_string())
        .collect()
}

// =============================================================================
// INSTRUCTOR: sections and emotions
// =============================================================================

pub static INSTRUCTOR_KEYWORDS: KeywordTable<&'static str> = KeywordTable::new(&[
    ("objective", &["objectives"]),
    ("goal", &["objectives"]),
    ("purpose", &["objectives"]),
    ("background", &["scenario_background"]),
    ("context", &["scenario_background"]),
    ("scenario", &["scenario_background"]),
    ("sam", &["character_profile"]),
    ("character", &["character_profile"]),
    ("manager", &["character_profile"]),
    ("prepare", &["preparation_tips"]),
    ("tips", &["preparation_tips"]),
    ("advice", &["preparation_tips"]),
    ("strategy", &["preparation_tips"]),
]);

pub static EMOTION_KEYWORDS: KeywordTable<Emotion> = KeywordTable::new(&[
    ("frustrating", &[Emotion::Frustration]),
    ("annoyed", &[Emotion::Frustration]),
    ("difficult", &[Emotion::Frustration]),
    ("hard", &[Emotion::Frustration]),
    ("challenging", &[Emotion::Frustration]),
    ("unsure", &[Emotion::Uncertainty]),
    ("uncertain", &[Emotion::Uncertainty]),
    ("confused", &[Emotion::Uncertainty]),
    ("don't know", &[Emotion::Uncertainty]),
    ("unclear", &[Emotion::Uncertainty]),
    ("determined", &[Emotion::Determination]),
    ("committed", &[Emotion::Determination]),
    ("focused", &[Emotion::Determination]),
    ("persistence", &[Emotion::Determination]),
    ("tried", &[Emotion::Determination]),
]);

/// Emotion tags present in `text`
pub fn detect_emotions(text: &str) -> BTreeSet<Emotion> {
    EMOTION_KEYWORDS.matches(text).into_iter().collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_contains_keyword() {
        let hits = SAM_KEYWORDS.matches("We are short-staffed on weekends.");
        assert_eq!(hits, vec!["staffing_issues"]);
    }

    #[test]
    fn test_multi_category_keyword_deduplicates() {
        let hits = SAM_KEYWORDS.matches("The risk to the facility is low.");
        assert_eq!(
            hits,
            vec!["security_concerns", "inmate_resistance", "space_limitations"]
        );
    }

    #[test]
    fn test_phrase_keyword_on_raw_text() {
        let hits = SAM_KEYWORDS.matches("What happened LAST YEAR?");
        assert!(hits.contains(&"past_failures"));
    }

    #[test]
    fn test_short_tokens_do_not_match_long_keywords() {
        // "a" is inside "data" but must not trigger evidence_response
        assert!(SAM_KEYWORDS.matches("a b c").is_empty());
    }

    #[test]
    fn test_no_keywords() {
        assert!(SAM_KEYWORDS.matches("Hello there, how are you?").is_empty());
    }

    #[test]
    fn test_instructor_keywords() {
        let hits = INSTRUCTOR_KEYWORDS.matches("What are the goals, and any tips?");
        assert_eq!(hits, vec!["objectives", "preparation_tips"]);
    }

    #[test]
    fn test_emotion_detection_is_a_set() {
        let emotions = detect_emotions("It was hard and frustrating, and I don't know why.");
        assert_eq!(emotions.len(), 2);
        assert!(emotions.contains(&Emotion::Frustration));
        assert!(emotions.contains(&Emotion::Uncertainty));
        assert!(!emotions.contains(&Emotion::Determination));
    }

    #[test]
    fn test_key_points_need_marker_and_length() {
        let points = extract_key_points(
            "Vaccination is important for everyone here. Must act. It is sunny today.",
        );
        assert_eq!(points, vec!["Vaccination is important for everyone here"]);
    }
}
