//! Engine configuration
//!
//! Every probability is a named, overridable value. Tests force them to 0 or
//! 1 to make a policy step deterministic.

use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::{
    ACKNOWLEDGMENT_PROBABILITY, ALTERNATIVES_MIN_TOPICS, ALTERNATIVES_PROBABILITY,
    CALLBACK_MIN_DEPTH, CALLBACK_PROBABILITY, CLOSING_MIN_TOPICS, CLOSING_PROBABILITY,
    FOLLOW_UP_PROBABILITY, MERGE_MAX_WORDS, MERGE_PROBABILITY, OPENER_PROBABILITY,
    OPENING_MAX_DEPTH, PERSONAL_TOUCH_PROBABILITY, QUOTE_PROBABILITY, REORDER_PROBABILITY,
    RESISTANCE_DEPTH_THRESHOLD, RESISTANCE_STEP, TRANSITION_PROBABILITY,
    UNCERTAINTY_PROBABILITY,
};

/// Sam selection policy knobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamConfig {
    pub quote_probability: f64,
    pub alternatives_probability: f64,
    pub closing_probability: f64,
    pub alternatives_min_topics: usize,
    pub closing_min_topics: usize,
    pub opening_max_depth: u32,
    pub resistance_depth_threshold: u32,
    pub resistance_step: f64,
    /// Used when every category has been drawn and nothing matched
    pub default_category: String,
}

impl Default for SamConfig {
    fn default() -> Self {
        Self {
            quote_probability: QUOTE_PROBABILITY,
            alternatives_probability: ALTERNATIVES_PROBABILITY,
            closing_probability: CLOSING_PROBABILITY,
            alternatives_min_topics: ALTERNATIVES_MIN_TOPICS,
            closing_min_topics: CLOSING_MIN_TOPICS,
            opening_max_depth: OPENING_MAX_DEPTH,
            resistance_depth_threshold: RESISTANCE_DEPTH_THRESHOLD,
            resistance_step: RESISTANCE_STEP,
            default_category: "evidence_response".to_string(),
        }
    }
}

/// Naturalizer knobs, shared by both characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NaturalizerConfig {
    pub transition_probability: f64,
    pub callback_probability: f64,
    pub uncertainty_probability: f64,
    pub opener_probability: f64,
    pub acknowledgment_probability: f64,
    pub merge_probability: f64,
    pub reorder_probability: f64,
    pub personal_touch_probability: f64,
    pub merge_max_words: usize,
    pub callback_min_depth: u32,
}

impl Default for NaturalizerConfig {
    fn default() -> Self {
        Self {
            transition_probability: TRANSITION_PROBABILITY,
            callback_probability: CALLBACK_PROBABILITY,
            uncertainty_probability: UNCERTAINTY_PROBABILITY,
            opener_probability: OPENER_PROBABILITY,
            acknowledgment_probability: ACKNOWLEDGMENT_PROBABILITY,
            merge_probability: MERGE_PROBABILITY,
            reorder_probability: REORDER_PROBABILITY,
            personal_touch_probability: PERSONAL_TOUCH_PROBABILITY,
            merge_max_words: MERGE_MAX_WORDS,
            callback_min_depth: CALLBACK_MIN_DEPTH,
        }
    }
}

impl NaturalizerConfig {
    /// Every insertion and restructuring disabled: contractions and marker
    /// stripping only
    pub fn quiet() -> Self {
        Self {
            transition_probability: 0.0,
            callback_probability: 0.0,
            uncertainty_probability: 0.0,
            opener_probability: 0.0,
            acknowledgment_probability: 0.0,
            merge_probability: 0.0,
            reorder_probability: 0.0,
            personal_touch_probability: 0.0,
            ..Self::default()
        }
    }
}

/// Instructor policy knobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InstructorConfig {
    pub follow_up_probability: f64,
    pub introduction_section: String,
    pub closing_section: String,
}

impl Default for InstructorConfig {
    fn default() -> Self {
        Self {
            follow_up_probability: FOLLOW_UP_PROBABILITY,
            introduction_section: "introduction".to_string(),
            closing_section: "closing".to_string(),
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub sam: SamConfig,
    pub naturalizer: NaturalizerConfig,
    pub instructor: InstructorConfig,
}

impl EngineConfig {
    /// Reject probabilities outside [0, 1]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, f64); 12] = [
            ("sam.quote_probability", self.sam.quote_probability),
            ("sam.alternatives_probability", self.sam.alternatives_probability),
            ("sam.closing_probability", self.sam.closing_probability),
            ("naturalizer.transition_probability", self.naturalizer.transition_probability),
            ("naturalizer.callback_probability", self.naturalizer.callback_probability),
            ("naturalizer.uncertainty_probability", self.naturalizer.uncertainty_probability),
            ("naturalizer.opener_probability", self.naturalizer.opener_probability),
            ("naturalizer.acknowledgment_probability", self.naturalizer.acknowledgment_probability),
            ("naturalizer.merge_probability", self.naturalizer.merge_probability),
            ("naturalizer.reorder_probability", self.naturalizer.reorder_probability),
            ("naturalizer.personal_touch_probability", self.naturalizer.personal_touch_probability),
            ("instructor.follow_up_probability", self.instructor.follow_up_probability),
        ];

        for (name, value) in checks {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"sam": {"closing_probability": 1.0}}"#).unwrap();
        assert_eq!(config.sam.closing_probability, 1.0);
        assert_eq!(config.sam.quote_probability, QUOTE_PROBABILITY);
        assert_eq!(config.naturalizer, NaturalizerConfig::default());
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let mut config = EngineConfig::default();
        config.naturalizer.merge_probability = 1.5;
        match config.validate() {
            Err(ConfigError::Probability { name, value }) => {
                assert_eq!(name, "naturalizer.merge_probability");
                assert_eq!(value, 1.5);
            }
            other => panic!("expected probability error, got {:?}", other),
        }
    }
}
