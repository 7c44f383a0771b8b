//! Reply structure returned by both selectors

use serde::{Deserialize, Serialize};
use crate::types::{SelectionRule, Speaker};

/// One generated reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub speaker: Speaker,
    /// Final, naturalized text
    pub text: String,
    /// Category or section the text was drawn from (`None` for fallbacks)
    pub source: Option<String>,
    pub rule: SelectionRule,
}

impl Reply {
    pub fn new(
        speaker: Speaker,
        text: impl Into<String>,
        source: Option<String>,
        rule: SelectionRule,
    ) -> Self {
        Self {
            speaker,
            text: text.into(),
            source,
            rule,
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "{}: {} [source={} | rule={}]",
            self.speaker,
            self.text,
            self.source.as_deref().unwrap_or("-"),
            self.rule.code()
        )
    }
}
