//! Sam engine: keyword-driven selection for the resistant character
//!
//! Policy, evaluated top to bottom on each student turn:
//! 1. match keywords to objection categories
//! 2. early turn, no keywords, opening unused -> opening stance
//! 3. sometimes quote the student, then answer a matched topic
//! 4. prefer matched topics not raised yet
//! 5. past depth 6, ease resistance (state only)
//! 6. enough topics -> sometimes suggest alternatives
//! 7. most topics -> sometimes close
//! 8. any matched topic
//! 9. an unused category, else the default category

use std::sync::Arc;
use tracing::{debug, warn};
use crate::core::dice::{RandomSource, StdDice};
use crate::core::keywords::{extract_key_points, SAM_KEYWORDS};
use crate::core::naturalizer::{
    capture_phrase, fill, quote_snippet, NaturalContext, Naturalizer, Register, OPENING_CATEGORY,
};
use crate::types::{
    EngineConfig, NaturalizerConfig, Reply, SamConfig, SamScript, SamState, SelectionRule, Speaker,
};

pub const ALTERNATIVES_CATEGORY: &str = "alternative_suggestions";
pub const CLOSING_CATEGORY: &str = "closing_remarks";

/// Spoken when a category is missing from the script
pub const APOLOGY_TEXT: &str =
    "I'm not sure what to say about that. Let's get back to discussing this vaccination program.";

const FALLBACK_CATEGORY: &str = "fallback";

const QUOTE_TEMPLATES: &[&str] = &[
    "When you say '{}', that's exactly the kind of thinking that doesn't work here.",
    "'{}'? That sounds good in theory, but in practice...",
    "I hear you talking about '{}', but you're missing the bigger picture.",
    "That part about '{}' - that's where I have concerns.",
];

/// Response selector for one simulation dialogue
#[derive(Debug)]
pub struct SamEngine<R: RandomSource = StdDice> {
    script: Arc<SamScript>,
    config: SamConfig,
    naturalizer: Naturalizer,
    state: SamState,
    dice: R,
}

impl SamEngine<StdDice> {
    /// Engine with production randomness, seeded when `seed` is given
    pub fn new(script: Arc<SamScript>, config: &EngineConfig, seed: Option<u64>) -> Self {
        Self::with_dice(
            script,
            config.sam.clone(),
            config.naturalizer.clone(),
            StdDice::new(seed),
        )
    }
}

impl<R: RandomSource> SamEngine<R> {
    pub fn with_dice(
        script: Arc<SamScript>,
        config: SamConfig,
        naturalizer: NaturalizerConfig,
        dice: R,
    ) -> Self {
        Self {
            script,
            config,
            naturalizer: Naturalizer::new(naturalizer),
            state: SamState::new(),
            dice,
        }
    }

    pub fn state(&self) -> &SamState {
        &self.state
    }

    pub fn script(&self) -> &SamScript {
        &self.script
    }

    /// Naturalized text from `category`, avoiding the last few variants
    pub fn get_response(&mut self, category: &str) -> String {
        let script = Arc::clone(&self.script);

        let (text, ctx_category) = match script.variants(category) {
            Some(variants) => {
                let fresh: Vec<&String> = variants
                    .iter()
                    .filter(|v| !self.state.previous_responses.contains(*v))
                    .collect();
                let candidates: Vec<&String> = if fresh.is_empty() {
                    variants.iter().collect()
                } else {
                    fresh
                };

                let variant = match self.dice.pick(&candidates) {
                    Some(v) => (*v).clone(),
                    None => APOLOGY_TEXT.to_string(),
                };

                self.state.previous_responses.push(variant.clone());
                self.state.used_categories.insert(category.to_string());
                self.state.last_category = Some(category.to_string());
                (variant, category)
            }
            None => {
                warn!(category, "category missing from script, using apology");
                (APOLOGY_TEXT.to_string(), FALLBACK_CATEGORY)
            }
        };

        let ctx = NaturalContext {
            category: Some(ctx_category),
            key_phrases: Some(&self.state.key_phrases),
            depth: self.state.conversation_depth,
            ..Default::default()
        };
        let response = self
            .naturalizer
            .naturalize(&text, Register::Sam, &ctx, &mut self.dice);

        if ctx_category != OPENING_CATEGORY {
            if let Some(phrase) = capture_phrase(&response, &mut self.dice, (3, 5)) {
                self.state.key_phrases.push(phrase);
            }
        }

        response
    }

    /// Text-only reply to a student turn
    pub fn process_user_input(&mut self, text: &str) -> String {
        self.respond(text).text
    }

    /// Reply to a student turn, with the category and rule that produced it
    pub fn respond(&mut self, text: &str) -> Reply {
        self.state.last_user_input = Some(text.to_string());
        for point in extract_key_points(text) {
            self.state.key_phrases.push(point);
        }
        self.state.conversation_depth += 1;

        let matched = SAM_KEYWORDS.matches(text);
        debug!(depth = self.state.conversation_depth, ?matched, "sam input");

        if self.state.conversation_depth < self.config.opening_max_depth
            && matched.is_empty()
            && !self.state.has_used(OPENING_CATEGORY)
        {
            return self.answer(OPENING_CATEGORY, SelectionRule::S101_OPENING);
        }

        if !matched.is_empty() && self.dice.chance(self.config.quote_probability) {
            if let Some(snippet) = quote_snippet(text, &mut self.dice, 4, 8, (3, 5)) {
                let template = self.dice.pick(QUOTE_TEMPLATES).copied().unwrap_or(QUOTE_TEMPLATES[0]);
                let quote = fill(template, &snippet);
                if let Some(category) = self.dice.pick(&matched).copied() {
                    let mut reply = self.answer(category, SelectionRule::S102_QUOTED_CALLBACK);
                    reply.text = format!("{} {}", quote, reply.text);
                    return reply;
                }
            }
        }

        let new_topics: Vec<&'static str> = matched
            .iter()
            .copied()
            .filter(|c| !self.state.topics_addressed.contains(*c))
            .collect();
        if !new_topics.is_empty() {
            for topic in &new_topics {
                self.state.topics_addressed.insert(topic.to_string());
            }
            if let Some(category) = self.dice.pick(&new_topics).copied() {
                return self.answer(category, SelectionRule::S103_NEW_TOPIC);
            }
        }

        if self.state.conversation_depth > self.config.resistance_depth_threshold {
            self.state.ease_resistance(self.config.resistance_step);
            debug!(resistance = self.state.resistance_level(), "resistance eased");
        }

        let topics = self.state.topics_addressed.len();

        if topics >= self.config.alternatives_min_topics
            && !self.state.has_used(ALTERNATIVES_CATEGORY)
            && self.dice.chance(self.config.alternatives_probability)
        {
            return self.answer(ALTERNATIVES_CATEGORY, SelectionRule::S104_ALTERNATIVES);
        }

        if topics >= self.config.closing_min_topics
            && !self.state.has_used(CLOSING_CATEGORY)
            && self.dice.chance(self.config.closing_probability)
        {
            return self.answer(CLOSING_CATEGORY, SelectionRule::S105_CLOSING);
        }

        if let Some(category) = self.dice.pick(&matched).copied() {
            return self.answer(category, SelectionRule::S106_MATCHED);
        }

        let script = Arc::clone(&self.script);
        let unused: Vec<&str> = script
            .categories()
            .filter(|c| !self.state.has_used(c))
            .collect();
        if let Some(category) = self.dice.pick(&unused).copied() {
            return self.answer(category, SelectionRule::S107_UNUSED);
        }

        let default = self.config.default_category.clone();
        self.answer(&default, SelectionRule::S108_DEFAULT)
    }

    fn answer(&mut self, category: &str, rule: SelectionRule) -> Reply {
        let known = self.script.has_category(category);
        let text = self.get_response(category);
        let (source, rule) = if known {
            (Some(category.to_string()), rule)
        } else {
            (None, SelectionRule::S109_FALLBACK)
        };
        debug!(category, rule = rule.code(), "sam reply");
        Reply::new(Speaker::Sam, text, source, rule)
    }
}

// =============================================================================
// TESTS
// =============================================================================
