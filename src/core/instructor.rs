//! Instructor engine: section progression for pre-brief and de-brief
//!
//! Sections are covered in random order starting from the introduction.
//! A keyword in the student's text jumps to the matching section. Once every
//! section except the closing has been covered, the closing is all that is
//! left and it is returned from then on.

use std::sync::Arc;
use tracing::{debug, warn};
use crate::core::dice::{RandomSource, StdDice};
use crate::core::keywords::{detect_emotions, INSTRUCTOR_KEYWORDS};
use crate::core::naturalizer::{capture_phrase, lower_first, NaturalContext, Naturalizer};
use crate::types::{
    DialogueMode, EngineConfig, InstructorConfig, InstructorScript, InstructorState,
    NaturalizerConfig, Reply, SelectionRule, Speaker,
};

/// Spoken when a section is missing from the script
pub const FALLBACK_SECTION_TEXT: &str =
    "I don't have specific guidance on that topic, but let's think it through together.";

const FOLLOW_UPS: &[&str] = &[
    "Building on that,",
    "Related to what you mentioned,",
    "That makes me think about",
    "That connects to",
    "This brings up another point -",
    "Following that logic,",
];

/// Response selector for one pre-brief or de-brief dialogue
#[derive(Debug)]
pub struct InstructorEngine<R: RandomSource = StdDice> {
    script: Arc<InstructorScript>,
    mode: DialogueMode,
    config: InstructorConfig,
    naturalizer: Naturalizer,
    state: InstructorState,
    dice: R,
}

impl InstructorEngine<StdDice> {
    pub fn new(
        script: Arc<InstructorScript>,
        mode: DialogueMode,
        config: &EngineConfig,
        seed: Option<u64>,
    ) -> Self {
        Self::with_dice(
            script,
            mode,
            config.instructor.clone(),
            config.naturalizer.clone(),
            StdDice::new(seed),
        )
    }
}

impl<R: RandomSource> InstructorEngine<R> {
    pub fn with_dice(
        script: Arc<InstructorScript>,
        mode: DialogueMode,
        config: InstructorConfig,
        naturalizer: NaturalizerConfig,
        dice: R,
    ) -> Self {
        Self {
            script,
            mode,
            config,
            naturalizer: Naturalizer::new(naturalizer),
            state: InstructorState::new(),
            dice,
        }
    }

    pub fn mode(&self) -> DialogueMode {
        self.mode
    }

    pub fn state(&self) -> &InstructorState {
        &self.state
    }

    /// Paragraphs of a section, or the fallback paragraph
    pub fn section_content(&self, name: &str) -> Vec<String> {
        match self.script.section(name) {
            Some(paragraphs) => paragraphs.to_vec(),
            None => vec![FALLBACK_SECTION_TEXT.to_string()],
        }
    }

    /// Speak `section`, or the next one by progression when `None`.
    /// Student input, if any, is recorded first.
    pub fn generate_response(&mut self, section: Option<&str>, input: Option<&str>) -> String {
        if let Some(text) = input {
            self.observe(text);
        }
        let (section, rule) = match section {
            Some(name) => (name.to_string(), SelectionRule::I200_DIRECT),
            None => self.next_section(),
        };
        debug!(mode = %self.mode, section = %section, rule = rule.code(), "instructor section");
        self.render(&section, input)
    }

    /// Text-only reply to a student turn
    pub fn process_student_input(&mut self, text: &str) -> String {
        self.respond(text).text
    }

    /// Reply to a student turn, with the section and rule that produced it
    pub fn respond(&mut self, text: &str) -> Reply {
        let matches = INSTRUCTOR_KEYWORDS.matches(text);

        // Decided before this turn is recorded: the phrase must come from an
        // earlier turn. The closing is never prefixed.
        let follow_up = if matches.is_empty()
            && self.state.conversation_depth > 0
            && !self.closing_reached()
            && !self.state.key_phrases.is_empty()
            && self.dice.chance(self.config.follow_up_probability)
        {
            let index = self.dice.next_index(self.state.key_phrases.len());
            let phrase = self.state.key_phrases.get(index).cloned();
            let connective = self.dice.pick(FOLLOW_UPS).copied().unwrap_or(FOLLOW_UPS[0]);
            phrase.map(|p| format!("{} when you mentioned '{}',", connective, p))
        } else {
            None
        };

        self.observe(text);

        let (section, mut rule) = if self.closing_reached() {
            (self.config.closing_section.clone(), SelectionRule::I205_CLOSING)
        } else if let Some(section) = self.dice.pick(&matches).copied() {
            (section.to_string(), SelectionRule::I202_KEYWORD)
        } else {
            self.next_section()
        };

        let body = self.render(&section, Some(text));
        let text = match follow_up {
            Some(prefix) => {
                rule = SelectionRule::I204_FOLLOW_UP;
                format!("{} {}", prefix, lower_first(&body))
            }
            None => body,
        };

        debug!(mode = %self.mode, section = %section, rule = rule.code(), "instructor reply");
        let source = self.script.section(&section).map(|_| section.clone());
        Reply::new(Speaker::Instructor, text, source, rule)
    }

    /// Every script section other than the closing has been covered
    pub fn closing_reached(&self) -> bool {
        if self.state.sections_covered.is_empty() {
            return false;
        }
        let closing = self.config.closing_section.as_str();
        self.script
            .section_names()
            .filter(|s| *s != closing)
            .all(|s| self.state.sections_covered.contains(s))
    }

    fn next_section(&mut self) -> (String, SelectionRule) {
        if self.state.sections_covered.is_empty() {
            return (
                self.config.introduction_section.clone(),
                SelectionRule::I201_INTRODUCTION,
            );
        }

        let script = Arc::clone(&self.script);
        let closing = self.config.closing_section.as_str();
        let open: Vec<&str> = script
            .section_names()
            .filter(|s| *s != closing && !self.state.sections_covered.contains(*s))
            .collect();

        match self.dice.pick(&open).copied() {
            Some(section) => (section.to_string(), SelectionRule::I203_PROGRESSION),
            None => (closing.to_string(), SelectionRule::I205_CLOSING),
        }
    }

    fn observe(&mut self, text: &str) {
        self.state.conversation_depth += 1;
        if let Some(phrase) = capture_phrase(text, &mut self.dice, (3, 6)) {
            self.state.key_phrases.push(phrase);
        }
        if self.mode == DialogueMode::Debrief {
            let detected = detect_emotions(text);
            if !detected.is_empty() {
                debug!(?detected, "emotions observed");
            }
            self.state.observed_emotions.extend(detected);
        }
    }

    fn render(&mut self, section: &str, input: Option<&str>) -> String {
        if self.script.section(section).is_none() {
            warn!(section, "section missing from script, using fallback");
        }
        self.state.mark_covered(section);

        let content = self.section_content(section).join(" ");
        let ctx = NaturalContext {
            user_input: input,
            emotions: Some(&self.state.observed_emotions),
            depth: self.state.conversation_depth,
            ..Default::default()
        };
        self.naturalizer
            .naturalize(&content, self.mode.into(), &ctx, &mut self.dice)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::SequenceDice;
    use crate::types::Emotion;

    fn script() -> Arc<InstructorScript> {
        Arc::new(
            serde_json::from_str(
                r#"{
                "instructor": {"name": "Noa Martinez", "role": "Clinical Instructor"},
                "sections": {
                    "introduction": ["Welcome to the session."],
                    "objectives": ["Practice persuasion."],
                    "scenario_background": ["Sam runs a county jail."],
                    "character_profile": ["Sam is skeptical."],
                    "preparation_tips": ["Listen first."],
                    "closing": ["Good luck out there."]
                }
            }"#,
            )
            .unwrap(),
        )
    }

    fn engine(mode: DialogueMode, follow_up: f64) -> InstructorEngine<SequenceDice> {
        let config = InstructorConfig {
            follow_up_probability: follow_up,
            ..InstructorConfig::default()
        };
        InstructorEngine::with_dice(
            script(),
            mode,
            config,
            NaturalizerConfig::quiet(),
            SequenceDice::zeros(),
        )
    }

    #[test]
    fn test_first_section_is_introduction() {
        let mut noa = engine(DialogueMode::Prebrief, 0.0);
        let reply = noa.respond("ok");
        assert_eq!(reply.rule, SelectionRule::I201_INTRODUCTION);
        assert_eq!(reply.text, "Welcome to the session.");
    }

    #[test]
    fn test_progression_ends_in_permanent_closing() {
        let mut noa = engine(DialogueMode::Prebrief, 0.0);
        let mut seen = Vec::new();
        for _ in 0..5 {
            let reply = noa.respond("ok");
            seen.push(reply.source.unwrap());
        }
        seen.sort();
        assert_eq!(
            seen,
            vec![
                "character_profile",
                "introduction",
                "objectives",
                "preparation_tips",
                "scenario_background"
            ]
        );
        assert!(noa.closing_reached());

        for input in ["ok", "what were the goals again?", "any tips?"] {
            let reply = noa.respond(input);
            assert_eq!(reply.rule, SelectionRule::I205_CLOSING);
            assert_eq!(reply.text, "Good luck out there.");
        }
    }

    #[test]
    fn test_closing_keeps_its_rule_when_follow_ups_are_on() {
        let script: InstructorScript = serde_json::from_str(
            r#"{
            "instructor": {"name": "Noa Martinez", "role": "Clinical Instructor"},
            "sections": {
                "introduction": ["Welcome."],
                "closing": ["Bye."]
            }
        }"#,
        )
        .unwrap();
        let config = InstructorConfig {
            follow_up_probability: 1.0,
            ..InstructorConfig::default()
        };
        let mut noa = InstructorEngine::with_dice(
            Arc::new(script),
            DialogueMode::Debrief,
            config,
            NaturalizerConfig::quiet(),
            SequenceDice::zeros(),
        );

        noa.respond("I kept pushing on the outbreak numbers with him.");
        let reply = noa.respond("ok");
        assert_eq!(reply.rule, SelectionRule::I205_CLOSING);
        assert_eq!(reply.text, "Bye.");
    }

    #[test]
    fn test_keyword_routes_to_section() {
        let mut noa = engine(DialogueMode::Prebrief, 0.0);
        let reply = noa.respond("What is the goal here?");
        assert_eq!(reply.rule, SelectionRule::I202_KEYWORD);
        assert_eq!(reply.source.as_deref(), Some("objectives"));
        assert!(noa.state().sections_covered.contains("objectives"));
    }

    #[test]
    fn test_direct_missing_section_uses_fallback() {
        let mut noa = engine(DialogueMode::Debrief, 0.0);
        let text = noa.generate_response(Some("homework"), None);
        assert_eq!(text, "I don't have specific guidance on that topic, but let's think it through together.");
    }

    #[test]
    fn test_emotions_only_in_debrief() {
        let mut pre = engine(DialogueMode::Prebrief, 0.0);
        pre.respond("This feels frustrating already.");
        assert!(pre.state().observed_emotions.is_empty());

        let mut de = engine(DialogueMode::Debrief, 0.0);
        de.respond("That was frustrating and I felt unsure.");
        de.respond("It was frustrating again.");
        let emotions = &de.state().observed_emotions;
        assert_eq!(emotions.len(), 2);
        assert!(emotions.contains(&Emotion::Frustration));
        assert!(emotions.contains(&Emotion::Uncertainty));
    }

    #[test]
    fn test_follow_up_references_earlier_phrase() {
        let mut noa = engine(DialogueMode::Debrief, 1.0);
        // First turn: nothing stored yet, no follow-up
        let first = noa.respond("I kept explaining the flu outbreak numbers to him.");
        assert_eq!(first.rule, SelectionRule::I201_INTRODUCTION);
        assert_eq!(noa.state().key_phrases.len(), 1);

        let second = noa.respond("ok");
        assert_eq!(second.rule, SelectionRule::I204_FOLLOW_UP);
        assert!(
            second.text.starts_with("Building on that, when you mentioned 'I kept explaining',"),
            "{}",
            second.text
        );
    }

    #[test]
    fn test_keyword_suppresses_follow_up() {
        let mut noa = engine(DialogueMode::Debrief, 1.0);
        noa.respond("I kept explaining the flu outbreak numbers to him.");
        let reply = noa.respond("Tell me about the scenario");
        assert_eq!(reply.rule, SelectionRule::I202_KEYWORD);
        assert_eq!(reply.text, "Sam runs a county jail.");
    }

    #[test]
    fn test_sections_and_phrases_bounded() {
        let mut noa = engine(DialogueMode::Debrief, 0.3);
        let mut covered = 0;
        for i in 0..20 {
            noa.respond(&format!("turn {} with quite a few words in it", i));
            let now = noa.state().sections_covered.len();
            assert!(now >= covered);
            covered = now;
            assert!(noa.state().key_phrases.len() <= 5);
        }
        assert_eq!(noa.state().conversation_depth, 20);
    }
}
