//! Naturalizer: randomized rewriting of scripted text
//!
//! Contractions, list-marker stripping, sentence merging and interior
//! reordering, plus small insertions (openers, callbacks, acknowledgments,
//! closing touches). Every optional step is an independent coin flip with a
//! configurable probability. Content is rephrased and reordered, never
//! replaced.

use std::collections::BTreeSet;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use crate::core::dice::RandomSource;
use crate::types::{DialogueMode, Emotion, NaturalizerConfig, PhraseBuffer};

/// Voice the text is rewritten in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// The resistant character
    Sam,
    Prebrief,
    Debrief,
}

impl From<DialogueMode> for Register {
    fn from(mode: DialogueMode) -> Self {
        match mode {
            DialogueMode::Prebrief => Register::Prebrief,
            DialogueMode::Debrief => Register::Debrief,
        }
    }
}

/// Optional context a rewrite may draw on
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalContext<'a> {
    /// Category the Sam text came from
    pub category: Option<&'a str>,
    /// Student text to quote in an opener
    pub user_input: Option<&'a str>,
    /// Phrases available for callbacks
    pub key_phrases: Option<&'a PhraseBuffer>,
    pub depth: u32,
    pub emotions: Option<&'a BTreeSet<Emotion>>,
}

const SAM_CONTRACTIONS: &[(&str, &str)] = &[
    ("I am", "I'm"),
    ("you are", "you're"),
    ("we are", "we're"),
    ("they are", "they're"),
    ("is not", "isn't"),
    ("are not", "aren't"),
    ("was not", "wasn't"),
    ("were not", "weren't"),
    ("have not", "haven't"),
    ("has not", "hasn't"),
    ("had not", "hadn't"),
    ("will not", "won't"),
    ("would not", "wouldn't"),
    ("could not", "couldn't"),
    ("should not", "shouldn't"),
    ("cannot", "can't"),
    ("do not", "don't"),
    ("does not", "doesn't"),
    ("did not", "didn't"),
];

const INSTRUCTOR_CONTRACTIONS: &[(&str, &str)] = &[
    ("I am", "I'm"),
    ("you are", "you're"),
    ("we are", "we're"),
    ("they are", "they're"),
    ("it is", "it's"),
    ("that is", "that's"),
    ("there is", "there's"),
    ("is not", "isn't"),
    ("are not", "aren't"),
    ("do not", "don't"),
    ("does not", "doesn't"),
    ("did not", "didn't"),
    ("have not", "haven't"),
    ("has not", "hasn't"),
    ("had not", "hadn't"),
    ("would not", "wouldn't"),
    ("could not", "couldn't"),
    ("should not", "shouldn't"),
    ("will not", "won't"),
];

fn compile_table(table: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    table
        .iter()
        .map(|(formal, natural)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(formal));
            (Regex::new(&pattern).unwrap(), *natural)
        })
        .collect()
}

lazy_static! {
    static ref SAM_TABLE: Vec<(Regex, &'static str)> = compile_table(SAM_CONTRACTIONS);
    static ref INSTRUCTOR_TABLE: Vec<(Regex, &'static str)> = compile_table(INSTRUCTOR_CONTRACTIONS);

    // Sentence end: terminators, optional closing quotes/brackets, whitespace
    static ref RE_SENTENCE_END: Regex = Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).unwrap();
    // A word right before a terminator that is an abbreviation, not an end
    static ref RE_ABBREVIATION: Regex = Regex::new(r"(?i)\b(dr|mr|mrs|ms|st|vs|etc|e\.g|i\.e)\.$").unwrap();

    static ref RE_LINE_MARKER: Regex = Regex::new(r"^\s*(?:\d+[.)]|[•*\-]|â€¢)\s+").unwrap();
    static ref RE_INLINE_NUMBER: Regex = Regex::new(r"([.!?:])\s+\d+[.)]\s+").unwrap();
    static ref RE_INLINE_BULLET: Regex = Regex::new(r"(?:•|â€¢)\s+").unwrap();
}

const SAM_TRANSITIONS: &[&str] = &[
    "Look,",
    "Thing is,",
    "Here's the deal -",
    "Listen,",
    "Let me be clear -",
    "I gotta say,",
    "Honestly,",
    "Between us,",
    "The way I see it,",
    "Let's be real here -",
];

const SAM_CALLBACKS: &[&str] = &[
    "Getting back to what I said about {}.",
    "Like I mentioned before, {}.",
    "That ties back to the {} issue I brought up.",
];

const SAM_UNCERTAINTY: &[&str] = &[
    "I'm not sure about that.",
    "I haven't thought about it that way.",
    "I'd need to see some proof before I buy that.",
    "That sounds questionable to me.",
    "I'm skeptical, to be honest.",
];

/// Categories where Sam may voice doubt
const UNCERTAIN_CATEGORIES: &[&str] = &["evidence_response", "alternative_suggestions"];

/// Never rewritten: the opening stance is delivered as scripted
pub const OPENING_CATEGORY: &str = "opening_interaction";

const PERSONAL_OPENERS: &[&str] = &[
    "When you mentioned '{}', that's an important point.",
    "Your comment about '{}' is quite insightful.",
    "I'm glad you brought up '{}'.",
];

const PREBRIEF_TOUCHES: &[&str] = &[
    "Remember, this is a learning experience.",
    "I'm confident you'll handle this well.",
    "Don't worry if things get challenging - that's part of the process.",
    "This is about practice, not perfection.",
];

const DEBRIEF_TOUCHES: &[&str] = &[
    "What do you think about that?",
    "I'd love to hear your thoughts on this.",
    "How does that resonate with your experience in the simulation?",
    "Does that observation feel accurate to you?",
];

const CONJUNCTIONS: &[&str] = &["and", "also", "plus", "moreover", "what's more"];

/// Acknowledgment lines for an observed emotion
pub fn acknowledgments(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Frustration => &[
            "I notice this seems frustrating.",
            "It can be challenging when facing this kind of resistance.",
            "That resistance would test anyone's patience.",
        ],
        Emotion::Uncertainty => &[
            "It's normal to feel uncertain in these situations.",
            "These interactions can definitely make you question your approach.",
            "Many students find this ambiguity challenging.",
        ],
        Emotion::Determination => &[
            "I appreciate your persistence here.",
            "That determination will serve you well in real clinical settings.",
            "It's good to see you staying focused despite the obstacles.",
        ],
    }
}

/// Closing lines appended for a register
pub fn personal_touches(register: Register) -> &'static [&'static str] {
    match register {
        Register::Prebrief => PREBRIEF_TOUCHES,
        Register::Debrief => DEBRIEF_TOUCHES,
        Register::Sam => &[],
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

/// Whole-word, case-insensitive contraction pass. A leading capital in the
/// formal phrase is kept on the contraction.
pub fn contract(text: &str, register: Register) -> String {
    let table: &[(Regex, &'static str)] = match register {
        Register::Sam => SAM_TABLE.as_slice(),
        Register::Prebrief | Register::Debrief => INSTRUCTOR_TABLE.as_slice(),
    };

    let mut out = text.to_string();
    for (re, natural) in table {
        out = re
            .replace_all(&out, |caps: &Captures| {
                let matched = &caps[0];
                if matched.starts_with(|c: char| c.is_uppercase()) {
                    upper_first(natural)
                } else {
                    natural.to_string()
                }
            })
            .into_owned();
    }
    out
}

/// Remove leading numeric list markers and bullet glyphs
pub fn strip_list_markers(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| RE_LINE_MARKER.replace(line, "").into_owned())
        .collect();
    let joined = lines.join("\n");
    let joined = RE_INLINE_NUMBER.replace_all(&joined, "$1 ");
    RE_INLINE_BULLET.replace_all(&joined, "").into_owned()
}

/// Split into trimmed sentences, keeping terminators
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in RE_SENTENCE_END.find_iter(text) {
        let candidate = text[start..m.end()].trim();
        if RE_ABBREVIATION.is_match(candidate) {
            continue;
        }
        if !candidate.is_empty() {
            sentences.push(candidate.to_string());
        }
        start = m.end();
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

pub fn join_sentences(sentences: &[String]) -> String {
    sentences.join(" ")
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first letter unless the sentence starts with "I"
pub fn lower_first(s: &str) -> String {
    let first_word = s.split_whitespace().next().unwrap_or("");
    if first_word == "I" || first_word.starts_with("I'") {
        return s.to_string();
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn fill(template: &str, value: &str) -> String {
    template.replacen("{}", value, 1)
}

/// Snippet quoted from student text: more than `min_words` words, start at
/// most `max_start`, length drawn from `len_range` and clipped to the text
pub fn quote_snippet<R: RandomSource>(
    text: &str,
    dice: &mut R,
    min_words: usize,
    max_start: usize,
    len_range: (usize, usize),
) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= min_words || words.len() < 3 {
        return None;
    }
    let start = dice.range_inclusive(0, max_start.min(words.len() - 3));
    let len = dice
        .range_inclusive(len_range.0, len_range.1)
        .min(words.len() - start);
    Some(words[start..start + len].join(" "))
}

/// Drop sentence punctuation from the end of a phrase
pub fn trim_terminal(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_ascii_punctuation() && c != '\'')
}

/// Phrase kept for later callbacks, taken from inside a single sentence of
/// more than 5 words and never that whole sentence. Trailing punctuation is
/// dropped.
pub fn capture_phrase<R: RandomSource>(
    text: &str,
    dice: &mut R,
    len_range: (usize, usize),
) -> Option<String> {
    let sentences = split_sentences(text);
    let eligible: Vec<&String> = sentences.iter().filter(|s| word_count(s) > 5).collect();
    let sentence = dice.pick(&eligible).copied()?;

    let words: Vec<&str> = sentence.split_whitespace().collect();
    let len = dice
        .range_inclusive(len_range.0, len_range.1)
        .min(words.len() - 1);
    let start = dice.range_inclusive(0, words.len() - len);
    let phrase = words[start..start + len].join(" ");
    let phrase = trim_terminal(&phrase);
    if phrase.is_empty() {
        None
    } else {
        Some(phrase.to_string())
    }
}

// =============================================================================
// NATURALIZER
// =============================================================================

/// Configured rewriter
#[derive(Debug, Clone, Default)]
pub struct Naturalizer {
    config: NaturalizerConfig,
}

impl Naturalizer {
    pub fn new(config: NaturalizerConfig) -> Self {
        Self { config }
    }

    /// Rewrite `text` in `register`
    pub fn naturalize<R: RandomSource>(
        &self,
        text: &str,
        register: Register,
        ctx: &NaturalContext<'_>,
        dice: &mut R,
    ) -> String {
        match register {
            Register::Sam => self.naturalize_sam(text, ctx, dice),
            Register::Prebrief | Register::Debrief => {
                self.naturalize_instructor(text, register, ctx, dice)
            }
        }
    }

    fn naturalize_sam<R: RandomSource>(
        &self,
        text: &str,
        ctx: &NaturalContext<'_>,
        dice: &mut R,
    ) -> String {
        if ctx.category == Some(OPENING_CATEGORY) {
            return text.to_string();
        }

        let mut response = text.to_string();

        if !response.starts_with("Look")
            && !response.starts_with("Listen")
            && dice.chance(self.config.transition_probability)
        {
            if let Some(transition) = dice.pick(SAM_TRANSITIONS) {
                response = format!("{} {}", transition, lower_first(&response));
            }
        }

        if let Some(phrases) = ctx.key_phrases {
            if ctx.depth > self.config.callback_min_depth
                && !phrases.is_empty()
                && dice.chance(self.config.callback_probability)
            {
                let mut sentences = split_sentences(&response);
                if sentences.len() > 1 {
                    let index = dice.next_index(phrases.len());
                    let template = dice.pick(SAM_CALLBACKS).copied().unwrap_or(SAM_CALLBACKS[0]);
                    if let Some(phrase) = phrases.get(index) {
                        let at = dice.range_inclusive(1, 2.min(sentences.len() - 1));
                        sentences.insert(at, fill(template, &lower_first(trim_terminal(phrase))));
                        response = join_sentences(&sentences);
                    }
                }
            }
        }

        response = contract(&response, Register::Sam);

        let doubtful = ctx
            .category
            .map(|c| UNCERTAIN_CATEGORIES.contains(&c))
            .unwrap_or(false);
        if doubtful && dice.chance(self.config.uncertainty_probability) {
            let mut sentences = split_sentences(&response);
            if sentences.len() > 2 {
                let at = dice.range_inclusive(1, sentences.len() - 1);
                if let Some(line) = dice.pick(SAM_UNCERTAINTY) {
                    sentences.insert(at, line.to_string());
                    response = join_sentences(&sentences);
                }
            }
        }

        response
    }

    fn naturalize_instructor<R: RandomSource>(
        &self,
        text: &str,
        register: Register,
        ctx: &NaturalContext<'_>,
        dice: &mut R,
    ) -> String {
        let mut content = strip_list_markers(text);

        if let Some(input) = ctx.user_input {
            if dice.chance(self.config.opener_probability) {
                if let Some(snippet) = quote_snippet(input, dice, 5, 10, (3, 6)) {
                    if let Some(opener) = dice.pick(PERSONAL_OPENERS) {
                        content = format!("{} {}", fill(opener, &snippet), content);
                    }
                }
            }
        }

        if register == Register::Debrief {
            if let Some(emotions) = ctx.emotions.filter(|e| !e.is_empty()) {
                if dice.chance(self.config.acknowledgment_probability) {
                    let observed: Vec<Emotion> = emotions.iter().copied().collect();
                    if let Some(emotion) = dice.pick(&observed).copied() {
                        if let Some(line) = dice.pick(acknowledgments(emotion)) {
                            let mut sentences = split_sentences(&content);
                            if sentences.len() > 2 {
                                let at = dice.range_inclusive(0, 2.min(sentences.len() - 1));
                                sentences.insert(at, line.to_string());
                                content = join_sentences(&sentences);
                            } else {
                                content = format!("{} {}", line, content);
                            }
                        }
                    }
                }
            }
        }

        content = contract(&content, register);

        let mut sentences = split_sentences(&content);
        if sentences.len() > 3 {
            self.merge_short_sentences(&mut sentences, dice);
            if sentences.len() > 3 && dice.chance(self.config.reorder_probability) {
                let last = sentences.len() - 1;
                dice.shuffle(&mut sentences[1..last]);
            }
        }
        let mut content = join_sentences(&sentences);

        if dice.chance(self.config.personal_touch_probability) {
            if let Some(touch) = dice.pick(personal_touches(register)) {
                content = format!("{} {}", content, touch);
            }
        }

        content
    }

    /// Join adjacent short statements with a conjunction
    fn merge_short_sentences<R: RandomSource>(&self, sentences: &mut Vec<String>, dice: &mut R) {
        let max = self.config.merge_max_words;
        let mut i = 0;
        while i + 1 < sentences.len() {
            let mergeable = sentences[i].ends_with('.')
                && word_count(&sentences[i]) < max
                && word_count(&sentences[i + 1]) < max;

            if mergeable && dice.chance(self.config.merge_probability) {
                let conjunction = dice.pick(CONJUNCTIONS).copied().unwrap_or("and");
                let next = sentences.remove(i + 1);
                let head = sentences[i].trim_end_matches('.');
                sentences[i] = format!("{}, {} {}", head, conjunction, lower_first(&next));
            } else {
                i += 1;
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
