//! Per-dialogue conversation state
//!
//! One instance per dialogue (simulation, pre-brief, de-brief). Sets only
//! grow; a reset builds a fresh instance.

use std::collections::{BTreeSet, VecDeque};
use serde::{Deserialize, Serialize};
use crate::{
    KEY_PHRASE_CAPACITY, RESISTANCE_INITIAL, RESISTANCE_MAX, RESISTANCE_MIN,
    RESPONSE_DEDUP_WINDOW,
};

/// Instructor dialogue phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueMode {
    Prebrief,
    Debrief,
}

impl std::fmt::Display for DialogueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogueMode::Prebrief => write!(f, "prebrief"),
            DialogueMode::Debrief => write!(f, "debrief"),
        }
    }
}

/// Emotion tags detected in student text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Frustration,
    Uncertainty,
    Determination,
}

/// FIFO buffer with a hard capacity; the oldest entry is evicted first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }
}

impl<T: PartialEq> BoundedBuffer<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

/// Phrases kept for callbacks
pub type PhraseBuffer = BoundedBuffer<String>;

/// State of the resistant-character dialogue
#[derive(Debug, Clone, Serialize)]
pub struct SamState {
    pub used_categories: BTreeSet<String>,
    pub topics_addressed: BTreeSet<String>,
    resistance_level: f64,
    pub conversation_depth: u32,
    pub last_category: Option<String>,
    /// Literal variants most recently emitted, across categories
    pub previous_responses: BoundedBuffer<String>,
    pub key_phrases: PhraseBuffer,
    pub last_user_input: Option<String>,
}

impl Default for SamState {
    fn default() -> Self {
        Self::new()
    }
}

impl SamState {
    pub fn new() -> Self {
        Self {
            used_categories: BTreeSet::new(),
            topics_addressed: BTreeSet::new(),
            resistance_level: RESISTANCE_INITIAL.clamp(RESISTANCE_MIN, RESISTANCE_MAX),
            conversation_depth: 0,
            last_category: None,
            previous_responses: BoundedBuffer::new(RESPONSE_DEDUP_WINDOW),
            key_phrases: PhraseBuffer::new(KEY_PHRASE_CAPACITY),
            last_user_input: None,
        }
    }

    pub fn resistance_level(&self) -> f64 {
        self.resistance_level
    }

    /// Lower resistance by `step`, never below the floor
    pub fn ease_resistance(&mut self, step: f64) {
        let step = step.max(0.0);
        self.resistance_level = (self.resistance_level - step).max(RESISTANCE_MIN);
    }

    pub fn has_used(&self, category: &str) -> bool {
        self.used_categories.contains(category)
    }
}

/// State of a pre-brief or de-brief dialogue
#[derive(Debug, Clone, Serialize)]
pub struct InstructorState {
    pub sections_covered: BTreeSet<String>,
    pub current_section: Option<String>,
    pub conversation_depth: u32,
    pub key_phrases: PhraseBuffer,
    pub observed_emotions: BTreeSet<Emotion>,
}

impl Default for InstructorState {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructorState {
    pub fn new() -> Self {
        Self {
            sections_covered: BTreeSet::new(),
            current_section: None,
            conversation_depth: 0,
            key_phrases: PhraseBuffer::new(KEY_PHRASE_CAPACITY),
            observed_emotions: BTreeSet::new(),
        }
    }

    pub fn mark_covered(&mut self, section: &str) {
        self.sections_covered.insert(section.to_string());
        self.current_section = Some(section.to_string());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_evicts_oldest() {
        let mut buf = PhraseBuffer::new(3);
        for word in ["a", "b", "c", "d", "e"] {
            buf.push(word.to_string());
            assert!(buf.len() <= 3);
        }
        let kept: Vec<&str> = buf.iter().map(String::as_str).collect();
        assert_eq!(kept, vec!["c", "d", "e"]);
    }

    #[test]
    fn test_zero_capacity_buffer_stays_empty() {
        let mut buf = BoundedBuffer::new(0);
        buf.push(1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_resistance_floor() {
        let mut state = SamState::new();
        assert_eq!(state.resistance_level(), 3.0);
        for _ in 0..50 {
            let before = state.resistance_level();
            state.ease_resistance(0.2);
            assert!(state.resistance_level() <= before);
        }
        assert_eq!(state.resistance_level(), RESISTANCE_MIN);
    }

    #[test]
    fn test_negative_step_never_raises_resistance() {
        let mut state = SamState::new();
        state.ease_resistance(-1.0);
        assert_eq!(state.resistance_level(), 3.0);
    }

    #[test]
    fn test_mark_covered_tracks_current() {
        let mut state = InstructorState::new();
        state.mark_covered("introduction");
        state.mark_covered("objectives");
        assert_eq!(state.sections_covered.len(), 2);
        assert_eq!(state.current_section.as_deref(), Some("objectives"));
    }
}
