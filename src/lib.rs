//! Clinsim: scripted persuasion-dialogue engine
//!
//! A nursing student argues for a vaccination programme with a resistant
//! facility manager (Sam Richards), framed by a pre-brief and a de-brief with
//! an instructor (Noa Martinez). Responses are drawn from static scripts by
//! keyword tables and progression rules, then naturalized.

pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// SAM SELECTION POLICY
// =============================================================================

/// Chance of quoting the student's last input before a matched answer
pub const QUOTE_PROBABILITY: f64 = 0.3;

/// Chance of steering toward alternatives once enough topics are covered
pub const ALTERNATIVES_PROBABILITY: f64 = 0.3;

/// Chance of closing once most objections have been raised
pub const CLOSING_PROBABILITY: f64 = 0.4;

/// Topics addressed before `alternative_suggestions` becomes eligible
pub const ALTERNATIVES_MIN_TOPICS: usize = 4;

/// Topics addressed before `closing_remarks` becomes eligible
pub const CLOSING_MIN_TOPICS: usize = 5;

/// Opening stance is only offered while depth is below this
pub const OPENING_MAX_DEPTH: u32 = 3;

/// Resistance starts easing once depth exceeds this
pub const RESISTANCE_DEPTH_THRESHOLD: u32 = 6;

/// Initial resistance (scale 1-5, 5 = most resistant)
pub const RESISTANCE_INITIAL: f64 = 3.0;
pub const RESISTANCE_MIN: f64 = 1.0;
pub const RESISTANCE_MAX: f64 = 5.0;
pub const RESISTANCE_STEP: f64 = 0.2;

// =============================================================================
// NATURALIZER
// =============================================================================

pub const TRANSITION_PROBABILITY: f64 = 0.4;
pub const CALLBACK_PROBABILITY: f64 = 0.3;
pub const UNCERTAINTY_PROBABILITY: f64 = 0.3;
pub const OPENER_PROBABILITY: f64 = 0.3;
pub const ACKNOWLEDGMENT_PROBABILITY: f64 = 0.4;
pub const MERGE_PROBABILITY: f64 = 0.4;
/// The interior of long instructor replies is always shuffled by default
pub const REORDER_PROBABILITY: f64 = 1.0;
pub const PERSONAL_TOUCH_PROBABILITY: f64 = 0.3;

/// Sentences shorter than this (in words) may be merged
pub const MERGE_MAX_WORDS: usize = 8;

/// Sam callbacks need a conversation deeper than this
pub const CALLBACK_MIN_DEPTH: u32 = 2;

// =============================================================================
// INSTRUCTOR
// =============================================================================

/// Chance of a follow-up connective when no keyword matched
pub const FOLLOW_UP_PROBABILITY: f64 = 0.3;

// =============================================================================
// BUFFERS
// =============================================================================

/// Previous variants excluded when drawing from a category
pub const RESPONSE_DEDUP_WINDOW: usize = 3;

/// Stored phrases available for callbacks
pub const KEY_PHRASE_CAPACITY: usize = 5;

// =============================================================================
// SESSION
// =============================================================================

/// Pre-brief turns (both speakers) after which the student may move on
pub const PREBRIEF_MIN_TURNS: usize = 4;

/// Simulation turns after which the conversation may be ended
pub const SIMULATION_MIN_TURNS: usize = 6;

/// De-brief turns after which the summary becomes available
pub const DEBRIEF_MIN_TURNS: usize = 6;

/// Transcript directory used when none is given
pub const DEFAULT_TRANSCRIPT_DIR: &str = "data/conversations";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
