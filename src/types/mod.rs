//! Core types for Clinsim

mod config;
mod feedback;
mod output;
mod reason;
mod script;
mod state;
mod turn;

pub use config::{EngineConfig, SamConfig, NaturalizerConfig, InstructorConfig};
pub use feedback::{Feedback, FeedbackMetrics, Transcript};
pub use output::Reply;
pub use reason::SelectionRule;
pub use script::{CharacterInfo, SamScript, InstructorScript, ScriptSet};
pub use state::{DialogueMode, Emotion, BoundedBuffer, PhraseBuffer, SamState, InstructorState};
pub use turn::{Speaker, Turn, ConversationHistory};
