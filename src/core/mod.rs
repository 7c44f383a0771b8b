//! Core modules for clinsim

pub mod dice;
pub mod keywords;
pub mod naturalizer;
pub mod sam;
pub mod instructor;
pub mod loader;
pub mod session;
pub mod feedback;
pub mod transcript;
pub mod api;

pub use dice::{RandomSource, SequenceDice, StdDice};
pub use naturalizer::{NaturalContext, Naturalizer, Register};
pub use sam::SamEngine;
pub use instructor::InstructorEngine;
pub use loader::{load_config, load_instructor_script, load_sam_script, load_script_set};
pub use session::{Phase, SessionProgress, SimulationSession};
pub use feedback::{generate_feedback, render_report};
pub use transcript::{load_transcript, save_transcript, verify_transcript};
pub use api::{create_router, run_server};
