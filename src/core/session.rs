//! Simulation session: pre-brief, simulation, de-brief
//!
//! Owns one engine and one history per phase. Each phase opens with a
//! character turn (the instructor introduction or Sam's opening stance) the
//! first time it is used.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::core::feedback::generate_feedback;
use crate::core::instructor::InstructorEngine;
use crate::core::naturalizer::OPENING_CATEGORY;
use crate::core::sam::SamEngine;
use crate::core::transcript::save_transcript;
use crate::error::{SessionError, TranscriptError};
use crate::types::{
    ConversationHistory, DialogueMode, EngineConfig, Feedback, InstructorState, Reply,
    SamState, ScriptSet, SelectionRule, Speaker, Turn,
};
use crate::{DEBRIEF_MIN_TURNS, PREBRIEF_MIN_TURNS, SIMULATION_MIN_TURNS};

/// Stage of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Prebrief,
    Simulation,
    Debrief,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Prebrief, Phase::Simulation, Phase::Debrief];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prebrief => "prebrief",
            Phase::Simulation => "simulation",
            Phase::Debrief => "debrief",
        }
    }

    /// Who answers the student in this phase
    pub fn character(&self) -> Speaker {
        match self {
            Phase::Simulation => Speaker::Sam,
            _ => Speaker::Instructor,
        }
    }

    /// History length after which the phase counts as done
    pub fn min_turns(&self) -> usize {
        match self {
            Phase::Prebrief => PREBRIEF_MIN_TURNS,
            Phase::Simulation => SIMULATION_MIN_TURNS,
            Phase::Debrief => DEBRIEF_MIN_TURNS,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prebrief" | "pre-brief" => Ok(Phase::Prebrief),
            "simulation" | "sim" => Ok(Phase::Simulation),
            "debrief" | "de-brief" => Ok(Phase::Debrief),
            _ => Err(SessionError::UnknownPhase(s.to_string())),
        }
    }
}

/// Turn counts and completion flags for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionProgress {
    pub prebrief_turns: usize,
    pub simulation_turns: usize,
    pub debrief_turns: usize,
    pub prebrief_completed: bool,
    pub simulation_completed: bool,
    pub debrief_completed: bool,
    pub resistance_level: f64,
    pub topics_addressed: Vec<String>,
}

/// One student's run through the three phases
#[derive(Debug)]
pub struct SimulationSession {
    scripts: ScriptSet,
    config: EngineConfig,
    seed: Option<u64>,
    prebrief: InstructorEngine,
    sam: SamEngine,
    debrief: InstructorEngine,
    prebrief_history: ConversationHistory,
    simulation_history: ConversationHistory,
    debrief_history: ConversationHistory,
}

impl SimulationSession {
    /// Engines are seeded from `seed` with a per-phase offset when given
    pub fn new(scripts: &ScriptSet, config: EngineConfig, seed: Option<u64>) -> Self {
        let phase_seed = |offset: u64| seed.map(|s| s.wrapping_add(offset));
        Self {
            prebrief: InstructorEngine::new(
                scripts.prebrief.clone(),
                DialogueMode::Prebrief,
                &config,
                phase_seed(0),
            ),
            sam: SamEngine::new(scripts.simulation.clone(), &config, phase_seed(1)),
            debrief: InstructorEngine::new(
                scripts.debrief.clone(),
                DialogueMode::Debrief,
                &config,
                phase_seed(2),
            ),
            scripts: scripts.clone(),
            config,
            seed,
            prebrief_history: ConversationHistory::new(),
            simulation_history: ConversationHistory::new(),
            debrief_history: ConversationHistory::new(),
        }
    }

    pub fn history(&self, phase: Phase) -> &ConversationHistory {
        match phase {
            Phase::Prebrief => &self.prebrief_history,
            Phase::Simulation => &self.simulation_history,
            Phase::Debrief => &self.debrief_history,
        }
    }

    fn history_mut(&mut self, phase: Phase) -> &mut ConversationHistory {
        match phase {
            Phase::Prebrief => &mut self.prebrief_history,
            Phase::Simulation => &mut self.simulation_history,
            Phase::Debrief => &mut self.debrief_history,
        }
    }

    pub fn is_started(&self, phase: Phase) -> bool {
        !self.history(phase).is_empty()
    }

    pub fn is_completed(&self, phase: Phase) -> bool {
        self.history(phase).len() >= phase.min_turns()
    }

    /// Open `phase` with its first character turn. Returns the opening, or
    /// `None` if the phase was already open.
    pub fn start(&mut self, phase: Phase) -> Option<Reply> {
        if self.is_started(phase) {
            return None;
        }
        let reply = match phase {
            Phase::Prebrief => Reply::new(
                Speaker::Instructor,
                self.prebrief.generate_response(Some("introduction"), None),
                Some("introduction".to_string()),
                SelectionRule::I200_DIRECT,
            ),
            Phase::Simulation => Reply::new(
                Speaker::Sam,
                self.sam.get_response(OPENING_CATEGORY),
                Some(OPENING_CATEGORY.to_string()),
                SelectionRule::S100_DIRECT,
            ),
            Phase::Debrief => Reply::new(
                Speaker::Instructor,
                self.debrief.generate_response(Some("introduction"), None),
                Some("introduction".to_string()),
                SelectionRule::I200_DIRECT,
            ),
        };
        info!(%phase, "phase started");
        self.history_mut(phase).push(Turn::new(reply.speaker, reply.text.clone()));
        Some(reply)
    }

    /// Record a student utterance and the character's reply. Blank input is
    /// rejected and leaves the session untouched.
    pub fn submit(&mut self, phase: Phase, text: &str) -> Result<Reply, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.start(phase);
        self.history_mut(phase).push(Turn::new(Speaker::User, text));

        let reply = match phase {
            Phase::Prebrief => self.prebrief.respond(text),
            Phase::Simulation => self.sam.respond(text),
            Phase::Debrief => self.debrief.respond(text),
        };
        debug!(%phase, rule = reply.rule.code(), "turn recorded");
        self.history_mut(phase).push(Turn::new(reply.speaker, reply.text.clone()));
        Ok(reply)
    }

    pub fn sam_state(&self) -> &SamState {
        self.sam.state()
    }

    /// Instructor state for a pre-brief or de-brief phase
    pub fn instructor_state(&self, phase: Phase) -> Option<&InstructorState> {
        match phase {
            Phase::Prebrief => Some(self.prebrief.state()),
            Phase::Debrief => Some(self.debrief.state()),
            Phase::Simulation => None,
        }
    }

    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            prebrief_turns: self.prebrief_history.len(),
            simulation_turns: self.simulation_history.len(),
            debrief_turns: self.debrief_history.len(),
            prebrief_completed: self.is_completed(Phase::Prebrief),
            simulation_completed: self.is_completed(Phase::Simulation),
            debrief_completed: self.is_completed(Phase::Debrief),
            resistance_level: self.sam.state().resistance_level(),
            topics_addressed: self.sam.state().topics_addressed.iter().cloned().collect(),
        }
    }

    /// Feedback on the simulation phase
    pub fn feedback(&self) -> Feedback {
        generate_feedback(&self.simulation_history)
    }

    /// Save the simulation history as a transcript
    pub fn save_transcript(
        &self,
        dir: impl AsRef<Path>,
        user_id: Option<&str>,
    ) -> Result<PathBuf, TranscriptError> {
        save_transcript(&self.simulation_history, dir, user_id)
    }

    /// Fresh engines and empty histories, same scripts and seed
    pub fn reset(&mut self) {
        info!("session reset");
        *self = Self::new(&self.scripts, self.config.clone(), self.seed);
    }
}

// =============================================================================
// TESTS
// =============================================================================
