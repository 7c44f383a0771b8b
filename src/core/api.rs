//! HTTP API for simulation sessions
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session progress
//! - POST /session/{id}/{phase}/turn - Send a student turn
//! - GET /session/{id}/{phase}/history - Get a phase's turns
//! - GET /session/{id}/feedback - Get simulation feedback
//! - POST /session/{id}/transcript - Save the simulation transcript
//! - POST /session/{id}/reset - Start over
//! - GET /health - Health check

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::core::feedback::render_report;
use crate::core::session::{Phase, SessionProgress, SimulationSession};
use crate::error::SessionError;
use crate::types::{EngineConfig, Feedback, ScriptSet, Turn};

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, SimulationSession>>,
    pub scripts: ScriptSet,
    pub config: EngineConfig,
    pub transcript_dir: PathBuf,
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    pub seed: Option<u64>,
    pub user_id: Option<String>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    /// Instructor introduction that opens the pre-brief
    pub opening: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub progress: SessionProgress,
}

/// Add turn request
#[derive(Debug, Deserialize)]
pub struct AddTurnRequest {
    pub text: String,
}

/// Add turn response
#[derive(Debug, Serialize)]
pub struct AddTurnResponse {
    pub phase: Phase,
    pub speaker: String,
    pub text: String,
    pub source: Option<String>,
    pub rule: String,
    pub phase_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub phase: Phase,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub reflection: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: Feedback,
    pub report: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub path: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router(scripts: ScriptSet, config: EngineConfig, transcript_dir: PathBuf) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        scripts,
        config,
        transcript_dir,
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/feedback", get(get_feedback).post(post_feedback))
        .route("/session/:id/transcript", post(save_session_transcript))
        .route("/session/:id/reset", post(reset_session))
        .route("/session/:id/:phase/turn", post(add_turn))
        .route("/session/:id/:phase/history", get(get_history))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let session_id = generate_session_id();
    let mut session = SimulationSession::new(&state.scripts, state.config.clone(), req.seed);
    let opening = session
        .start(Phase::Prebrief)
        .map(|r| r.text)
        .unwrap_or_default();

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    info!(session = %session_id, user = ?req.user_id, "session created");

    Ok(Json(NewSessionResponse {
        session_id,
        opening,
    }))
}

/// Get session progress
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(SessionStatusResponse {
        session_id: id,
        progress: session.progress(),
    }))
}

/// Add a student turn to one phase
async fn add_turn(
    State(state): State<Arc<AppState>>,
    Path((id, phase)): Path<(String, String)>,
    Json(req): Json<AddTurnRequest>,
) -> Result<Json<AddTurnResponse>, StatusCode> {
    let phase: Phase = phase.parse().map_err(|_| StatusCode::BAD_REQUEST)?;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let reply = session.submit(phase, &req.text).map_err(|e| match e {
        SessionError::EmptyInput | SessionError::UnknownPhase(_) => StatusCode::BAD_REQUEST,
    })?;

    Ok(Json(AddTurnResponse {
        phase,
        speaker: reply.speaker.display_name().to_string(),
        text: reply.text,
        source: reply.source,
        rule: reply.rule.code().to_string(),
        phase_completed: session.is_completed(phase),
    }))
}

/// Get the turns of one phase
async fn get_history(
    State(state): State<Arc<AppState>>,
    Path((id, phase)): Path<(String, String)>,
) -> Result<Json<HistoryResponse>, StatusCode> {
    let phase: Phase = phase.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(HistoryResponse {
        phase,
        turns: session.history(phase).turns().to_vec(),
    }))
}

async fn feedback_for(
    state: &AppState,
    id: &str,
    reflection: &BTreeMap<String, String>,
) -> Result<FeedbackResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(id).ok_or(StatusCode::NOT_FOUND)?;
    let feedback = session.feedback();
    let report = render_report(&feedback, Some(reflection));
    Ok(FeedbackResponse { feedback, report })
}

/// Feedback on the simulation phase
async fn get_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FeedbackResponse>, StatusCode> {
    feedback_for(&state, &id, &BTreeMap::new()).await.map(Json)
}

/// Feedback with the student's reflection answers in the report
async fn post_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, StatusCode> {
    feedback_for(&state, &id, &req.reflection).await.map(Json)
}

/// Save the simulation transcript
async fn save_session_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TranscriptRequest>,
) -> Result<Json<TranscriptResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let path = session
        .save_transcript(&state.transcript_dir, req.user_id.as_deref())
        .map_err(|e| {
            warn!(session = %id, error = %e, "transcript save failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(TranscriptResponse {
        path: path.display().to_string(),
    }))
}

/// Reset a session and reopen its pre-brief, as on creation
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    session.reset();
    session.start(Phase::Prebrief);

    Ok(Json(SessionStatusResponse {
        session_id: id,
        progress: session.progress(),
    }))
}

/// Generate session ID
fn generate_session_id() -> String {
    format!("session_{:016x}", rand::random::<u64>())
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    scripts: ScriptSet,
    config: EngineConfig,
    transcript_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(scripts, config, transcript_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "clinsim API listening");
    info!("  POST /session/new                 - Create session");
    info!("  GET  /session/:id                 - Get progress");
    info!("  POST /session/:id/:phase/turn     - Send a turn");
    info!("  GET  /session/:id/:phase/history  - Get phase turns");
    info!("  GET  /session/:id/feedback        - Get feedback");
    info!("  POST /session/:id/transcript      - Save transcript");
    info!("  POST /session/:id/reset           - Reset session");
    info!("  GET  /health                      - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
