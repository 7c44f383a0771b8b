//! Conversation transcripts
//!
//! Saved as `conversation_<user>_<YYYYmmdd-HHMMSS>.json`. The digest is the
//! SHA-256 of the serialized turn list, so a reloaded transcript can be
//! checked against its own content.

use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local, TimeZone};
use sha2::{Digest, Sha256};
use tracing::info;
use crate::error::TranscriptError;
use crate::types::{ConversationHistory, Transcript, Turn};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Hex SHA-256 of the JSON form of `turns`
pub fn conversation_digest(turns: &[Turn]) -> Result<String, TranscriptError> {
    let json = serde_json::to_vec(turns)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

/// `user_<unix seconds>`
pub fn default_user_id<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("user_{}", now.timestamp())
}

pub fn build_transcript<Tz: TimeZone>(
    history: &ConversationHistory,
    user_id: Option<&str>,
    now: &DateTime<Tz>,
) -> Result<Transcript, TranscriptError>
where
    Tz::Offset: std::fmt::Display,
{
    let user_id = match user_id.map(str::trim).filter(|u| !u.is_empty()) {
        Some(id) => id.to_string(),
        None => default_user_id(now),
    };
    Ok(Transcript {
        user_id,
        timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        digest: conversation_digest(history.turns())?,
        conversation: history.turns().to_vec(),
    })
}

pub fn transcript_file_name(transcript: &Transcript) -> String {
    format!(
        "conversation_{}_{}.json",
        transcript.user_id, transcript.timestamp
    )
}

/// Write a transcript of `history` into `dir`, creating it if needed.
/// Returns the written path.
pub fn save_transcript(
    history: &ConversationHistory,
    dir: impl AsRef<Path>,
    user_id: Option<&str>,
) -> Result<PathBuf, TranscriptError> {
    let transcript = build_transcript(history, user_id, &Local::now())?;
    write_transcript(&transcript, dir)
}

pub fn write_transcript(
    transcript: &Transcript,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, TranscriptError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(transcript_file_name(transcript));
    let json = serde_json::to_string_pretty(transcript)?;
    fs::write(&path, json)?;
    info!(path = %path.display(), turns = transcript.conversation.len(), "transcript saved");
    Ok(path)
}

pub fn load_transcript(path: impl AsRef<Path>) -> Result<Transcript, TranscriptError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Digest recomputed from the stored turns matches the stored digest
pub fn verify_transcript(transcript: &Transcript) -> Result<bool, TranscriptError> {
    Ok(conversation_digest(&transcript.conversation)? == transcript.digest)
}

// =============================================================================
// TESTS
// =============================================================================
