//! Script and configuration loading
//!
//! Documents are read once at startup and shared read-only afterwards.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use serde::de::DeserializeOwned;
use tracing::info;
use crate::error::{ConfigError, ScriptError, ScriptResult};
use crate::types::{EngineConfig, InstructorScript, SamScript, ScriptSet};

pub const SIMULATION_SCRIPT: &str = "simulation_script.json";
pub const PREBRIEF_SCRIPT: &str = "prebrief_script.json";
pub const DEBRIEF_SCRIPT: &str = "debrief_script.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> ScriptResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_entries<'a>(
    script: &str,
    entries: impl Iterator<Item = (&'a String, &'a Vec<String>)>,
) -> ScriptResult<usize> {
    let mut count = 0;
    for (name, items) in entries {
        if items.iter().all(|s| s.trim().is_empty()) {
            return Err(ScriptError::EmptyCategory {
                script: script.to_string(),
                category: name.clone(),
            });
        }
        count += 1;
    }
    if count == 0 {
        return Err(ScriptError::Empty(script.to_string()));
    }
    Ok(count)
}

/// Check a Sam script: at least one category, none of them empty
pub fn validate_sam_script(name: &str, script: &SamScript) -> ScriptResult<usize> {
    check_entries(name, script.responses.iter())
}

/// Check an instructor script: at least one section, none of them empty
pub fn validate_instructor_script(name: &str, script: &InstructorScript) -> ScriptResult<usize> {
    check_entries(name, script.sections.iter())
}

pub fn load_sam_script(path: impl AsRef<Path>) -> ScriptResult<SamScript> {
    let path = path.as_ref();
    let script: SamScript = read_json(path)?;
    let categories = validate_sam_script(&path.display().to_string(), &script)?;
    info!(path = %path.display(), categories, character = %script.character.name, "loaded sam script");
    Ok(script)
}

pub fn load_instructor_script(path: impl AsRef<Path>) -> ScriptResult<InstructorScript> {
    let path = path.as_ref();
    let script: InstructorScript = read_json(path)?;
    let sections = validate_instructor_script(&path.display().to_string(), &script)?;
    info!(path = %path.display(), sections, instructor = %script.instructor.name, "loaded instructor script");
    Ok(script)
}

/// Load the three scripts of a simulation from one directory
pub fn load_script_set(dir: impl AsRef<Path>) -> ScriptResult<ScriptSet> {
    let dir = dir.as_ref();
    Ok(ScriptSet {
        simulation: Arc::new(load_sam_script(dir.join(SIMULATION_SCRIPT))?),
        prebrief: Arc::new(load_instructor_script(dir.join(PREBRIEF_SCRIPT))?),
        debrief: Arc::new(load_instructor_script(dir.join(DEBRIEF_SCRIPT))?),
    })
}

/// Load and validate an engine configuration. Missing fields take defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EngineConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    info!(path = %path.display(), "loaded engine config");
    Ok(config)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clinsim_loader_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_sam_script() {
        let dir = scratch("sam");
        let path = dir.join("sam.json");
        fs::write(
            &path,
            r#"{"character": {"name": "Sam Richards", "role": "Manager"},
                "responses": {"opening_interaction": ["What do you want?"]}}"#,
        )
        .unwrap();
        let script = load_sam_script(&path).unwrap();
        assert_eq!(script.character.name, "Sam Richards");
        assert!(script.has_category("opening_interaction"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_sam_script("/nonexistent/clinsim/sam.json").unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = scratch("bad");
        let path = dir.join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_instructor_script(&path).unwrap_err();
        assert!(matches!(err, ScriptError::Parse { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_category_rejected() {
        let script: SamScript = serde_json::from_str(
            r#"{"character": {"name": "Sam"}, "responses": {"budget_concerns": []}}"#,
        )
        .unwrap();
        let err = validate_sam_script("sim", &script).unwrap_err();
        match err {
            ScriptError::EmptyCategory { category, .. } => assert_eq!(category, "budget_concerns"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_document_rejected() {
        let script: InstructorScript =
            serde_json::from_str(r#"{"instructor": {"name": "Noa"}, "sections": {}}"#).unwrap();
        assert!(matches!(
            validate_instructor_script("pre", &script),
            Err(ScriptError::Empty(_))
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = scratch("config");
        let path = dir.join("config.json");
        fs::write(&path, r#"{"sam": {"quote_probability": 0.5}}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.sam.quote_probability, 0.5);
        assert_eq!(config.sam.closing_probability, crate::CLOSING_PROBABILITY);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let dir = scratch("range");
        let path = dir.join("config.json");
        fs::write(&path, r#"{"naturalizer": {"merge_probability": 1.5}}"#).unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Probability { .. }));
        fs::remove_dir_all(&dir).ok();
    }
}
