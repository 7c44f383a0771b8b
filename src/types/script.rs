//! Script documents: the static text every reply is drawn from

use std::collections::BTreeMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

/// Display metadata for a scripted character
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterInfo {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Any other descriptive fields (facility, years of service, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Script for the resistant character: category -> literal variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamScript {
    pub character: CharacterInfo,
    pub responses: BTreeMap<String, Vec<String>>,
}

impl SamScript {
    /// Variants for a category, `None` if unknown or empty
    pub fn variants(&self, category: &str) -> Option<&[String]> {
        self.responses
            .get(category)
            .map(Vec::as_slice)
            .filter(|v| !v.is_empty())
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.variants(category).is_some()
    }

    /// Category names in stable order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.responses.keys().map(String::as_str)
    }
}

/// Script for the instructor: section -> paragraphs spoken together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorScript {
    pub instructor: CharacterInfo,
    pub sections: BTreeMap<String, Vec<String>>,
}

impl InstructorScript {
    pub fn section(&self, name: &str) -> Option<&[String]> {
        self.sections
            .get(name)
            .map(Vec::as_slice)
            .filter(|v| !v.is_empty())
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// The three documents a simulation needs
#[derive(Debug, Clone)]
pub struct ScriptSet {
    pub simulation: Arc<SamScript>,
    pub prebrief: Arc<InstructorScript>,
    pub debrief: Arc<InstructorScript>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_extra_fields_flatten() {
        let json = r#"{"name": "Sam Richards", "role": "Facility Manager", "years": 22}"#;
        let info: CharacterInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.name, "Sam Richards");
        assert_eq!(info.extra["years"], 22);
        assert!(info.description.is_none());
    }

    #[test]
    fn test_empty_category_is_not_a_variant_source() {
        let json = r#"{
            "character": {"name": "Sam"},
            "responses": {"budget_concerns": [], "opening_interaction": ["Hello."]}
        }"#;
        let script: SamScript = serde_json::from_str(json).unwrap();
        assert!(script.variants("budget_concerns").is_none());
        assert!(script.has_category("opening_interaction"));
        assert!(!script.has_category("missing"));
    }
}
