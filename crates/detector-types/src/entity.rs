//! Identity of a caller-authored source unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of unit being hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A diagnostic detector (the default).
    #[default]
    Detector,
    /// A signal consumed by other detectors.
    Signal,
    /// An analysis composed of detectors.
    Analysis,
    /// A reusable snippet shared between detectors.
    Gist,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Detector => "detector",
            EntityType::Signal => "signal",
            EntityType::Analysis => "analysis",
            EntityType::Gist => "gist",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source text plus where it came from.
///
/// Immutable once handed to an invoker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// The source content to compile.
    pub script_text: String,
    /// Where the source was loaded from, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub entity_type: EntityType,
}

impl EntityMetadata {
    /// Create metadata for an in-memory detector source.
    pub fn new(script_text: impl Into<String>) -> Self {
        Self {
            script_text: script_text.into(),
            location: None,
            entity_type: EntityType::Detector,
        }
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = entity_type;
        self
    }

    /// Short label for log lines: the location if known, otherwise the kind.
    pub fn label(&self) -> String {
        match &self.location {
            Some(path) => path.display().to_string(),
            None => format!("<inline {}>", self.entity_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_location() {
        let inline = EntityMetadata::new("{}");
        assert_eq!(inline.label(), "<inline detector>");

        let located = EntityMetadata::new("{}")
            .with_location("detectors/cpu.json")
            .with_entity_type(EntityType::Signal);
        assert_eq!(located.label(), "detectors/cpu.json");
        assert_eq!(located.entity_type, EntityType::Signal);
    }

    #[test]
    fn test_entity_type_defaults_when_missing() {
        let parsed: EntityMetadata =
            serde_json::from_str(r#"{"script_text": "{}"}"#).expect("deserialize");
        assert_eq!(parsed.entity_type, EntityType::Detector);
        assert!(parsed.location.is_none());
    }
}
