//! Exported artifact types.

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::validation::DEFAULT_RESERVED_NAME_CHARS;

/// Default file extension for exported artifacts.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "detector";

/// A serialized compiled unit: a file name plus the base64-encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactBytes {
    pub name: String,
    pub payload: String,
}

impl ArtifactBytes {
    pub fn encode(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            payload: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.payload)
            .with_context(|| format!("artifact '{}' has a malformed payload", self.name))
    }
}

/// Hex SHA-256 of the source text.
pub fn source_digest(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// File name for an artifact: the definition id when there is one, otherwise
/// a short digest of the source. Path separators, the other default reserved
/// characters, and control characters in the id become `_`, whatever rules
/// validation ran with.
pub fn artifact_name(definition_id: Option<&str>, source: &str, extension: &str) -> String {
    let stem = match definition_id.map(str::trim) {
        Some(id) if !id.is_empty() => id
            .chars()
            .map(|c| {
                if c.is_control() || DEFAULT_RESERVED_NAME_CHARS.contains(c) {
                    '_'
                } else {
                    c
                }
            })
            .collect(),
        _ => source_digest(source)[..16].to_string(),
    };
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_bytes_payload_is_base64() {
        let artifact = ArtifactBytes::encode("cpu.detector", b"{\"entry\":1}");
        assert_eq!(artifact.payload, "eyJlbnRyeSI6MX0=");
        assert_eq!(artifact.decode().expect("decode"), b"{\"entry\":1}");

        let broken = ArtifactBytes {
            name: "x".into(),
            payload: "%%%".into(),
        };
        assert!(broken.decode().is_err());
    }

    #[test]
    fn test_artifact_name_falls_back_to_digest() {
        assert_eq!(artifact_name(Some("cpu"), "src", "detector"), "cpu.detector");

        let name = artifact_name(Some("  "), "src", "detector");
        assert_eq!(name, format!("{}.detector", &source_digest("src")[..16]));
        assert_eq!(artifact_name(None, "src", "detector"), name);
    }

    #[test]
    fn test_artifact_name_never_escapes_directory() {
        assert_eq!(
            artifact_name(Some("team/cpu|high"), "src", "detector"),
            "team_cpu_high.detector"
        );
        assert_eq!(
            artifact_name(Some("..\\up\tone"), "src", "detector"),
            ".._up_one.detector"
        );
    }
}
