//! Manifest document model and parsing.

use anyhow::{Context, Result};
use detector_sandbox_types::{
    Attribute, DefinitionMetadata, Diagnostic, ResourceFilter, SystemFilter,
};
use serde::{Deserialize, Serialize};

use crate::compiler::DEFAULT_ENTRY_POINT;

/// A detector manifest, as written by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorManifest {
    pub entry: EntryDeclaration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_filter: Option<ResourceFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_filter: Option<SystemFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

/// The entry point a manifest exposes and the routine backing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDeclaration {
    #[serde(default = "default_entry_name")]
    pub name: String,
    pub routine: String,
}

fn default_entry_name() -> String {
    DEFAULT_ENTRY_POINT.to_string()
}

impl DetectorManifest {
    /// Parse manifest text. Syntax and shape errors come back as a located
    /// error diagnostic.
    pub fn parse(source: &str) -> Result<Self, Diagnostic> {
        serde_json::from_str(source).map_err(|e| {
            let line = e.line().max(1);
            let column = e.column().max(1);
            Diagnostic::error(format!("invalid detector manifest: {}", e)).at(line, column)
        })
    }

    /// Parse the canonical bytes of an emitted image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("artifact is not a detector manifest")
    }

    /// Canonical serialized form, used as the image bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).context("failed to serialize detector manifest")
    }

    /// Declarative attributes as they would appear on the entry point.
    ///
    /// Support topics are split off the definition into their own attributes.
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        if let Some(definition) = &self.definition {
            let mut bare = definition.clone();
            let topics = std::mem::take(&mut bare.support_topics);
            attributes.push(Attribute::Definition(bare));
            attributes.extend(topics.into_iter().map(Attribute::SupportTopic));
        }
        if let Some(filter) = &self.resource_filter {
            attributes.push(Attribute::ResourceFilter(filter.clone()));
        }
        if let Some(filter) = self.system_filter {
            attributes.push(Attribute::SystemFilter(filter));
        }
        attributes
    }

    pub fn definition_id(&self) -> Option<&str> {
        self.definition.as_ref().map(|d| d.id.as_str())
    }
}
