//! Declarative metadata records.
//!
//! A detector declares who it is and where it may run through attributes on
//! its entry point. The host reads them after emission as tagged
//! [`Attribute`] variants and folds them into an [`ExtractedMetadata`].

use serde::{Deserialize, Serialize};

/// Identity record of a detector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefinitionMetadata {
    pub id: String,
    pub name: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Support taxonomy entries, in declaration order.
    #[serde(default)]
    pub support_topics: Vec<SupportTopic>,
}

impl DefinitionMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    pub fn with_support_topic(mut self, topic: SupportTopic) -> Self {
        self.support_topics.push(topic);
        self
    }
}

/// Link from a detector to a support taxonomy entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportTopic {
    pub id: String,
    pub pes_id: String,
}

impl SupportTopic {
    pub fn new(id: impl Into<String>, pes_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pes_id: pes_id.into(),
        }
    }
}

/// Restricts a detector to a class of customer resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,
    /// Only visible to internal operators.
    #[serde(default)]
    pub internal_only: bool,
}

fn default_resource_type() -> String {
    "any".to_string()
}

impl Default for ResourceFilter {
    fn default() -> Self {
        Self {
            resource_type: default_resource_type(),
            internal_only: false,
        }
    }
}

impl ResourceFilter {
    pub fn internal() -> Self {
        Self {
            internal_only: true,
            ..Self::default()
        }
    }
}

/// Marks a detector as scoped to the hosting system rather than a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemFilter {}

/// One declarative attribute on an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attribute {
    Definition(DefinitionMetadata),
    SupportTopic(SupportTopic),
    ResourceFilter(ResourceFilter),
    SystemFilter(SystemFilter),
}

/// Metadata read off a resolved entry point. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_filter: Option<ResourceFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_filter: Option<SystemFilter>,
}

impl ExtractedMetadata {
    /// Whether the definition carries any support topic.
    pub fn has_support_topics(&self) -> bool {
        self.definition
            .as_ref()
            .is_some_and(|d| !d.support_topics.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_tagging() {
        let json = serde_json::to_value(Attribute::ResourceFilter(ResourceFilter::internal()))
            .expect("serialize");
        assert_eq!(json["kind"], "resource_filter");
        assert_eq!(json["internal_only"], true);
        assert_eq!(json["resource_type"], "any");
    }

    #[test]
    fn test_has_support_topics() {
        let mut metadata = ExtractedMetadata::default();
        assert!(!metadata.has_support_topics());

        metadata.definition = Some(DefinitionMetadata::new("cpu", "CPU", "ops"));
        assert!(!metadata.has_support_topics());

        metadata.definition = Some(
            DefinitionMetadata::new("cpu", "CPU", "ops")
                .with_support_topic(SupportTopic::new("1", "14748")),
        );
        assert!(metadata.has_support_topics());
    }
}
