//! Metadata validation.
//!
//! Rules run in a fixed order and the first violation wins:
//!
//! 1. Id is not blank
//! 2. Name is not blank
//! 3. Author is not blank
//! 4. Neither Id nor Author contains a reserved file-name character
//! 5. Every support topic has a non-blank Id and PesId
//! 6. ResourceFilter and SystemFilter are not both declared
//!
//! Validation only runs when a definition was declared. A unit marked
//! internal-only that still lists support topics passes with a warning.

use detector_sandbox_types::{DefinitionMetadata, ExtractedMetadata};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters that cannot appear in a file name on common hosts.
/// Control characters are always reserved on top of these.
pub const DEFAULT_RESERVED_NAME_CHARS: &str = "<>:\"/\\|?*";

pub const INTERNAL_SUPPORT_TOPIC_WARNING: &str = "warning: detector is marked internal only \
     (ResourceFilter.internal_only = true) but declares support topics, which are customer facing";

/// First rule a definition violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Id cannot be empty in the Definition attribute")]
    EmptyId,

    #[error("Name cannot be empty in the Definition attribute")]
    EmptyName,

    #[error("Author cannot be empty in the Definition attribute")]
    EmptyAuthor,

    #[error("{field} '{value}' contains reserved character {character:?}; {field} must be usable as a file name")]
    ReservedCharacter {
        field: &'static str,
        value: String,
        character: char,
    },

    #[error("support topic #{index} must have a non-empty Id and PesId")]
    IncompleteSupportTopic { index: usize },

    #[error("a detector cannot declare both a ResourceFilter and a SystemFilter")]
    ConflictingFilters,
}

/// Tunables for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub reserved_name_chars: String,
    pub warn_internal_support_topics: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            reserved_name_chars: DEFAULT_RESERVED_NAME_CHARS.to_string(),
            warn_internal_support_topics: true,
        }
    }
}

impl ValidationRules {
    fn reserved_char_in(&self, value: &str) -> Option<char> {
        value
            .chars()
            .find(|c| c.is_control() || self.reserved_name_chars.contains(*c))
    }
}

/// Outcome of a passing validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// `false` when there was no definition to validate.
    pub ran: bool,
    pub warnings: Vec<String>,
}

/// Validate `metadata` against `rules`.
pub fn validate(
    metadata: &ExtractedMetadata,
    rules: &ValidationRules,
) -> Result<ValidationReport, ValidationError> {
    let Some(definition) = metadata.definition.as_ref() else {
        return Ok(ValidationReport::default());
    };

    check_definition(definition, rules)?;

    if metadata.resource_filter.is_some() && metadata.system_filter.is_some() {
        return Err(ValidationError::ConflictingFilters);
    }

    let mut report = ValidationReport {
        ran: true,
        warnings: Vec::new(),
    };

    let internal_only = metadata
        .resource_filter
        .as_ref()
        .is_some_and(|f| f.internal_only);
    if rules.warn_internal_support_topics
        && metadata.has_support_topics()
        && internal_only
        && metadata.system_filter.is_none()
    {
        report
            .warnings
            .push(INTERNAL_SUPPORT_TOPIC_WARNING.to_string());
    }

    Ok(report)
}

fn check_definition(
    definition: &DefinitionMetadata,
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    if is_blank(&definition.id) {
        return Err(ValidationError::EmptyId);
    }
    if is_blank(&definition.name) {
        return Err(ValidationError::EmptyName);
    }
    if is_blank(&definition.author) {
        return Err(ValidationError::EmptyAuthor);
    }

    for (field, value) in [("Id", &definition.id), ("Author", &definition.author)] {
        if let Some(character) = rules.reserved_char_in(value) {
            return Err(ValidationError::ReservedCharacter {
                field,
                value: value.clone(),
                character,
            });
        }
    }

    if let Some(index) = definition
        .support_topics
        .iter()
        .position(|t| is_blank(&t.id) || is_blank(&t.pes_id))
    {
        return Err(ValidationError::IncompleteSupportTopic { index });
    }

    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
