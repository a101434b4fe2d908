//! Invoker configuration.
//!
//! Defaults suit most hosts. Deployments can override individual settings with
//! environment variables:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `DETECTOR_ENTRY_POINT` | canonical entry point name for preloaded images |
//! | `DETECTOR_RESERVED_CHARS` | characters forbidden in Definition Id/Author |
//! | `DETECTOR_WARN_INTERNAL_TOPICS` | warn on internal-only units with support topics |

use detector_sandbox_types::env_utils::{env_bool_or, env_string};
use serde::{Deserialize, Serialize};

use crate::compiler::{EntryPointSignature, DEFAULT_ENTRY_POINT};
use crate::validation::{ValidationRules, DEFAULT_RESERVED_NAME_CHARS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Entry point name used when initializing from a preloaded image.
    pub entry_point: String,
    /// Characters that may not appear in a Definition Id or Author.
    pub reserved_name_chars: String,
    pub warn_internal_support_topics: bool,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            reserved_name_chars: DEFAULT_RESERVED_NAME_CHARS.to_string(),
            warn_internal_support_topics: true,
        }
    }
}

impl InvokerConfig {
    /// Defaults overlaid with any `DETECTOR_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(entry) = env_string("DETECTOR_ENTRY_POINT") {
            self.entry_point = entry.trim().to_string();
        }
        if let Some(chars) = env_string("DETECTOR_RESERVED_CHARS") {
            self.reserved_name_chars = chars;
        }
        self.warn_internal_support_topics =
            env_bool_or("DETECTOR_WARN_INTERNAL_TOPICS", self.warn_internal_support_topics);
        self
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub fn with_reserved_name_chars(mut self, chars: impl Into<String>) -> Self {
        self.reserved_name_chars = chars.into();
        self
    }

    pub fn with_internal_topic_warning(mut self, enabled: bool) -> Self {
        self.warn_internal_support_topics = enabled;
        self
    }

    pub fn entry_point_signature(&self) -> EntryPointSignature {
        EntryPointSignature::new(self.entry_point.clone())
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            reserved_name_chars: self.reserved_name_chars.clone(),
            warn_internal_support_topics: self.warn_internal_support_topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_validation_defaults() {
        let config = InvokerConfig::default();
        assert_eq!(config.entry_point_signature(), EntryPointSignature::canonical());
        assert_eq!(config.validation_rules(), ValidationRules::default());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("DETECTOR_ENTRY_POINT", " main ");
        std::env::set_var("DETECTOR_RESERVED_CHARS", "#%");
        std::env::set_var("DETECTOR_WARN_INTERNAL_TOPICS", "false");

        let config = InvokerConfig::from_env();
        assert_eq!(config.entry_point, "main");
        assert_eq!(config.reserved_name_chars, "#%");
        assert!(!config.warn_internal_support_topics);

        std::env::remove_var("DETECTOR_ENTRY_POINT");
        std::env::remove_var("DETECTOR_RESERVED_CHARS");
        std::env::remove_var("DETECTOR_WARN_INTERNAL_TOPICS");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: InvokerConfig =
            serde_json::from_str(r#"{"warn_internal_support_topics": false}"#).expect("parse");
        assert_eq!(config.entry_point, DEFAULT_ENTRY_POINT);
        assert_eq!(config.reserved_name_chars, DEFAULT_RESERVED_NAME_CHARS);
        assert!(!config.warn_internal_support_topics);
    }
}
