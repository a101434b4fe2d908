//! Environment variable parsing for configuration overlays.
//!
//! Every helper treats an unset variable and an unparseable one the same way:
//! the caller's default wins.
//!
//! # Example
//!
//! ```
//! use detector_sandbox_types::env_utils::{env_bool_or, env_list, env_string};
//!
//! let warn = env_bool_or("DETECTOR_EXAMPLE_WARN", true);
//! let entry: Option<String> = env_string("DETECTOR_EXAMPLE_ENTRY");
//! let imports: Vec<String> = env_list("DETECTOR_EXAMPLE_IMPORTS");
//! # let _ = (warn, entry, imports);
//! ```

/// Non-empty string value of a variable.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Truthy values are `1`, `true`, `yes`, `on`; falsy are `0`, `false`, `no`, `off`
/// (case-insensitive). Anything else falls back to `default`.
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Comma-separated list, empty entries dropped.
pub fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .ok()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_bool_or_respects_explicit_false() {
        std::env::set_var("DETECTOR_TEST_BOOL_OFF", "off");
        std::env::set_var("DETECTOR_TEST_BOOL_ON", "YES");
        std::env::set_var("DETECTOR_TEST_BOOL_JUNK", "maybe");

        assert!(!env_bool_or("DETECTOR_TEST_BOOL_OFF", true));
        assert!(env_bool_or("DETECTOR_TEST_BOOL_ON", false));
        assert!(env_bool_or("DETECTOR_TEST_BOOL_JUNK", true));
        assert!(!env_bool_or("DETECTOR_TEST_BOOL_MISSING", false));

        std::env::remove_var("DETECTOR_TEST_BOOL_OFF");
        std::env::remove_var("DETECTOR_TEST_BOOL_ON");
        std::env::remove_var("DETECTOR_TEST_BOOL_JUNK");
    }

    #[test]
    fn test_env_string_and_list() {
        std::env::set_var("DETECTOR_TEST_STRING", "   ");
        assert_eq!(env_string("DETECTOR_TEST_STRING"), None);
        std::env::remove_var("DETECTOR_TEST_STRING");

        std::env::set_var("DETECTOR_TEST_LIST", "a, ,b,c ");
        assert_eq!(env_list("DETECTOR_TEST_LIST"), vec!["a", "b", "c"]);
        std::env::remove_var("DETECTOR_TEST_LIST");

        assert!(env_list("DETECTOR_TEST_MISSING_LIST").is_empty());
    }
}
