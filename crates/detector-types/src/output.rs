//! Normalized result of invoking an entry point.

use serde::{Deserialize, Serialize};

/// What an invocation produced once any deferred computation has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DetectorOutput {
    /// The entry point produced a value, directly or after awaiting.
    Value(serde_json::Value),
    /// The entry point completed without producing a value.
    NoValue,
}

impl DetectorOutput {
    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            DetectorOutput::Value(v) => Some(v),
            DetectorOutput::NoValue => None,
        }
    }

    pub fn into_value(self) -> Option<serde_json::Value> {
        match self {
            DetectorOutput::Value(v) => Some(v),
            DetectorOutput::NoValue => None,
        }
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, DetectorOutput::NoValue)
    }
}
