//! Output formatting for detector-sandbox CLI
//!
//! Provides human-readable and JSON output formatting for all commands.

use detector_sandbox::{ArtifactBytes, DetectorOutput, EntityInvoker, ExtractedMetadata};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ReportJson<'a> {
    success: bool,
    state: String,
    output: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_error: Option<String>,
    metadata: &'a ExtractedMetadata,
}

/// Format the outcome of an initialization pass
pub fn format_report(invoker: &EntityInvoker, json_output: bool) -> String {
    if json_output {
        let json = ReportJson {
            success: invoker.is_compilation_successful(),
            state: invoker.state().to_string(),
            output: invoker.compilation_output(),
            validation_error: invoker.validation_error().map(ToString::to_string),
            metadata: invoker.metadata(),
        };
        return serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string());
    }

    let mut out = String::new();
    let label = invoker.entity().label();
    if invoker.is_compilation_successful() {
        out.push_str(&format!("\x1b[32m✓ {} is ready\x1b[0m\n", label));
    } else {
        out.push_str(&format!(
            "\x1b[31m✗ {} failed ({})\x1b[0m\n",
            label,
            invoker.state()
        ));
    }

    if !invoker.compilation_output().is_empty() {
        out.push('\n');
        for line in invoker.compilation_output() {
            out.push_str(&format!("  {}\n", line));
        }
    }

    out.push_str(&format_metadata(invoker.metadata()));
    out
}

/// Format extracted metadata for display
pub fn format_metadata(metadata: &ExtractedMetadata) -> String {
    let mut out = String::new();

    if let Some(definition) = &metadata.definition {
        out.push_str("\n\x1b[1mDefinition:\x1b[0m\n");
        out.push_str(&format!("  Id:     {}\n", definition.id));
        out.push_str(&format!("  Name:   {}\n", definition.name));
        out.push_str(&format!("  Author: {}\n", definition.author));
        if let Some(category) = &definition.category {
            out.push_str(&format!("  Category: {}\n", category));
        }
        for topic in &definition.support_topics {
            out.push_str(&format!(
                "  Support topic: {} (PesId {})\n",
                topic.id, topic.pes_id
            ));
        }
    }

    if let Some(filter) = &metadata.resource_filter {
        out.push_str(&format!(
            "\n\x1b[1mResource filter:\x1b[0m {}{}\n",
            filter.resource_type,
            if filter.internal_only {
                " (internal only)"
            } else {
                ""
            }
        ));
    }

    if metadata.system_filter.is_some() {
        out.push_str("\n\x1b[1mSystem filter\x1b[0m\n");
    }

    out
}

/// Format the result of an invocation
pub fn format_output(output: &DetectorOutput, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct OutputJson<'a> {
            success: bool,
            has_value: bool,
            value: Option<&'a serde_json::Value>,
        }

        let json = OutputJson {
            success: true,
            has_value: !output.is_no_value(),
            value: output.value(),
        };
        return serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string());
    }

    match output.value() {
        Some(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        None => "(no value)".to_string(),
    }
}

/// Format an exported artifact
pub fn format_saved(path: &Path, json_output: bool) -> String {
    if json_output {
        serde_json::to_string_pretty(&serde_json::json!({
            "success": true,
            "path": path.display().to_string(),
        }))
        .unwrap_or_else(|_| "{}".to_string())
    } else {
        format!("\x1b[32m✓ Saved artifact to {}\x1b[0m", path.display())
    }
}

/// Format a serialized artifact
pub fn format_bytes(artifact: &ArtifactBytes, json_output: bool) -> String {
    if json_output {
        serde_json::to_string_pretty(artifact).unwrap_or_else(|_| "{}".to_string())
    } else {
        format!("{}\n{}", artifact.name, artifact.payload)
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            cause: Option<String>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            cause: error.source().map(|e| e.to_string()),
        };
        serde_json::to_string_pretty(&err).unwrap_or_else(|_| "{}".to_string())
    } else {
        let mut out = format!("\x1b[31mError:\x1b[0m {}\n", error);
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("Caused by:\n");
            for (idx, cause) in causes.enumerate() {
                out.push_str(&format!("  {}: {}\n", idx + 1, cause));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use serde_json::json;

    #[test]
    fn test_format_output_no_value() {
        assert_eq!(format_output(&DetectorOutput::NoValue, false), "(no value)");

        let parsed: serde_json::Value =
            serde_json::from_str(&format_output(&DetectorOutput::NoValue, true)).expect("json");
        assert_eq!(parsed["has_value"], false);
        assert!(parsed["value"].is_null());
    }

    #[test]
    fn test_format_output_value() {
        let output = DetectorOutput::Value(json!({"cpu": 93}));
        let parsed: serde_json::Value =
            serde_json::from_str(&format_output(&output, true)).expect("json");
        assert_eq!(parsed["value"]["cpu"], 93);
    }

    #[test]
    fn test_format_error_lists_causes() {
        let err = Err::<(), _>(anyhow::anyhow!("no such file"))
            .context("failed to read manifest cpu.json")
            .unwrap_err();
        let text = format_error(&err, false);
        assert!(text.contains("failed to read manifest cpu.json"));
        assert!(text.contains("1: no such file"));
    }
}
