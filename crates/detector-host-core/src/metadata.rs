//! Metadata extraction.
//!
//! Folds the tagged [`Attribute`]s on a resolved entry point into an
//! [`ExtractedMetadata`]. Support topics attach to the definition in
//! declaration order; topics declared without a definition have nothing to
//! attach to and are dropped.

use detector_sandbox_types::{Attribute, ExtractedMetadata};
use tracing::debug;

use crate::compiler::EntryPoint;
use crate::errors::ResolveError;

/// Read the declarative metadata off `entry`.
///
/// Declaring the definition or either filter more than once is a
/// compilation-category failure.
pub fn extract_metadata(entry: &dyn EntryPoint) -> Result<ExtractedMetadata, ResolveError> {
    let mut metadata = ExtractedMetadata::default();
    let mut topics = Vec::new();

    for attribute in entry.attributes() {
        match attribute {
            Attribute::Definition(definition) => {
                set_once(&mut metadata.definition, definition.clone(), "Definition", entry)?
            }
            Attribute::SupportTopic(topic) => topics.push(topic.clone()),
            Attribute::ResourceFilter(filter) => {
                set_once(&mut metadata.resource_filter, filter.clone(), "ResourceFilter", entry)?
            }
            Attribute::SystemFilter(filter) => {
                set_once(&mut metadata.system_filter, *filter, "SystemFilter", entry)?
            }
        }
    }

    match metadata.definition.as_mut() {
        Some(definition) => definition.support_topics.extend(topics),
        None if !topics.is_empty() => {
            debug!(
                entry = entry.name(),
                dropped = topics.len(),
                "support topics declared without a definition"
            );
        }
        None => {}
    }

    Ok(metadata)
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    kind: &str,
    entry: &dyn EntryPoint,
) -> Result<(), ResolveError> {
    if slot.is_some() {
        return Err(ResolveError::Compilation(format!(
            "entry point '{}' declares more than one {} attribute",
            entry.name(),
            kind
        )));
    }
    *slot = Some(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CallOutcome;
    use crate::errors::BindingError;
    use detector_sandbox_types::{
        DefinitionMetadata, ResourceFilter, SupportTopic, SystemFilter,
    };
    use serde_json::Value;

    struct Annotated(Vec<Attribute>);

    impl EntryPoint for Annotated {
        fn name(&self) -> &str {
            "run"
        }

        fn arity(&self) -> usize {
            0
        }

        fn attributes(&self) -> &[Attribute] {
            &self.0
        }

        fn call(&self, _args: Vec<Value>) -> Result<CallOutcome, BindingError> {
            Ok(CallOutcome::Value(Value::Null))
        }
    }

    #[test]
    fn test_no_attributes_yields_empty_metadata() {
        let metadata = extract_metadata(&Annotated(vec![])).expect("extract");
        assert_eq!(metadata, ExtractedMetadata::default());
    }

    #[test]
    fn test_support_topics_attach_in_order() {
        let entry = Annotated(vec![
            Attribute::SupportTopic(SupportTopic::new("1", "100")),
            Attribute::Definition(
                DefinitionMetadata::new("cpu", "CPU", "ops")
                    .with_support_topic(SupportTopic::new("0", "99")),
            ),
            Attribute::SupportTopic(SupportTopic::new("2", "200")),
            Attribute::ResourceFilter(ResourceFilter::internal()),
        ]);

        let metadata = extract_metadata(&entry).expect("extract");
        let definition = metadata.definition.expect("definition");
        let ids: Vec<_> = definition
            .support_topics
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
        assert_eq!(metadata.resource_filter, Some(ResourceFilter::internal()));
        assert!(metadata.system_filter.is_none());
    }

    #[test]
    fn test_topics_without_definition_are_dropped() {
        let entry = Annotated(vec![
            Attribute::SupportTopic(SupportTopic::new("1", "100")),
            Attribute::SystemFilter(SystemFilter::default()),
        ]);
        let metadata = extract_metadata(&entry).expect("extract");
        assert!(metadata.definition.is_none());
        assert!(metadata.system_filter.is_some());
    }

    #[test]
    fn test_duplicate_filter_is_compilation_failure() {
        let entry = Annotated(vec![
            Attribute::SystemFilter(SystemFilter::default()),
            Attribute::SystemFilter(SystemFilter::default()),
        ]);
        match extract_metadata(&entry) {
            Err(ResolveError::Compilation(msg)) => {
                assert!(msg.contains("more than one SystemFilter"), "{msg}")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
