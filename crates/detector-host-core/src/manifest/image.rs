//! Emitted manifest images and their entry points.

use anyhow::Result;
use detector_sandbox_types::Attribute;
use serde_json::Value;
use std::sync::Arc;

use super::document::DetectorManifest;
use super::registry::Routine;
use crate::compiler::{CallOutcome, EntryPoint, EntryPointSignature, ExecutableImage};
use crate::errors::{BindingError, ResolveError};

/// A manifest bound to its routine, ready to resolve.
#[derive(Debug, Clone)]
pub struct ManifestImage {
    name: String,
    manifest: DetectorManifest,
    routine: Routine,
    bytes: Vec<u8>,
}

impl ManifestImage {
    pub fn new(name: impl Into<String>, manifest: DetectorManifest, routine: Routine) -> Result<Self> {
        let bytes = manifest.to_bytes()?;
        Ok(Self {
            name: name.into(),
            manifest,
            routine,
            bytes,
        })
    }

    /// Canonical serialized image.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ExecutableImage for ManifestImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve_entry_point(
        &self,
        signature: &EntryPointSignature,
    ) -> Result<Arc<dyn EntryPoint>, ResolveError> {
        if self.manifest.entry.name != signature.name {
            return Err(ResolveError::Compilation(format!(
                "no entry point matching {} found; the unit declares '{}'",
                signature, self.manifest.entry.name
            )));
        }
        Ok(Arc::new(ManifestEntryPoint {
            name: self.manifest.entry.name.clone(),
            routine: self.routine.clone(),
            attributes: self.manifest.attributes(),
        }))
    }
}

/// Entry point backed by a registered routine.
#[derive(Debug)]
pub struct ManifestEntryPoint {
    name: String,
    routine: Routine,
    attributes: Vec<Attribute>,
}

impl EntryPoint for ManifestEntryPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.routine.arity()
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn call(&self, args: Vec<Value>) -> Result<CallOutcome, BindingError> {
        if args.len() < self.routine.arity() {
            return Err(BindingError::MissingArguments {
                entry: self.name.clone(),
                expected: self.routine.arity(),
                supplied: args.len(),
            });
        }
        Ok(self.routine.call(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::document::EntryDeclaration;
    use serde_json::json;

    fn image(entry_name: &str) -> ManifestImage {
        let routine = Routine::new(
            "pair",
            2,
            Arc::new(|args: Vec<Value>| CallOutcome::Value(json!([args[0], args[1]]))),
        );
        let manifest = DetectorManifest {
            entry: EntryDeclaration {
                name: entry_name.into(),
                routine: "pair".into(),
            },
            definition: None,
            resource_filter: None,
            system_filter: None,
            references: vec![],
            imports: vec![],
        };
        ManifestImage::new("pair.detector", manifest, routine).expect("image")
    }

    #[test]
    fn test_resolve_requires_matching_name() {
        let img = image("main");
        let err = img
            .resolve_entry_point(&EntryPointSignature::canonical())
            .err()
            .expect("mismatch");
        match err {
            ResolveError::Compilation(msg) => {
                assert_eq!(msg, "no entry point matching run(..) found; the unit declares 'main'")
            }
            other => panic!("unexpected error: {other}"),
        }

        let entry = img
            .resolve_entry_point(&EntryPointSignature::new("main"))
            .expect("resolve");
        assert_eq!(entry.arity(), 2);
    }

    #[test]
    fn test_short_argument_list_is_binding_error() {
        let entry = image("run")
            .resolve_entry_point(&EntryPointSignature::canonical())
            .expect("resolve");
        let err = entry.call(vec![json!(1)]).err().expect("binding error");
        assert_eq!(
            err,
            BindingError::MissingArguments {
                entry: "run".into(),
                expected: 2,
                supplied: 1,
            }
        );
    }
}
