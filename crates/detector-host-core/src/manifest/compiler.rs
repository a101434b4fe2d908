//! [`CompilerService`] implementation for detector manifests.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use detector_sandbox_types::diagnostic::has_errors;
use detector_sandbox_types::env_utils::env_string;
use detector_sandbox_types::Diagnostic;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::document::DetectorManifest;
use super::image::ManifestImage;
use super::registry::RoutineRegistry;
use crate::compiler::{CompilationHandle, CompilerService, EntryPointSignature, ExecutableImage};
use crate::export::{artifact_name, ArtifactBytes, DEFAULT_ARTIFACT_EXTENSION};

/// Compiles JSON manifests against a routine registry.
#[derive(Debug, Clone)]
pub struct ManifestCompiler {
    registry: Arc<RoutineRegistry>,
    artifact_extension: String,
}

impl ManifestCompiler {
    pub fn new(registry: RoutineRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        }
    }

    /// Like [`new`](Self::new), honoring `DETECTOR_ARTIFACT_EXTENSION`.
    pub fn from_env(registry: RoutineRegistry) -> Self {
        let compiler = Self::new(registry);
        match env_string("DETECTOR_ARTIFACT_EXTENSION") {
            Some(ext) => compiler.with_artifact_extension(ext.trim().trim_start_matches('.')),
            None => compiler,
        }
    }

    pub fn with_artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }

    /// Reload an exported artifact as an executable image.
    pub fn load_image(&self, name: &str, bytes: &[u8]) -> Result<Arc<dyn ExecutableImage>> {
        let manifest = DetectorManifest::from_bytes(bytes)?;
        let routine = self
            .registry
            .get(&manifest.entry.routine)
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "artifact '{}' needs routine '{}', which is not registered",
                    name,
                    manifest.entry.routine
                )
            })?;
        Ok(Arc::new(ManifestImage::new(name, manifest, routine)?))
    }

    /// Parse and check `source`, collecting diagnostics in source order.
    fn check(
        &self,
        source: &str,
        references: Option<&[String]>,
        imports: Option<&[String]>,
    ) -> (Option<DetectorManifest>, Vec<Diagnostic>) {
        let manifest = match DetectorManifest::parse(source) {
            Ok(manifest) => manifest,
            Err(diagnostic) => return (None, vec![diagnostic]),
        };

        let mut diagnostics = Vec::new();
        check_allowed("reference", &manifest.references, references, &mut diagnostics);
        check_allowed("import", &manifest.imports, imports, &mut diagnostics);

        if !self.registry.contains(&manifest.entry.routine) {
            diagnostics.push(Diagnostic::error(format!(
                "entry point '{}' is bound to unknown routine '{}'",
                manifest.entry.name, manifest.entry.routine
            )));
        }

        (Some(manifest), diagnostics)
    }
}

/// Each declared name must be in the allow-list, when one is given.
/// Duplicates only warn.
fn check_allowed(
    kind: &str,
    declared: &[String],
    allowed: Option<&[String]>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut seen = HashSet::new();
    for name in declared {
        if !seen.insert(name.as_str()) {
            diagnostics.push(Diagnostic::warning(format!("duplicate {} '{}'", kind, name)));
            continue;
        }
        if let Some(allowed) = allowed {
            if !allowed.iter().any(|a| a == name) {
                diagnostics.push(Diagnostic::error(format!(
                    "{} '{}' is not permitted for this detector",
                    kind, name
                )));
            }
        }
    }
}

#[async_trait]
impl CompilerService for ManifestCompiler {
    async fn compile(
        &self,
        source: &str,
        references: Option<&[String]>,
        imports: Option<&[String]>,
    ) -> Result<Box<dyn CompilationHandle>> {
        let (manifest, diagnostics) = self.check(source, references, imports);
        debug!(
            diagnostics = diagnostics.len(),
            parsed = manifest.is_some(),
            "compiled manifest"
        );

        let name = artifact_name(
            manifest.as_ref().and_then(DetectorManifest::definition_id),
            source,
            &self.artifact_extension,
        );

        Ok(Box::new(ManifestHandle {
            name,
            manifest,
            diagnostics,
            registry: Arc::clone(&self.registry),
        }))
    }

    fn name(&self) -> &str {
        "manifest"
    }
}

/// One manifest compile result.
#[derive(Debug)]
pub struct ManifestHandle {
    name: String,
    manifest: Option<DetectorManifest>,
    diagnostics: Vec<Diagnostic>,
    registry: Arc<RoutineRegistry>,
}

impl ManifestHandle {
    fn image(&self) -> Result<ManifestImage> {
        if has_errors(&self.diagnostics) {
            return Err(anyhow!(
                "cannot emit '{}': the unit has compilation errors",
                self.name
            ));
        }
        let manifest = self
            .manifest
            .clone()
            .ok_or_else(|| anyhow!("cannot emit '{}': no manifest was parsed", self.name))?;
        let routine = self
            .registry
            .get(&manifest.entry.routine)
            .cloned()
            .ok_or_else(|| anyhow!("routine '{}' disappeared", manifest.entry.routine))?;
        ManifestImage::new(self.name.clone(), manifest, routine)
    }
}

#[async_trait]
impl CompilationHandle for ManifestHandle {
    async fn diagnostics(&self) -> Result<Vec<Diagnostic>> {
        Ok(self.diagnostics.clone())
    }

    fn entry_point_signature(&self) -> EntryPointSignature {
        EntryPointSignature::canonical()
    }

    async fn emit(&self) -> Result<Arc<dyn ExecutableImage>> {
        Ok(Arc::new(self.image()?))
    }

    async fn save(&self, path: &Path) -> Result<PathBuf> {
        let image = self.image()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(path, image.bytes())
            .await
            .with_context(|| format!("failed to write artifact to {}", path.display()))?;
        Ok(path.to_path_buf())
    }

    async fn bytes(&self) -> Result<ArtifactBytes> {
        let image = self.image()?;
        Ok(ArtifactBytes::encode(self.name.clone(), image.bytes()))
    }
}
