//! CLI subcommand implementations for detector-sandbox

pub mod check;
pub mod export;
pub mod inspect;
pub mod output;
pub mod run;

use anyhow::{Context, Result};
use detector_sandbox::manifest::ManifestCompiler;
use detector_sandbox::routines::builtin_registry;
use detector_sandbox::types::env_utils::env_list;
use detector_sandbox::{EntityInvoker, EntityMetadata, InvokerConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Compiler, allow-lists, and config shared by every subcommand.
pub struct Session {
    compiler: Arc<ManifestCompiler>,
    references: Option<Vec<String>>,
    imports: Option<Vec<String>>,
    config: InvokerConfig,
}

impl Session {
    /// Flags win over `DETECTOR_REFERENCES` / `DETECTOR_IMPORTS`. An empty
    /// allow-list means "no restriction".
    pub fn new(mut references: Vec<String>, mut imports: Vec<String>) -> Self {
        if references.is_empty() {
            references = env_list("DETECTOR_REFERENCES");
        }
        if imports.is_empty() {
            imports = env_list("DETECTOR_IMPORTS");
        }
        debug!(?references, ?imports, "allow-lists");
        Self {
            compiler: Arc::new(ManifestCompiler::from_env(builtin_registry())),
            references: (!references.is_empty()).then_some(references),
            imports: (!imports.is_empty()).then_some(imports),
            config: InvokerConfig::from_env(),
        }
    }

    pub fn compiler(&self) -> &Arc<ManifestCompiler> {
        &self.compiler
    }

    /// A fresh invoker for `entity`, not yet initialized.
    pub fn invoker(&self, entity: EntityMetadata) -> EntityInvoker {
        let mut invoker = EntityInvoker::new(entity, self.compiler.clone())
            .with_config(self.config.clone());
        if let Some(references) = &self.references {
            invoker = invoker.with_references(references.clone());
        }
        if let Some(imports) = &self.imports {
            invoker = invoker.with_imports(imports.clone());
        }
        invoker
    }

    /// Read a manifest from disk and run it through the full pipeline.
    pub async fn compile(&self, manifest: &Path) -> Result<EntityInvoker> {
        debug!(manifest = %manifest.display(), "reading manifest");
        let source = tokio::fs::read_to_string(manifest)
            .await
            .with_context(|| format!("failed to read manifest {}", manifest.display()))?;
        let mut invoker = self.invoker(EntityMetadata::new(source).with_location(manifest));
        invoker.initialize_from_source().await?;
        info!(
            manifest = %manifest.display(),
            state = %invoker.state(),
            output_lines = invoker.compilation_output().len(),
            "manifest initialized"
        );
        Ok(invoker)
    }
}
