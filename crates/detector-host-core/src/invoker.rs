//! Entity Invoker
//!
//! [`EntityInvoker`] owns the lifecycle of one hosted unit:
//!
//! ```text
//! New --initialize--> Compiling --error diagnostics / unit-level resolve failure--> CompiledFailed
//!                         |
//!                         +--emit, resolve, extract--> validate --ok--> Ready
//!                                                          |
//!                                                          +--violation--> ValidationFailed
//! ```
//!
//! Only `Ready` units can be invoked. Re-initializing restarts from
//! `Compiling` and the last pass wins. There is no internal lock: the
//! initialize calls take `&mut self`, so an instance shared between tasks has
//! to be wrapped by the caller.
//!
//! Failures that belong to the detector (diagnostics, validation, a missing
//! entry point) are recorded in [`EntityInvoker::compilation_output`] and do
//! not make `initialize_*` return `Err`. Anything else is a host defect and is
//! returned as [`InvokerError::Pipeline`] unchanged.

use detector_sandbox_types::diagnostic::has_errors;
use detector_sandbox_types::{
    DefinitionMetadata, DetectorOutput, EntityMetadata, ExtractedMetadata, ResourceFilter,
    SystemFilter,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::compiler::{
    CompilationHandle, CompilerService, EntryPoint, EntryPointSignature, ExecutableImage,
};
use crate::config::InvokerConfig;
use crate::errors::{InvokerError, ResolveError};
use crate::export::ArtifactBytes;
use crate::invocation;
use crate::metadata::extract_metadata;
use crate::validation::{validate, ValidationError};

/// Lifecycle state of an [`EntityInvoker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokerState {
    New,
    Compiling,
    CompiledFailed,
    Ready,
    ValidationFailed,
}

impl fmt::Display for InvokerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvokerState::New => "new",
            InvokerState::Compiling => "compiling",
            InvokerState::CompiledFailed => "compiled_failed",
            InvokerState::Ready => "ready",
            InvokerState::ValidationFailed => "validation_failed",
        };
        f.write_str(name)
    }
}

/// Compiles, validates, and invokes one hosted unit.
pub struct EntityInvoker {
    entity: EntityMetadata,
    compiler: Arc<dyn CompilerService>,
    references: Option<Vec<String>>,
    imports: Option<Vec<String>>,
    config: InvokerConfig,

    state: InvokerState,
    successful: bool,
    output: Vec<String>,
    metadata: ExtractedMetadata,
    validation_error: Option<ValidationError>,
    image: Option<Arc<dyn ExecutableImage>>,
    entry_point: Option<Arc<dyn EntryPoint>>,
}

impl fmt::Debug for EntityInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityInvoker")
            .field("entity", &self.entity.label())
            .field("compiler", &self.compiler.name())
            .field("image", &self.image.as_ref().map(|i| i.name().to_string()))
            .field("state", &self.state)
            .field("successful", &self.successful)
            .field("output_lines", &self.output.len())
            .finish()
    }
}

impl EntityInvoker {
    /// Create an invoker in state `New`. Nothing is compiled yet.
    pub fn new(entity: EntityMetadata, compiler: Arc<dyn CompilerService>) -> Self {
        Self {
            entity,
            compiler,
            references: None,
            imports: None,
            config: InvokerConfig::default(),
            state: InvokerState::New,
            successful: false,
            output: Vec::new(),
            metadata: ExtractedMetadata::default(),
            validation_error: None,
            image: None,
            entry_point: None,
        }
    }

    /// Restrict which references the compiler may resolve.
    pub fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = Some(references);
        self
    }

    /// Restrict which imports the compiler may resolve.
    pub fn with_imports(mut self, imports: Vec<String>) -> Self {
        self.imports = Some(imports);
        self
    }

    pub fn with_config(mut self, config: InvokerConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Run the full pipeline: compile, diagnose, emit, resolve, extract, validate.
    pub async fn initialize_from_source(&mut self) -> Result<(), InvokerError> {
        self.reset(InvokerState::Compiling);
        info!(
            entity = %self.entity.label(),
            compiler = self.compiler.name(),
            "compiling"
        );

        let handle = self.compile().await?;
        let diagnostics = handle.diagnostics().await.map_err(InvokerError::Pipeline)?;
        self.output = diagnostics.iter().map(ToString::to_string).collect();

        if has_errors(&diagnostics) {
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            warn!(entity = %self.entity.label(), errors = errors, "compilation failed");
            self.fail(InvokerState::CompiledFailed);
            return Ok(());
        }

        let image = handle.emit().await.map_err(InvokerError::Pipeline)?;
        let signature = handle.entry_point_signature();
        if !self.load(image, &signature)? {
            return Ok(());
        }

        self.run_validation();
        Ok(())
    }

    /// Initialize from an already-emitted image, skipping the compiler.
    ///
    /// Compilation is assumed to have succeeded. Only entry point resolution
    /// and metadata extraction run; validation does not.
    pub fn initialize_from_executable(
        &mut self,
        image: Arc<dyn ExecutableImage>,
    ) -> Result<(), InvokerError> {
        self.reset(InvokerState::Compiling);
        info!(
            entity = %self.entity.label(),
            image = image.name(),
            "loading preloaded image"
        );

        let signature = self.config.entry_point_signature();
        if self.load(image, &signature)? {
            self.succeed();
        }
        Ok(())
    }

    /// Resolve the entry point and read its metadata. Returns `Ok(false)` when
    /// the unit itself is at fault, after recording why.
    fn load(
        &mut self,
        image: Arc<dyn ExecutableImage>,
        signature: &EntryPointSignature,
    ) -> Result<bool, InvokerError> {
        let resolved = image
            .resolve_entry_point(signature)
            .and_then(|entry| extract_metadata(entry.as_ref()).map(|m| (entry, m)));

        match resolved {
            Ok((entry, metadata)) => {
                debug!(
                    entity = %self.entity.label(),
                    entry = entry.name(),
                    arity = entry.arity(),
                    has_definition = metadata.definition.is_some(),
                    "resolved entry point"
                );
                self.image = Some(image);
                self.entry_point = Some(entry);
                self.metadata = metadata;
                Ok(true)
            }
            Err(ResolveError::Compilation(message)) => {
                warn!(entity = %self.entity.label(), signature = %signature, "{}", message);
                self.output.push(message);
                self.fail(InvokerState::CompiledFailed);
                Ok(false)
            }
            Err(ResolveError::Pipeline(err)) => Err(InvokerError::Pipeline(err)),
        }
    }

    fn run_validation(&mut self) {
        match validate(&self.metadata, &self.config.validation_rules()) {
            Ok(report) => {
                if !report.ran {
                    debug!(entity = %self.entity.label(), "no definition; validation skipped");
                }
                for warning in &report.warnings {
                    warn!(entity = %self.entity.label(), "{}", warning);
                }
                self.output.extend(report.warnings);
                self.succeed();
            }
            Err(violation) => {
                warn!(entity = %self.entity.label(), error = %violation, "validation failed");
                self.output.push(format!("error: {}", violation));
                self.validation_error = Some(violation);
                self.fail(InvokerState::ValidationFailed);
            }
        }
    }

    fn reset(&mut self, state: InvokerState) {
        self.state = state;
        self.successful = false;
        self.output.clear();
        self.metadata = ExtractedMetadata::default();
        self.validation_error = None;
        self.image = None;
        self.entry_point = None;
    }

    fn succeed(&mut self) {
        self.state = InvokerState::Ready;
        self.successful = true;
        info!(entity = %self.entity.label(), "ready");
    }

    fn fail(&mut self, state: InvokerState) {
        self.state = state;
        self.successful = false;
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Invoke the entry point. Extra trailing parameters are dropped.
    pub async fn invoke(&self, parameters: Vec<Value>) -> Result<DetectorOutput, InvokerError> {
        let entry = match (&self.state, &self.entry_point) {
            (InvokerState::Ready, Some(entry)) => Arc::clone(entry),
            _ => return Err(self.not_ready()),
        };
        debug!(
            entity = %self.entity.label(),
            supplied = parameters.len(),
            "invoking"
        );
        invocation::call_entry_point(entry.as_ref(), parameters).await
    }

    fn ensure_ready(&self) -> Result<(), InvokerError> {
        match self.state {
            InvokerState::Ready => Ok(()),
            _ => Err(self.not_ready()),
        }
    }

    /// The state line first, then whatever the last pass recorded.
    fn not_ready(&self) -> InvokerError {
        let mut lines = Vec::with_capacity(self.output.len() + 1);
        lines.push(format!("entity is not ready (state: {})", self.state));
        lines.extend(self.output.iter().cloned());
        InvokerError::compilation_failure(&lines)
    }

    // ========================================================================
    // Artifact export
    // ========================================================================

    /// Recompile from scratch and write the artifact to `path`.
    ///
    /// Requires `Ready`. The earlier pass only gates the call; its image is
    /// never what gets written.
    pub async fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<PathBuf, InvokerError> {
        self.ensure_ready()?;
        let handle = self.compile_clean().await?;
        let saved = handle
            .save(path.as_ref())
            .await
            .map_err(InvokerError::Pipeline)?;
        info!(entity = %self.entity.label(), path = %saved.display(), "artifact saved");
        Ok(saved)
    }

    /// Recompile from scratch and return the serialized artifact.
    pub async fn get_bytes(&self) -> Result<ArtifactBytes, InvokerError> {
        self.ensure_ready()?;
        let handle = self.compile_clean().await?;
        handle.bytes().await.map_err(InvokerError::Pipeline)
    }

    async fn compile(&self) -> Result<Box<dyn CompilationHandle>, InvokerError> {
        self.compiler
            .compile(
                &self.entity.script_text,
                self.references.as_deref(),
                self.imports.as_deref(),
            )
            .await
            .map_err(InvokerError::Pipeline)
    }

    /// Compile and fail on any error diagnostic. Never reuses a prior pass.
    async fn compile_clean(&self) -> Result<Box<dyn CompilationHandle>, InvokerError> {
        let handle = self.compile().await?;
        let diagnostics = handle.diagnostics().await.map_err(InvokerError::Pipeline)?;
        if has_errors(&diagnostics) {
            let lines: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
            return Err(InvokerError::compilation_failure(&lines));
        }
        Ok(handle)
    }

    // ========================================================================
    // Disposal
    // ========================================================================

    /// Drop the image and entry point. Compilation output is kept.
    pub fn dispose(&mut self) {
        debug!(entity = %self.entity.label(), "disposing");
        self.image = None;
        self.entry_point = None;
        self.state = InvokerState::New;
        self.successful = false;
    }

    // ========================================================================
    // Observables
    // ========================================================================

    pub fn entity(&self) -> &EntityMetadata {
        &self.entity
    }

    pub fn state(&self) -> InvokerState {
        self.state
    }

    pub fn is_compilation_successful(&self) -> bool {
        self.successful
    }

    /// Diagnostic lines of the last pass, warnings included, in order.
    pub fn compilation_output(&self) -> &[String] {
        &self.output
    }

    pub fn metadata(&self) -> &ExtractedMetadata {
        &self.metadata
    }

    pub fn definition(&self) -> Option<&DefinitionMetadata> {
        self.metadata.definition.as_ref()
    }

    pub fn resource_filter(&self) -> Option<&ResourceFilter> {
        self.metadata.resource_filter.as_ref()
    }

    pub fn system_filter(&self) -> Option<&SystemFilter> {
        self.metadata.system_filter.as_ref()
    }

    /// The rule the last pass violated, if validation failed.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    pub fn entry_point(&self) -> Option<&Arc<dyn EntryPoint>> {
        self.entry_point.as_ref()
    }

    pub fn image(&self) -> Option<&Arc<dyn ExecutableImage>> {
        self.image.as_ref()
    }
}
