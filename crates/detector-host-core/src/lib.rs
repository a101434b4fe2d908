//! Detector Host Core
//!
//! Execution core for hosted diagnostic detectors: turns a caller-authored
//! source unit into a callable entry point, extracts and validates its
//! declarative metadata, invokes it on demand, and exports the compiled
//! artifact.
//!
//! # Pipeline
//!
//! ```text
//! compile -> diagnose -> emit -> resolve -> extract -> validate -> (invoke | export)
//! ```
//!
//! Each stage fails fast. Error diagnostics stop before emission, a
//! compilation-category resolve failure stops before validation, and the first
//! violated validation rule stops the rest.
//!
//! # Core Modules
//!
//! - [`compiler`]: the narrow contract the invoker consumes from a compiler
//! - [`invoker`]: [`EntityInvoker`], the lifecycle state machine
//! - [`metadata`]: reads declarative attributes off a resolved entry point
//! - [`validation`]: ordered structural and cross-field rules
//! - [`invocation`]: argument binding and result normalization
//! - [`export`]: persisted/serialized artifact types
//! - [`manifest`]: reference compiler over JSON detector manifests
//!
//! # Example
//!
//! ```ignore
//! use detector_host_core::manifest::{ManifestCompiler, RoutineRegistry};
//! use detector_host_core::EntityInvoker;
//!
//! let mut registry = RoutineRegistry::new();
//! registry.register_value("echo", 1, |args| args[0].clone());
//!
//! let compiler = std::sync::Arc::new(ManifestCompiler::new(registry));
//! let mut invoker = EntityInvoker::new(EntityMetadata::new(source), compiler);
//! invoker.initialize_from_source().await?;
//! let output = invoker.invoke(vec![json!("hello")]).await?;
//! ```

pub mod compiler;
pub mod config;
pub mod errors;
pub mod export;
pub mod invocation;
pub mod invoker;
pub mod manifest;
pub mod metadata;
pub mod validation;

pub use compiler::{
    CallOutcome, CompilationHandle, CompilerService, EntryPoint, EntryPointSignature,
    ExecutableImage,
};
pub use config::InvokerConfig;
pub use errors::{BindingError, DetectorFault, InvokerError, ResolveError};
pub use export::ArtifactBytes;
pub use invoker::{EntityInvoker, InvokerState};
pub use validation::{ValidationError, ValidationReport, ValidationRules};

pub use detector_sandbox_types as types;
pub use detector_sandbox_types::{
    Attribute, DefinitionMetadata, DetectorOutput, Diagnostic, EntityMetadata, EntityType,
    ExtractedMetadata, ResourceFilter, Severity, SupportTopic, SystemFilter,
};
