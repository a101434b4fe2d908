//! Compiler Service Contract
//!
//! The invoker never compiles anything itself. It consumes a compiler through
//! the traits in this module:
//!
//! - [`CompilerService`] turns source text into a [`CompilationHandle`]
//! - [`CompilationHandle`] reports diagnostics, emits an [`ExecutableImage`],
//!   and can persist or serialize the compiled unit
//! - [`ExecutableImage`] resolves exactly one [`EntryPoint`] for a signature
//! - [`EntryPoint`] is the callable, plus its declarative attributes
//!
//! Reference and import allow-lists are forwarded to the compiler opaquely.

use anyhow::Result;
use async_trait::async_trait;
use detector_sandbox_types::{Attribute, Diagnostic};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{BindingError, ResolveError};
use crate::export::ArtifactBytes;

/// Name of the canonical entry point every unit must expose.
pub const DEFAULT_ENTRY_POINT: &str = "run";

/// Compiles source text into a handle.
#[async_trait]
pub trait CompilerService: Send + Sync {
    /// Compile `source`. Returning `Err` means the compiler itself broke;
    /// problems with the source are reported as diagnostics on the handle.
    async fn compile(
        &self,
        source: &str,
        references: Option<&[String]>,
        imports: Option<&[String]>,
    ) -> Result<Box<dyn CompilationHandle>>;

    /// Compiler name, for logging.
    fn name(&self) -> &str;
}

/// Result of one compile request.
#[async_trait]
pub trait CompilationHandle: Send + Sync {
    async fn diagnostics(&self) -> Result<Vec<Diagnostic>>;

    /// The signature convention an entry point must match.
    fn entry_point_signature(&self) -> EntryPointSignature;

    /// Produce a loadable image. Only valid when there are no error diagnostics.
    async fn emit(&self) -> Result<Arc<dyn ExecutableImage>>;

    /// Write the compiled unit to `path` and return where it landed.
    async fn save(&self, path: &Path) -> Result<PathBuf>;

    /// Serialize the compiled unit.
    async fn bytes(&self) -> Result<ArtifactBytes>;
}

/// A loaded, executable unit.
pub trait ExecutableImage: Send + Sync {
    fn name(&self) -> &str;

    /// Resolve the one callable matching `signature`, or fail.
    fn resolve_entry_point(
        &self,
        signature: &EntryPointSignature,
    ) -> Result<Arc<dyn EntryPoint>, ResolveError>;
}

/// A resolved callable with its declarative attributes.
pub trait EntryPoint: Send + Sync {
    fn name(&self) -> &str;

    /// Number of declared parameters.
    fn arity(&self) -> usize;

    fn attributes(&self) -> &[Attribute];

    /// Call with already-bound arguments. Too few arguments is a binding error.
    fn call(&self, args: Vec<Value>) -> Result<CallOutcome, BindingError>;
}

/// Fixed shape an entry point is looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPointSignature {
    pub name: String,
}

impl EntryPointSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn canonical() -> Self {
        Self::new(DEFAULT_ENTRY_POINT)
    }
}

impl Default for EntryPointSignature {
    fn default() -> Self {
        Self::canonical()
    }
}

impl fmt::Display for EntryPointSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(..)", self.name)
    }
}

/// Raw result of calling an entry point, before normalization.
pub enum CallOutcome {
    /// Produced synchronously.
    Value(Value),
    /// Completes later with a value.
    Deferred(BoxFuture<'static, Result<Value>>),
    /// Completes later without a value.
    DeferredUnit(BoxFuture<'static, Result<()>>),
}

impl CallOutcome {
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value>> + Send + 'static,
    {
        CallOutcome::Deferred(future.boxed())
    }

    pub fn deferred_unit<F>(future: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        CallOutcome::DeferredUnit(future.boxed())
    }

    pub fn shape(&self) -> &'static str {
        match self {
            CallOutcome::Value(_) => "value",
            CallOutcome::Deferred(_) => "deferred",
            CallOutcome::DeferredUnit(_) => "deferred_unit",
        }
    }
}

impl fmt::Debug for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallOutcome::Value(v) => f.debug_tuple("Value").field(v).finish(),
            other => write!(f, "{}(..)", other.shape()),
        }
    }
}
