//! Shared types for the detector-sandbox workspace.
//!
//! This crate holds the plain data types that flow between the compiler
//! contract, the invoker, and the hosting layer, so that none of them has to
//! depend on the others.
//!
//! ## Modules
//!
//! - [`entity`] - identity of a source unit ([`EntityMetadata`])
//! - [`diagnostic`] - compiler diagnostics and severities
//! - [`metadata`] - declarative records read off an entry point
//! - [`output`] - normalized invocation output
//! - [`env_utils`] - environment variable parsing for configuration

pub mod diagnostic;
pub mod entity;
pub mod env_utils;
pub mod metadata;
pub mod output;

pub use diagnostic::{Diagnostic, Severity, SourceLocation};
pub use entity::{EntityMetadata, EntityType};
pub use metadata::{
    Attribute, DefinitionMetadata, ExtractedMetadata, ResourceFilter, SupportTopic, SystemFilter,
};
pub use output::DetectorOutput;
