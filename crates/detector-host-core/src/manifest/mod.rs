//! # Manifest Compiler
//!
//! A reference [`CompilerService`](crate::compiler::CompilerService) over JSON
//! detector manifests. The manifest carries the declarative metadata and names
//! a native routine from a [`RoutineRegistry`] as its entry point body.
//!
//! ```text
//! ┌────────────────────┐  parse   ┌──────────────────┐  emit   ┌───────────────┐
//! │ manifest JSON text │ ───────▶ │ DetectorManifest │ ──────▶ │ ManifestImage │
//! └────────────────────┘          └──────────────────┘         └───────────────┘
//!          │ diagnostics: syntax, allow-lists, routines                │ resolve
//!          ▼                                                           ▼
//!    ManifestHandle                                          ManifestEntryPoint
//! ```
//!
//! ## Manifest format
//!
//! ```json
//! {
//!   "entry": { "name": "run", "routine": "echo" },
//!   "definition": { "id": "cpu", "name": "CPU", "author": "ops",
//!                   "support_topics": [{ "id": "1", "pes_id": "14748" }] },
//!   "resource_filter": { "resource_type": "site", "internal_only": false },
//!   "references": ["metrics"],
//!   "imports": ["std.time"]
//! }
//! ```

pub mod compiler;
pub mod document;
pub mod image;
pub mod registry;

pub use compiler::{ManifestCompiler, ManifestHandle};
pub use document::{DetectorManifest, EntryDeclaration};
pub use image::{ManifestEntryPoint, ManifestImage};
pub use registry::{Routine, RoutineHandler, RoutineRegistry};
