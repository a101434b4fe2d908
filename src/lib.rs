//! Detector Sandbox
//!
//! Local host for diagnostic detectors:
//!
//! - **Compile**: turn a detector manifest into an executable image
//! - **Validate**: check its Definition metadata before it can run
//! - **Invoke**: call its entry point with JSON arguments
//! - **Export**: save the compiled artifact or hand it over as base64
//!
//! The engine lives in [`detector_host_core`] and is re-exported here.
//! [`routines`] holds the native routines the `detector-sandbox` CLI binds
//! manifests to.

pub mod routines;

pub use detector_host_core::*;
