//! Error taxonomy for the hosting pipeline.
//!
//! | Error | Raised when | Audience |
//! |-------|-------------|----------|
//! | [`InvokerError::CompilationFailure`] | error diagnostics, a fatal validation rule, or a call while not ready | detector author |
//! | [`InvokerError::Fault`] | the entry point's own computation failed | detector author |
//! | [`InvokerError::Binding`] | arguments could not be bound to the entry point | caller |
//! | [`InvokerError::Pipeline`] | anything else; a defect in the host itself | host operator |
//!
//! Faults and pipeline errors are transparent: their `Display` and `source`
//! are the original error's, and the original can be recovered by downcasting.

use thiserror::Error;

/// Errors surfaced by [`EntityInvoker`](crate::EntityInvoker).
#[derive(Debug, Error)]
pub enum InvokerError {
    /// The unit did not compile, failed validation, or is not ready.
    #[error("compilation failed:\n{output}")]
    CompilationFailure {
        /// Accumulated diagnostic text, one message per line.
        output: String,
    },

    #[error(transparent)]
    Fault(#[from] DetectorFault),

    #[error(transparent)]
    Binding(#[from] BindingError),

    /// Host defect, propagated unchanged.
    #[error(transparent)]
    Pipeline(anyhow::Error),
}

impl InvokerError {
    pub fn compilation_failure(lines: &[String]) -> Self {
        InvokerError::CompilationFailure {
            output: lines.join("\n"),
        }
    }

    pub fn is_compilation_failure(&self) -> bool {
        matches!(self, InvokerError::CompilationFailure { .. })
    }

    /// The entry point's original error, if this is a fault.
    pub fn into_fault(self) -> Option<anyhow::Error> {
        match self {
            InvokerError::Fault(fault) => Some(fault.into_inner()),
            _ => None,
        }
    }
}

/// An error raised by the invoked computation itself.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct DetectorFault(anyhow::Error);

impl DetectorFault {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self(error.into())
    }

    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}

/// Arguments could not be bound to an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("entry point '{entry}' expects {expected} argument(s) but {supplied} were supplied")]
    MissingArguments {
        entry: String,
        expected: usize,
        supplied: usize,
    },
}

/// Failure while resolving an entry point or reading its metadata.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The unit itself is at fault (no matching entry point, duplicated
    /// attributes). Reported as compilation output.
    #[error("{0}")]
    Compilation(String),

    /// The host is at fault. Propagated to the caller unchanged.
    #[error(transparent)]
    Pipeline(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("disk quota exceeded on {0}")]
    struct QuotaError(String);

    #[test]
    fn test_fault_is_transparent() {
        let err = InvokerError::from(DetectorFault::new(QuotaError("/data".into())));
        assert_eq!(err.to_string(), "disk quota exceeded on /data");

        let original = err.into_fault().expect("fault");
        assert_eq!(
            original.downcast_ref::<QuotaError>(),
            Some(&QuotaError("/data".into()))
        );
    }

    #[test]
    fn test_compilation_failure_joins_lines() {
        let err = InvokerError::compilation_failure(&[
            "(1,1): error: first".to_string(),
            "warning: second".to_string(),
        ]);
        assert!(err.is_compilation_failure());
        match err {
            InvokerError::CompilationFailure { output } => {
                assert_eq!(output, "(1,1): error: first\nwarning: second")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
