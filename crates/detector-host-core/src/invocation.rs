//! Argument binding and result normalization.
//!
//! Callers pass an ordered argument list. It is truncated to the entry point's
//! arity before the call, so trailing extras are dropped silently; a short
//! list is left as-is for the entry point to reject.
//!
//! The raw [`CallOutcome`] is then normalized:
//!
//! | Outcome | Normalized to |
//! |---------|---------------|
//! | `Value(v)` | `DetectorOutput::Value(v)` |
//! | `Deferred(f)` | `DetectorOutput::Value(f.await?)` |
//! | `DeferredUnit(f)` | `DetectorOutput::NoValue` after `f.await?` |
//!
//! A failed future surfaces as a [`DetectorFault`] carrying the original error.

use detector_sandbox_types::DetectorOutput;
use serde_json::Value;
use tracing::debug;

use crate::compiler::{CallOutcome, EntryPoint};
use crate::errors::{DetectorFault, InvokerError};

/// Truncate `parameters` to at most `arity` arguments.
pub fn bind_arguments(arity: usize, mut parameters: Vec<Value>) -> Vec<Value> {
    if parameters.len() > arity {
        debug!(
            supplied = parameters.len(),
            arity = arity,
            "dropping extra arguments"
        );
        parameters.truncate(arity);
    }
    parameters
}

/// Await a call outcome into a single output shape.
pub async fn normalize(outcome: CallOutcome) -> Result<DetectorOutput, DetectorFault> {
    match outcome {
        CallOutcome::Value(value) => Ok(DetectorOutput::Value(value)),
        CallOutcome::Deferred(future) => future
            .await
            .map(DetectorOutput::Value)
            .map_err(DetectorFault::new),
        CallOutcome::DeferredUnit(future) => future
            .await
            .map(|()| DetectorOutput::NoValue)
            .map_err(DetectorFault::new),
    }
}

/// Bind, call, and normalize.
pub async fn call_entry_point(
    entry: &dyn EntryPoint,
    parameters: Vec<Value>,
) -> Result<DetectorOutput, InvokerError> {
    let args = bind_arguments(entry.arity(), parameters);
    let outcome = entry.call(args)?;
    debug!(entry = entry.name(), shape = outcome.shape(), "entry point returned");
    Ok(normalize(outcome).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BindingError;
    use detector_sandbox_types::Attribute;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("upstream timed out after {0}ms")]
    struct UpstreamTimeout(u64);

    /// Sums its arguments; `shape` picks how the result is returned.
    struct Summer {
        arity: usize,
        shape: &'static str,
    }

    impl EntryPoint for Summer {
        fn name(&self) -> &str {
            "run"
        }

        fn arity(&self) -> usize {
            self.arity
        }

        fn attributes(&self) -> &[Attribute] {
            &[]
        }

        fn call(&self, args: Vec<Value>) -> Result<CallOutcome, BindingError> {
            if args.len() < self.arity {
                return Err(BindingError::MissingArguments {
                    entry: "run".into(),
                    expected: self.arity,
                    supplied: args.len(),
                });
            }
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(match self.shape {
                "value" => CallOutcome::Value(json!(sum)),
                "deferred" => CallOutcome::deferred(async move { anyhow::Ok(json!(sum)) }),
                "unit" => CallOutcome::deferred_unit(async { anyhow::Ok(()) }),
                _ => CallOutcome::deferred(async {
                    Err::<Value, _>(anyhow::Error::new(UpstreamTimeout(250)))
                }),
            })
        }
    }

    #[test]
    fn test_bind_arguments_truncates_only_extras() {
        let args = vec![json!(1), json!(2), json!(3)];
        assert_eq!(bind_arguments(2, args.clone()), vec![json!(1), json!(2)]);
        assert_eq!(bind_arguments(3, args.clone()), args);
        assert_eq!(bind_arguments(5, args.clone()), args);
        assert!(bind_arguments(0, args).is_empty());
    }

    #[tokio::test]
    async fn test_extra_arguments_are_dropped() {
        let entry = Summer { arity: 2, shape: "value" };
        let output = call_entry_point(&entry, vec![json!(1), json!(2), json!(100)])
            .await
            .expect("call");
        assert_eq!(output, DetectorOutput::Value(json!(3)));
    }

    #[tokio::test]
    async fn test_missing_arguments_is_binding_error() {
        let entry = Summer { arity: 2, shape: "value" };
        let err = call_entry_point(&entry, vec![json!(1)]).await.unwrap_err();
        assert!(matches!(
            err,
            InvokerError::Binding(BindingError::MissingArguments { expected: 2, supplied: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_deferred_shapes_normalize() {
        let deferred = Summer { arity: 1, shape: "deferred" };
        let output = call_entry_point(&deferred, vec![json!(41)]).await.expect("call");
        assert_eq!(output.into_value(), Some(json!(41)));

        let unit = Summer { arity: 0, shape: "unit" };
        let output = call_entry_point(&unit, vec![json!("ignored")]).await.expect("call");
        assert!(output.is_no_value());
    }

    #[tokio::test]
    async fn test_fault_keeps_original_error() {
        let entry = Summer { arity: 0, shape: "fault" };
        let err = call_entry_point(&entry, vec![]).await.unwrap_err();
        assert_eq!(err.to_string(), "upstream timed out after 250ms");

        let original = err.into_fault().expect("fault");
        assert_eq!(original.downcast_ref::<UpstreamTimeout>().map(|e| e.0), Some(250));
    }
}
