//! Built-in routines
//!
//! | Routine | Arity | Result |
//! |---------|-------|--------|
//! | `echo`  | 1 | its argument, synchronously |
//! | `noop`  | 0 | completes later with no value |
//! | `count` | 1 | element count of an array, object, or string, completed later |

use anyhow::{anyhow, Result};
use detector_host_core::manifest::RoutineRegistry;
use serde_json::{json, Value};

/// Registry with every built-in routine.
pub fn builtin_registry() -> RoutineRegistry {
    let mut registry = RoutineRegistry::new();
    registry
        .register_value("echo", 1, |mut args| args.swap_remove(0))
        .register_async_unit("noop", 0, |_| async { anyhow::Ok(()) })
        .register_async("count", 1, |args| async move {
            let n = count(&args[0])?;
            anyhow::Ok(json!(n))
        });
    registry
}

fn count(value: &Value) -> Result<usize> {
    match value {
        Value::Array(items) => Ok(items.len()),
        Value::Object(fields) => Ok(fields.len()),
        Value::String(s) => Ok(s.chars().count()),
        other => Err(anyhow!("cannot count a {}", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detector_host_core::CallOutcome;

    #[test]
    fn test_builtins_are_registered() {
        let registry = builtin_registry();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["count", "echo", "noop"]
        );
        assert_eq!(registry.get("noop").map(|r| r.arity()), Some(0));
    }

    #[tokio::test]
    async fn test_count() {
        let registry = builtin_registry();
        let routine = registry.get("count").expect("count");

        match routine.call(vec![json!([1, 2, 3])]) {
            CallOutcome::Deferred(fut) => assert_eq!(fut.await.expect("count"), json!(3)),
            other => panic!("unexpected outcome: {other:?}"),
        }

        match routine.call(vec![json!(7)]) {
            CallOutcome::Deferred(fut) => {
                let err = fut.await.expect_err("numbers are not countable");
                assert_eq!(err.to_string(), "cannot count a number");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
