//! Native routines a manifest entry point can bind to.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::compiler::CallOutcome;

/// Body of a routine. Receives exactly `arity` arguments.
pub type RoutineHandler = Arc<dyn Fn(Vec<Value>) -> CallOutcome + Send + Sync>;

#[derive(Clone)]
pub struct Routine {
    name: String,
    arity: usize,
    handler: RoutineHandler,
}

impl Routine {
    pub fn new(name: impl Into<String>, arity: usize, handler: RoutineHandler) -> Self {
        Self {
            name: name.into(),
            arity,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: Vec<Value>) -> CallOutcome {
        (self.handler)(args)
    }
}

impl fmt::Debug for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routine")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Routines by name.
#[derive(Debug, Clone, Default)]
pub struct RoutineRegistry {
    routines: BTreeMap<String, Routine>,
}

impl RoutineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a routine returning a raw [`CallOutcome`]. Replaces any
    /// routine already registered under `name`.
    pub fn register<F>(&mut self, name: &str, arity: usize, handler: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> CallOutcome + Send + Sync + 'static,
    {
        self.routines
            .insert(name.to_string(), Routine::new(name, arity, Arc::new(handler)));
        self
    }

    /// Register a routine that returns its value synchronously.
    pub fn register_value<F>(&mut self, name: &str, arity: usize, handler: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        self.register(name, arity, move |args| CallOutcome::Value(handler(args)))
    }

    /// Register a routine whose value arrives later.
    pub fn register_async<F, Fut>(&mut self, name: &str, arity: usize, handler: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.register(name, arity, move |args| CallOutcome::deferred(handler(args)))
    }

    /// Register a routine that completes later without a value.
    pub fn register_async_unit<F, Fut>(&mut self, name: &str, arity: usize, handler: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register(name, arity, move |args| {
            CallOutcome::deferred_unit(handler(args))
        })
    }

    pub fn get(&self, name: &str) -> Option<&Routine> {
        self.routines.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_replaces_and_lists_sorted() {
        let mut registry = RoutineRegistry::new();
        registry
            .register_value("zeta", 0, |_| json!(1))
            .register_value("alpha", 2, |_| json!(2))
            .register_value("zeta", 1, |_| json!(3));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
        assert_eq!(registry.get("zeta").map(Routine::arity), Some(1));
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn test_register_value_returns_value_outcome() {
        let mut registry = RoutineRegistry::new();
        registry.register_value("first", 1, |args| args[0].clone());
        let routine = registry.get("first").expect("registered");
        match routine.call(vec![json!("x")]) {
            CallOutcome::Value(v) => assert_eq!(v, json!("x")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
