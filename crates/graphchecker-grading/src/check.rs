//! Check trait, per-run check context, and the `(module, method)` check registry.

use std::collections::HashMap;

use graphchecker_types::{CheckResult, GraderError, Result};
use uuid::Uuid;

use crate::arguments::Arguments;
use crate::catalog::TypeDescriptor;

// ---------------------------------------------------------------------------
// CheckContext: what a check may know besides the graph and its arguments
// ---------------------------------------------------------------------------

/// Context built once per grading run and handed to every check.
///
/// Carries the question type's descriptor: its UI parameters and the extra
/// runtime modules the type declares.
#[derive(Debug, Clone)]
pub struct CheckContext<'a> {
    run_id: Uuid,
    question_type: &'a str,
    descriptor: &'a TypeDescriptor,
}

impl<'a> CheckContext<'a> {
    pub fn new(question_type: &'a str, descriptor: &'a TypeDescriptor) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            question_type,
            descriptor,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn question_type(&self) -> &str {
        self.question_type
    }

    pub fn ui_param(&self, name: &str) -> Option<&serde_json::Value> {
        self.descriptor.ui_params.get(name)
    }

    /// True when the UI parameter `name` is the JSON value `true`.
    pub fn ui_flag(&self, name: &str) -> bool {
        matches!(self.ui_param(name), Some(serde_json::Value::Bool(true)))
    }

    pub fn modules(&self) -> &[String] {
        &self.descriptor.modules
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.descriptor.modules.iter().any(|m| m == name)
    }
}

// ---------------------------------------------------------------------------
// Check trait
// ---------------------------------------------------------------------------

/// A grading rule over a domain graph `G`.
///
/// Checks must not write to standard output; the hosting process reserves it
/// for the report.
pub trait Check<G>: Send + Sync {
    fn run(&self, graph: &G, args: &Arguments<G>, ctx: &CheckContext<'_>) -> Result<CheckResult>;
}

impl<G, F> Check<G> for F
where
    F: Fn(&G, &Arguments<G>, &CheckContext<'_>) -> Result<CheckResult> + Send + Sync,
{
    fn run(&self, graph: &G, args: &Arguments<G>, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        self(graph, args, ctx)
    }
}

// ---------------------------------------------------------------------------
// CheckRegistry
// ---------------------------------------------------------------------------

/// Maps `(module, method)` names from the check list to implementations.
pub struct CheckRegistry<G> {
    checks: HashMap<(String, String), Box<dyn Check<G>>>,
}

impl<G> CheckRegistry<G> {
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        module: impl Into<String>,
        method: impl Into<String>,
        check: impl Check<G> + 'static,
    ) {
        self.checks
            .insert((module.into(), method.into()), Box::new(check));
    }

    pub fn get(&self, module: &str, method: &str) -> Option<&dyn Check<G>> {
        self.checks
            .get(&(module.to_string(), method.to_string()))
            .map(|c| c.as_ref())
    }

    pub fn has(&self, module: &str, method: &str) -> bool {
        self.get(module, method).is_some()
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.checks.keys().any(|(m, _)| m == module)
    }

    /// Look up an implementation, distinguishing unknown modules from unknown methods.
    pub fn resolve(&self, module: &str, method: &str) -> Result<&dyn Check<G>> {
        if let Some(check) = self.get(module, method) {
            return Ok(check);
        }
        if self.has_module(module) {
            Err(GraderError::UnknownMethod {
                module: module.to_string(),
                method: method.to_string(),
            })
        } else {
            Err(GraderError::UnknownModule {
                module: module.to_string(),
            })
        }
    }

    /// Registered `(module, method)` pairs, sorted.
    pub fn names(&self) -> Vec<(&str, &str)> {
        let mut names: Vec<_> = self
            .checks
            .keys()
            .map(|(m, f)| (m.as_str(), f.as_str()))
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl<G> Default for CheckRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
