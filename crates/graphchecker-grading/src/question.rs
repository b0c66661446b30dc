//! A question type: its name, its preprocessor, and the checks it implements.

use graphchecker_types::Result;

use crate::check::{Check, CheckRegistry};
use crate::preprocess::Preprocess;

/// Everything the grader needs to know about one kind of question.
pub struct QuestionType<G> {
    name: String,
    preprocessor: Box<dyn Preprocess<G>>,
    checks: CheckRegistry<G>,
}

impl<G> QuestionType<G> {
    pub fn new(name: impl Into<String>, preprocessor: impl Preprocess<G> + 'static) -> Self {
        Self {
            name: name.into(),
            preprocessor: Box::new(preprocessor),
            checks: CheckRegistry::new(),
        }
    }

    /// Register a check implementation under `module.method`.
    pub fn with_check(
        mut self,
        module: impl Into<String>,
        method: impl Into<String>,
        check: impl Check<G> + 'static,
    ) -> Self {
        self.checks.register(module, method, check);
        self
    }

    pub fn with_registry(mut self, checks: CheckRegistry<G>) -> Self {
        self.checks = checks;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preprocessor(&self) -> &dyn Preprocess<G> {
        self.preprocessor.as_ref()
    }

    pub fn checks(&self) -> &CheckRegistry<G> {
        &self.checks
    }

    pub fn checks_mut(&mut self) -> &mut CheckRegistry<G> {
        &mut self.checks
    }

    pub fn preprocess(&self, raw: &str) -> Result<G> {
        self.preprocessor.preprocess(raw)
    }
}

impl<G> std::fmt::Debug for QuestionType<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionType")
            .field("name", &self.name)
            .field("checks", &self.checks.names())
            .finish()
    }
}
