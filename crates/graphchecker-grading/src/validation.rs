//! Check-list validation: lint rules and diagnostics.
//!
//! Question authors assemble check lists by hand, so mistakes otherwise only
//! surface as errored outcomes at grading time. Call [`validate`] for
//! advisory diagnostics or [`validate_or_raise`] to fail on the first
//! `Error`-severity issue. Grading itself never requires validation.

use graphchecker_types::{CheckInvocation, CheckSpec, GradeDirective, GraderError, Result};
use serde::Serialize;

use crate::arguments::parse_integer;
use crate::catalog::{Catalog, ParamType};
use crate::check::CheckRegistry;

// ---------------------------------------------------------------------------
// Diagnostic types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    /// Position of the offending entry in the check list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What a rule looks at: the check list plus everything it refers to.
pub struct Subject<'a, G> {
    pub specs: &'a [CheckSpec],
    pub catalog: &'a Catalog,
    pub registry: &'a CheckRegistry<G>,
}

impl<'a, G> Subject<'a, G> {
    fn invocations(&self) -> impl Iterator<Item = (usize, &'a CheckInvocation)> {
        self.specs.iter().enumerate().filter_map(|(i, s)| match s {
            CheckSpec::Check(c) => Some((i, c)),
            CheckSpec::Grade(_) => None,
        })
    }

    fn directives(&self) -> impl Iterator<Item = (usize, &'a GradeDirective)> {
        self.specs.iter().enumerate().filter_map(|(i, s)| match s {
            CheckSpec::Grade(d) => Some((i, d)),
            CheckSpec::Check(_) => None,
        })
    }
}

// ---------------------------------------------------------------------------
// LintRule trait
// ---------------------------------------------------------------------------

pub trait LintRule<G>: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic>;
}

fn diagnostic(
    rule: &str,
    severity: Severity,
    index: usize,
    message: String,
    fix: Option<String>,
) -> Diagnostic {
    Diagnostic {
        rule: rule.into(),
        severity,
        message,
        index: Some(index),
        fix,
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

struct KnownModuleRule;
impl<G> LintRule<G> for KnownModuleRule {
    fn name(&self) -> &str { "known_module" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        let modules = subject.catalog.modules();
        subject
            .invocations()
            .filter(|(_, c)| !modules.contains_key(&c.module))
            .map(|(i, c)| {
                diagnostic(
                    LintRule::<G>::name(self),
                    Severity::Error,
                    i,
                    format!("Check {i} uses unknown module '{}'", c.module),
                    Some(format!(
                        "Use one of: {}",
                        modules.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
                )
            })
            .collect()
    }
}

struct KnownMethodRule;
impl<G> LintRule<G> for KnownMethodRule {
    fn name(&self) -> &str { "known_method" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for (i, c) in subject.invocations() {
            let Some(module) = subject.catalog.modules().get(&c.module) else {
                continue;
            };
            if !module.checks.contains_key(&c.method) {
                diags.push(diagnostic(
                    LintRule::<G>::name(self),
                    Severity::Error,
                    i,
                    format!("Check {i} uses unknown method '{}.{}'", c.module, c.method),
                    None,
                ));
            }
        }
        diags
    }
}

struct ImplementedRule;
impl<G> LintRule<G> for ImplementedRule {
    fn name(&self) -> &str { "implemented" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        subject
            .invocations()
            .filter(|(_, c)| subject.catalog.method(&c.module, &c.method).is_ok())
            .filter(|(_, c)| !subject.registry.has(&c.module, &c.method))
            .map(|(i, c)| {
                diagnostic(
                    LintRule::<G>::name(self),
                    Severity::Error,
                    i,
                    format!(
                        "Check {i}: '{}.{}' is described in the metadata but has no implementation",
                        c.module, c.method
                    ),
                    None,
                )
            })
            .collect()
    }
}

struct DeclaredArgumentsRule;
impl<G> LintRule<G> for DeclaredArgumentsRule {
    fn name(&self) -> &str { "declared_arguments" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for (i, c) in subject.invocations() {
            let Ok(meta) = subject.catalog.method(&c.module, &c.method) else {
                continue;
            };
            for name in c.arguments.keys() {
                if meta.param(name).is_none() {
                    diags.push(diagnostic(
                        LintRule::<G>::name(self),
                        Severity::Error,
                        i,
                        format!(
                            "Check {i}: argument '{name}' is not a parameter of '{}.{}'",
                            c.module, c.method
                        ),
                        Some(format!("Remove '{name}'")),
                    ));
                }
            }
        }
        diags
    }
}

struct RequiredArgumentsRule;
impl<G> LintRule<G> for RequiredArgumentsRule {
    fn name(&self) -> &str { "required_arguments" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for (i, c) in subject.invocations() {
            let Ok(meta) = subject.catalog.method(&c.module, &c.method) else {
                continue;
            };
            for p in &meta.params {
                if !c.arguments.contains_key(&p.param) {
                    diags.push(diagnostic(
                        LintRule::<G>::name(self),
                        Severity::Warning,
                        i,
                        format!(
                            "Check {i}: parameter '{}' of '{}.{}' has no argument",
                            p.param, c.module, c.method
                        ),
                        None,
                    ));
                }
            }
        }
        diags
    }
}

struct IntegerArgumentsRule;
impl<G> LintRule<G> for IntegerArgumentsRule {
    fn name(&self) -> &str { "integer_arguments" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        for (i, c) in subject.invocations() {
            let Ok(meta) = subject.catalog.method(&c.module, &c.method) else {
                continue;
            };
            for (name, value) in &c.arguments {
                let is_integer = meta
                    .param(name)
                    .is_some_and(|p| p.param_type == ParamType::Integer);
                if !is_integer {
                    continue;
                }
                if let Err(e) = parse_integer(name, value) {
                    diags.push(diagnostic(
                        LintRule::<G>::name(self),
                        Severity::Error,
                        i,
                        format!("Check {i}: {e}"),
                        None,
                    ));
                }
            }
        }
        diags
    }
}

struct PointsRangeRule;
impl<G> LintRule<G> for PointsRangeRule {
    fn name(&self) -> &str { "points_range" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        subject
            .directives()
            .filter(|(_, d)| !(0.0..=100.0).contains(&d.points))
            .map(|(i, d)| {
                diagnostic(
                    LintRule::<G>::name(self),
                    Severity::Error,
                    i,
                    format!("Grade directive {i} awards {} points; expected 0 to 100", d.points),
                    None,
                )
            })
            .collect()
    }
}

struct PointsTotalRule;
impl<G> LintRule<G> for PointsTotalRule {
    fn name(&self) -> &str { "points_total" }
    fn apply(&self, subject: &Subject<'_, G>) -> Vec<Diagnostic> {
        let total: f64 = subject.directives().map(|(_, d)| d.points).sum();
        if total <= 100.0 {
            return vec![];
        }
        vec![Diagnostic {
            rule: LintRule::<G>::name(self).into(),
            severity: Severity::Warning,
            message: format!("Grade directives award {total} points in total; the grade is capped at 100"),
            index: None,
            fix: Some("Lower the points so they sum to at most 100".into()),
        }]
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all built-in lint rules and return collected diagnostics.
pub fn validate<G>(
    specs: &[CheckSpec],
    catalog: &Catalog,
    registry: &CheckRegistry<G>,
) -> Vec<Diagnostic> {
    let rules: Vec<Box<dyn LintRule<G>>> = vec![
        Box::new(KnownModuleRule),
        Box::new(KnownMethodRule),
        Box::new(ImplementedRule),
        Box::new(DeclaredArgumentsRule),
        Box::new(RequiredArgumentsRule),
        Box::new(IntegerArgumentsRule),
        Box::new(PointsRangeRule),
        Box::new(PointsTotalRule),
    ];

    let subject = Subject {
        specs,
        catalog,
        registry,
    };
    let mut diagnostics = Vec::new();
    for rule in &rules {
        diagnostics.extend(rule.apply(&subject));
    }
    diagnostics
}

/// Run all lint rules; return `Err` if any `Error`-severity diagnostic found.
pub fn validate_or_raise<G>(
    specs: &[CheckSpec],
    catalog: &Catalog,
    registry: &CheckRegistry<G>,
) -> Result<Vec<Diagnostic>> {
    let diagnostics = validate(specs, catalog, registry);
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.message.clone())
        .collect();
    if !errors.is_empty() {
        return Err(GraderError::InvalidChecks(errors.join("; ")));
    }
    Ok(diagnostics)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
