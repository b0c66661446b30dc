//! Shared types, errors, check results, and grading reports for GraphChecker.
//!
//! This crate provides the foundational types used across all other GraphChecker crates:
//! - `GraderError`: unified error taxonomy
//! - `Value`: closed value variant carried in check results
//! - `CheckResult` / `CheckOutcome`: what a check returns and what the report records
//! - `CheckSpec`: one entry of an author-configured check list
//! - `GradingReport`: the response of a grading run

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

mod points_serde;

/// Feedback shown when a student submits nothing at all.
pub const EMPTY_ANSWER_FEEDBACK: &str = "You submitted an empty answer";

/// Unified error type for all GraphChecker subsystems.
#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    // === Terminal Errors ===
    #[error("{}", EMPTY_ANSWER_FEEDBACK)]
    EmptySubmission,

    #[error("{message}")]
    Preprocess { message: String },

    // === Per-check Errors ===
    #[error("Unknown argument '{param}' (not declared in the check metadata)")]
    ArgumentSchema { param: String },

    #[error("Argument '{param}' should be of type {expected}, got {value}")]
    ArgumentType {
        param: String,
        expected: String,
        value: String,
    },

    #[error("Missing argument '{param}'")]
    MissingArgument { param: String },

    #[error("Unknown check module '{module}'")]
    UnknownModule { module: String },

    #[error("Unknown check method '{method}' in module '{module}'")]
    UnknownMethod { module: String, method: String },

    #[error("{0}")]
    CheckInvocation(String),

    // === Catalog Errors ===
    #[error("Invalid check metadata in {path}: {message}")]
    Metadata { path: String, message: String },

    #[error("Invalid check list: {0}")]
    InvalidChecks(String),

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl GraderError {
    /// Shorthand for a preprocessing failure carrying a student-facing message.
    pub fn preprocess(message: impl Into<String>) -> Self {
        GraderError::Preprocess {
            message: message.into(),
        }
    }

    /// Returns `true` if the error ends the whole grading run.
    ///
    /// Only an empty submission and a failed preprocessing step are terminal;
    /// everything else is isolated to the check that raised it.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GraderError::EmptySubmission | GraderError::Preprocess { .. }
        )
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GraderError::EmptySubmission => "empty_submission",
            GraderError::Preprocess { .. } => "preprocess",
            GraderError::ArgumentSchema { .. } => "argument_schema",
            GraderError::ArgumentType { .. } => "argument_type",
            GraderError::MissingArgument { .. } => "missing_argument",
            GraderError::UnknownModule { .. } | GraderError::UnknownMethod { .. } => {
                "unknown_check"
            }
            GraderError::CheckInvocation(_) => "check_invocation",
            GraderError::Metadata { .. } => "metadata",
            GraderError::InvalidChecks(_) => "invalid_checks",
            GraderError::Io(_) => "io",
            GraderError::Json(_) => "json",
            GraderError::Other(_) => "other",
        }
    }
}

/// A convenience alias for `Result<T, GraderError>`.
pub type Result<T> = std::result::Result<T, GraderError>;

// ---------------------------------------------------------------------------
// Value: closed variant for extra check-result fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Integer(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// CheckResult: what a check function returns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CheckResult {
    /// A passing result without feedback.
    pub fn pass() -> Self {
        Self {
            correct: true,
            feedback: None,
            extra: BTreeMap::new(),
        }
    }

    /// A failing result. `feedback` is either final text or a template key.
    pub fn fail(feedback: impl Into<String>) -> Self {
        Self {
            correct: false,
            feedback: Some(feedback.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Attach an extra field usable as a `[[name]]` placeholder.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Stringified value of one of the result's own fields, if present.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "correct" => Some(self.correct.to_string()),
            "feedback" => self.feedback.clone(),
            _ => self.extra.get(name).map(Value::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// CheckOutcome: one entry in the grading report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub module: String,
    pub method: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomeStatus {
    Completed(CheckResult),
    Errored { error: String },
}

impl CheckOutcome {
    /// Outcome of a check that ran to completion.
    pub fn completed(
        module: impl Into<String>,
        method: impl Into<String>,
        result: CheckResult,
    ) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
            status: OutcomeStatus::Completed(result),
        }
    }

    /// Outcome of a check that could not be looked up, converted, or run.
    pub fn errored(
        module: impl Into<String>,
        method: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
            status: OutcomeStatus::Errored {
                error: error.into(),
            },
        }
    }

    /// `Some(correct)` for completed checks, `None` for errored ones.
    pub fn correct(&self) -> Option<bool> {
        match &self.status {
            OutcomeStatus::Completed(r) => Some(r.correct),
            OutcomeStatus::Errored { .. } => None,
        }
    }

    pub fn feedback(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Completed(r) => r.feedback.as_deref(),
            OutcomeStatus::Errored { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Completed(_) => None,
            OutcomeStatus::Errored { error } => Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// GradingReport: the response of one grading run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradingReport {
    Success {
        results: Vec<CheckOutcome>,
        grade: f64,
    },
    PreprocessFail {
        feedback: String,
    },
}

impl GradingReport {
    /// Final grade in `[0, 1]`, or `None` when preprocessing failed.
    pub fn grade(&self) -> Option<f64> {
        match self {
            GradingReport::Success { grade, .. } => Some(*grade),
            GradingReport::PreprocessFail { .. } => None,
        }
    }

    /// Per-check outcomes; empty when preprocessing failed.
    pub fn results(&self) -> &[CheckOutcome] {
        match self {
            GradingReport::Success { results, .. } => results,
            GradingReport::PreprocessFail { .. } => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GradingReport::Success { .. })
    }
}

// ---------------------------------------------------------------------------
// CheckSpec: one entry of the author-configured check list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckSpec {
    Grade(GradeDirective),
    Check(CheckInvocation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    Grade,
}

/// A checkpoint converting the pass/fail streak into a share of the grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDirective {
    #[serde(rename = "type")]
    pub kind: DirectiveKind,
    /// Points out of 100.
    #[serde(with = "crate::points_serde")]
    pub points: f64,
    /// Forgive an earlier failure and keep grading later segments.
    #[serde(rename = "continue", default)]
    pub continue_on_fail: bool,
}

impl GradeDirective {
    pub fn new(points: f64, continue_on_fail: bool) -> Self {
        Self {
            kind: DirectiveKind::Grade,
            points,
            continue_on_fail,
        }
    }
}

/// A named check plus the raw arguments the question author bound to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInvocation {
    pub module: String,
    pub method: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, serde_json::Value>,
    /// Author overrides of the metadata feedback templates, by feedback key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feedback: BTreeMap<String, String>,
}

impl CheckInvocation {
    pub fn new(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
            arguments: BTreeMap::new(),
            feedback: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.feedback.insert(key.into(), template.into());
        self
    }

    /// Stringified raw argument, as used for placeholder substitution.
    pub fn argument_text(&self, name: &str) -> Option<String> {
        self.arguments.get(name).map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Parse an author-configured check list from its JSON text.
pub fn parse_check_list(json: &str) -> Result<Vec<CheckSpec>> {
    serde_json::from_str(json).map_err(|e| GraderError::InvalidChecks(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_display_empty_submission() {
        assert_eq!(
            GraderError::EmptySubmission.to_string(),
            "You submitted an empty answer"
        );
    }

    #[test]
    fn error_display_preprocess_is_bare_message() {
        let err = GraderError::preprocess("Label 'q0' is not unique");
        assert_eq!(err.to_string(), "Label 'q0' is not unique");
    }

    #[test]
    fn error_display_argument_type() {
        let err = GraderError::ArgumentType {
            param: "expected".into(),
            expected: "integer".into(),
            value: "\"three\"".into(),
        };
        assert_eq!(
            err.to_string(),
            "Argument 'expected' should be of type integer, got \"three\""
        );
    }

    #[test]
    fn error_display_unknown_method() {
        let err = GraderError::UnknownMethod {
            module: "basic".into(),
            method: "girth".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown check method 'girth' in module 'basic'"
        );
    }

    // --- is_terminal ---

    #[test]
    fn terminal_errors() {
        assert!(GraderError::EmptySubmission.is_terminal());
        assert!(GraderError::preprocess("bad").is_terminal());
    }

    #[test]
    fn per_check_errors_are_not_terminal() {
        assert!(!GraderError::ArgumentSchema { param: "x".into() }.is_terminal());
        assert!(!GraderError::CheckInvocation("boom".into()).is_terminal());
        assert!(!GraderError::UnknownModule {
            module: "m".into()
        }
        .is_terminal());
    }

    #[test]
    fn kind_names() {
        assert_eq!(GraderError::EmptySubmission.kind(), "empty_submission");
        assert_eq!(
            GraderError::UnknownModule { module: "m".into() }.kind(),
            "unknown_check"
        );
        assert_eq!(GraderError::Other("x".into()).kind(), "other");
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: GraderError = json_err.into();
        assert!(matches!(err, GraderError::Json(_)));
    }

    // --- Value ---

    #[test]
    fn value_display() {
        assert_eq!(Value::from(3i64).to_string(), "3");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from("q1").to_string(), "q1");
    }

    #[test]
    fn value_deserializes_untagged() {
        let v: Value = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(v, Value::Integer(7));
        let v: Value = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(v, Value::Float(1.5));
        let v: Value = serde_json::from_value(json!("x")).unwrap();
        assert_eq!(v, Value::String("x".into()));
    }

    // --- CheckResult ---

    #[test]
    fn check_result_fields() {
        let r = CheckResult::fail("count").with("actual", 5usize);
        assert_eq!(r.field("correct").as_deref(), Some("false"));
        assert_eq!(r.field("feedback").as_deref(), Some("count"));
        assert_eq!(r.field("actual").as_deref(), Some("5"));
        assert_eq!(r.field("missing"), None);
    }

    #[test]
    fn check_result_serializes_extra_flat() {
        let r = CheckResult::fail("wrong").with("expected", 3i64);
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"correct": false, "feedback": "wrong", "expected": 3})
        );
    }

    #[test]
    fn check_result_pass_omits_feedback() {
        assert_eq!(
            serde_json::to_value(CheckResult::pass()).unwrap(),
            json!({"correct": true})
        );
    }

    // --- CheckOutcome ---

    #[test]
    fn completed_outcome_serialization() {
        let o = CheckOutcome::completed("basic", "vertex_count", CheckResult::pass());
        assert_eq!(
            serde_json::to_value(&o).unwrap(),
            json!({"module": "basic", "method": "vertex_count", "correct": true})
        );
        assert_eq!(o.correct(), Some(true));
        assert!(o.error().is_none());
    }

    #[test]
    fn errored_outcome_serialization() {
        let o = CheckOutcome::errored("basic", "girth", "Unknown check method");
        assert_eq!(
            serde_json::to_value(&o).unwrap(),
            json!({"module": "basic", "method": "girth", "error": "Unknown check method"})
        );
        assert_eq!(o.correct(), None);
        assert_eq!(o.error(), Some("Unknown check method"));
    }

    // --- GradingReport ---

    #[test]
    fn success_report_serialization() {
        let report = GradingReport::Success {
            results: vec![],
            grade: 1.0,
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"type": "success", "results": [], "grade": 1.0})
        );
    }

    #[test]
    fn preprocess_fail_report_has_no_grade_or_results() {
        let report = GradingReport::PreprocessFail {
            feedback: EMPTY_ANSWER_FEEDBACK.into(),
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["type"], "preprocess_fail");
        assert!(v.get("grade").is_none());
        assert!(v.get("results").is_none());
        assert_eq!(report.grade(), None);
        assert!(report.results().is_empty());
    }

    // --- CheckSpec ---

    #[test]
    fn parse_mixed_check_list() {
        let specs = parse_check_list(
            r#"[
                {"module": "basic", "method": "vertex_count", "arguments": {"expected": "3"}},
                {"type": "grade", "points": 50, "continue": true},
                {"module": "basic", "method": "connected"}
            ]"#,
        )
        .unwrap();
        assert_eq!(specs.len(), 3);
        match &specs[0] {
            CheckSpec::Check(c) => {
                assert_eq!(c.module, "basic");
                assert_eq!(c.argument_text("expected").as_deref(), Some("3"));
            }
            other => panic!("expected check, got {other:?}"),
        }
        assert_eq!(specs[1], CheckSpec::Grade(GradeDirective::new(50.0, true)));
        match &specs[2] {
            CheckSpec::Check(c) => assert!(c.arguments.is_empty()),
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn grade_points_accept_numeric_strings() {
        let specs = parse_check_list(r#"[{"type": "grade", "points": "25"}]"#).unwrap();
        assert_eq!(specs[0], CheckSpec::Grade(GradeDirective::new(25.0, false)));
    }

    #[test]
    fn grade_points_reject_garbage() {
        let err = parse_check_list(r#"[{"type": "grade", "points": "lots"}]"#).unwrap_err();
        assert!(matches!(err, GraderError::InvalidChecks(_)));
    }

    #[test]
    fn grade_points_reject_non_finite() {
        for points in ["inf", "-inf", "NaN", "infinity"] {
            let raw = format!(r#"[{{"type": "grade", "points": "{points}"}}]"#);
            let err = parse_check_list(&raw).unwrap_err();
            assert!(matches!(err, GraderError::InvalidChecks(_)), "{points}");
        }
    }

    #[test]
    fn usize_values_saturate() {
        assert_eq!(Value::from(7usize), Value::Integer(7));
        assert_eq!(Value::from(usize::MAX), Value::Integer(i64::MAX));
    }

    #[test]
    fn check_list_must_be_an_array() {
        assert!(parse_check_list(r#"{"module": "basic"}"#).is_err());
    }

    #[test]
    fn argument_text_stringifies_non_strings() {
        let c = CheckInvocation::new("m", "f").arg("n", 4).arg("s", "x");
        assert_eq!(c.argument_text("n").as_deref(), Some("4"));
        assert_eq!(c.argument_text("s").as_deref(), Some("x"));
        assert_eq!(c.argument_text("none"), None);
    }
}
