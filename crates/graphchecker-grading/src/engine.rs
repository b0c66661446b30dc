//! Grading engine: preprocess once, run the check list in order, fold grades.

use std::path::PathBuf;

use graphchecker_types::{
    parse_check_list, CheckInvocation, CheckOutcome, CheckSpec, GradeDirective, GraderError,
    GradingReport, Result, EMPTY_ANSWER_FEEDBACK,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arguments::convert;
use crate::catalog::{Catalog, CheckLayout};
use crate::check::CheckContext;
use crate::feedback::render;
use crate::question::QuestionType;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Shared,
    #[default]
    PerType,
}

impl std::str::FromStr for LayoutKind {
    type Err = GraderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shared" => Ok(LayoutKind::Shared),
            "per_type" | "per-type" => Ok(LayoutKind::PerType),
            other => Err(GraderError::Other(format!(
                "Unknown layout '{other}' (expected 'shared' or 'per_type')"
            ))),
        }
    }
}

/// Where check metadata lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraderConfig {
    pub checks_dir: PathBuf,
    #[serde(default)]
    pub layout: LayoutKind,
}

impl GraderConfig {
    pub fn new(checks_dir: impl Into<PathBuf>, layout: LayoutKind) -> Self {
        Self {
            checks_dir: checks_dir.into(),
            layout,
        }
    }

    pub fn check_layout(&self) -> CheckLayout {
        match self.layout {
            LayoutKind::Shared => CheckLayout::Shared {
                root: self.checks_dir.clone(),
            },
            LayoutKind::PerType => CheckLayout::PerType {
                root: self.checks_dir.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// GradeAccumulator
// ---------------------------------------------------------------------------

/// Running state of the grade fold.
///
/// Grade directives close a segment: its points are awarded only when every
/// completed check since the last directive passed. Whatever share of the
/// grade no directive claims is awarded at the end if the final segment
/// passed.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeAccumulator {
    correct: bool,
    grade: f64,
    total: f64,
}

impl Default for GradeAccumulator {
    fn default() -> Self {
        Self {
            correct: true,
            grade: 0.0,
            total: 0.0,
        }
    }
}

impl GradeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directive(&mut self, directive: &GradeDirective) {
        let share = directive.points / 100.0;
        self.total += share;
        if self.correct {
            self.grade += share;
        } else if directive.continue_on_fail {
            self.correct = true;
        }
    }

    /// Record a completed check. Errored checks are not recorded.
    pub fn record(&mut self, passed: bool) {
        if !passed {
            self.correct = false;
        }
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }

    /// Final grade, clamped to `[0, 1]`. A non-finite total grades as zero.
    pub fn finish(self) -> f64 {
        let mut grade = self.grade;
        if self.correct {
            grade += 1.0 - self.total;
        }
        if grade.is_nan() {
            return 0.0;
        }
        grade.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Grader
// ---------------------------------------------------------------------------

/// Grades submissions of one question type against its metadata catalog.
#[derive(Debug)]
pub struct Grader<G> {
    question: QuestionType<G>,
    catalog: Catalog,
}

impl<G> Grader<G> {
    pub fn new(question: QuestionType<G>, catalog: Catalog) -> Self {
        Self { question, catalog }
    }

    /// Load the catalog for `question` from the configured metadata directory.
    pub fn from_config(question: QuestionType<G>, config: &GraderConfig) -> Result<Self> {
        let catalog = Catalog::load(&config.check_layout(), question.name())?;
        Ok(Self::new(question, catalog))
    }

    pub fn question(&self) -> &QuestionType<G> {
        &self.question
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Grade one submission.
    ///
    /// Never fails: an empty submission or a preprocessing error yields a
    /// `preprocess_fail` report, and any error inside a single check is
    /// reported on that check's outcome.
    pub fn grade(&self, submission: Option<&str>, specs: &[CheckSpec]) -> GradingReport {
        let ctx = CheckContext::new(self.question.name(), self.catalog.descriptor());
        info!(
            run_id = %ctx.run_id(),
            question_type = self.question.name(),
            checks = specs.len(),
            "grading submission"
        );

        let graph = match self.prepare(submission) {
            Ok(graph) => graph,
            Err(e) => {
                if !e.is_terminal() {
                    warn!(run_id = %ctx.run_id(), kind = e.kind(), "preprocessor failed unexpectedly");
                }
                info!(run_id = %ctx.run_id(), feedback = %e, "preprocessing failed");
                return GradingReport::PreprocessFail {
                    feedback: e.to_string(),
                };
            }
        };

        let mut acc = GradeAccumulator::new();
        let mut results = Vec::new();

        for spec in specs {
            match spec {
                CheckSpec::Grade(directive) => {
                    acc.directive(directive);
                    debug!(
                        run_id = %ctx.run_id(),
                        points = directive.points,
                        continue_on_fail = directive.continue_on_fail,
                        correct = acc.is_correct(),
                        "grade directive"
                    );
                }
                CheckSpec::Check(invocation) => {
                    let outcome = match self.run_check(invocation, &graph, &ctx) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(
                                run_id = %ctx.run_id(),
                                module = %invocation.module,
                                method = %invocation.method,
                                kind = e.kind(),
                                error = %e,
                                "check errored"
                            );
                            CheckOutcome::errored(&invocation.module, &invocation.method, e.to_string())
                        }
                    };
                    if let Some(passed) = outcome.correct() {
                        acc.record(passed);
                    }
                    results.push(outcome);
                }
            }
        }

        let grade = acc.finish();
        info!(run_id = %ctx.run_id(), grade, "grading finished");
        GradingReport::Success { results, grade }
    }

    /// Parse a JSON check list and grade against it.
    pub fn grade_json(&self, submission: Option<&str>, checks_json: &str) -> Result<GradingReport> {
        let specs = parse_check_list(checks_json)?;
        Ok(self.grade(submission, &specs))
    }

    fn prepare(&self, submission: Option<&str>) -> Result<G> {
        let raw = submission
            .filter(|s| !s.is_empty())
            .ok_or(GraderError::EmptySubmission)?;
        self.question.preprocess(raw)
    }

    fn run_check(
        &self,
        invocation: &CheckInvocation,
        graph: &G,
        ctx: &CheckContext<'_>,
    ) -> Result<CheckOutcome> {
        let (module, method) = (invocation.module.as_str(), invocation.method.as_str());
        let metadata = self.catalog.method(module, method)?;
        let check = self.question.checks().resolve(module, method)?;
        let args = convert(
            &invocation.arguments,
            &metadata.params,
            self.question.preprocessor(),
        )?;

        debug!(run_id = %ctx.run_id(), module, method, args = args.len(), "running check");
        let mut result = check.run(graph, &args, ctx)?;
        result.feedback = render(invocation, metadata, &result);
        debug!(run_id = %ctx.run_id(), module, method, correct = result.correct, "check finished");

        Ok(CheckOutcome::completed(module, method, result))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use graphchecker_types::{CheckResult, OutcomeStatus};
    use serde_json::json;

    use crate::arguments::Arguments;
    use crate::catalog::{MethodMetadata, ModuleMetadata, ParamSpec, ParamType};

    /// Test domain: the submission is a number.
    fn parse_number(raw: &str) -> Result<i64> {
        raw.trim()
            .parse()
            .map_err(|_| GraderError::preprocess(format!("'{}' is not a number", raw.trim())))
    }

    fn is_positive(n: &i64, _a: &Arguments<i64>, _c: &CheckContext<'_>) -> Result<CheckResult> {
        if *n > 0 {
            Ok(CheckResult::pass())
        } else {
            Ok(CheckResult::fail("not_positive").with("value", *n))
        }
    }

    fn equals(n: &i64, a: &Arguments<i64>, _c: &CheckContext<'_>) -> Result<CheckResult> {
        let expected = a.integer("expected")?;
        if *n == expected {
            Ok(CheckResult::pass())
        } else {
            Ok(CheckResult::fail("wrong").with("actual", *n))
        }
    }

    fn always_fail(_n: &i64, _a: &Arguments<i64>, _c: &CheckContext<'_>) -> Result<CheckResult> {
        Ok(CheckResult::fail("Nope"))
    }

    fn explode(_n: &i64, _a: &Arguments<i64>, _c: &CheckContext<'_>) -> Result<CheckResult> {
        Err(GraderError::CheckInvocation("division by zero".into()))
    }

    fn catalog() -> Catalog {
        let mut checks = BTreeMap::new();
        checks.insert(
            "is_positive".to_string(),
            MethodMetadata {
                feedback: Some(BTreeMap::from([(
                    "not_positive".to_string(),
                    "[[value]] is not positive".to_string(),
                )])),
                ..Default::default()
            },
        );
        checks.insert(
            "equals".to_string(),
            MethodMetadata {
                params: vec![ParamSpec::new("expected", ParamType::Integer)],
                feedback: Some(BTreeMap::from([(
                    "wrong".to_string(),
                    "Expected [[expected]], got [[actual]]".to_string(),
                )])),
                ..Default::default()
            },
        );
        checks.insert("always_fail".to_string(), MethodMetadata::default());
        checks.insert("explode".to_string(), MethodMetadata::default());
        checks.insert("unimplemented".to_string(), MethodMetadata::default());

        let mut modules = BTreeMap::new();
        modules.insert(
            "num".to_string(),
            ModuleMetadata {
                checks,
                ..Default::default()
            },
        );
        Catalog::from_modules("number", modules)
    }

    fn grader() -> Grader<i64> {
        let question = QuestionType::<i64>::new("number", parse_number)
            .with_check("num", "is_positive", is_positive)
            .with_check("num", "equals", equals)
            .with_check("num", "always_fail", always_fail)
            .with_check("num", "explode", explode);
        Grader::new(question, catalog())
    }

    fn check(method: &str) -> CheckSpec {
        CheckSpec::Check(CheckInvocation::new("num", method))
    }

    fn grade(points: f64, cont: bool) -> CheckSpec {
        CheckSpec::Grade(GradeDirective::new(points, cont))
    }

    fn assert_grade(report: &GradingReport, expected: f64) {
        let got = report.grade().expect("success report");
        assert!((got - expected).abs() < 1e-9, "grade {got}, expected {expected}");
    }

    // --- GradeAccumulator ---

    #[test]
    fn accumulator_without_directives() {
        let mut acc = GradeAccumulator::new();
        acc.record(true);
        assert_eq!(acc.finish(), 1.0);

        let mut acc = GradeAccumulator::new();
        acc.record(false);
        assert_eq!(acc.finish(), 0.0);
    }

    #[test]
    fn accumulator_clamps_overfull_directives() {
        let mut acc = GradeAccumulator::new();
        acc.directive(&GradeDirective::new(80.0, false));
        acc.directive(&GradeDirective::new(80.0, false));
        assert_eq!(acc.finish(), 1.0);
    }

    #[test]
    fn accumulator_never_yields_nan() {
        let mut acc = GradeAccumulator::new();
        acc.directive(&GradeDirective::new(f64::INFINITY, false));
        acc.directive(&GradeDirective::new(f64::NEG_INFINITY, false));
        assert_eq!(acc.finish(), 0.0);
    }

    // --- Grader ---

    #[test]
    fn all_pass_without_directives_is_full_grade() {
        let report = grader().grade(Some("5"), &[check("is_positive"), check("is_positive")]);
        assert_grade(&report, 1.0);
        assert_eq!(report.results().len(), 2);
    }

    #[test]
    fn empty_check_list_is_full_grade() {
        assert_grade(&grader().grade(Some("5"), &[]), 1.0);
    }

    #[test]
    fn failure_before_directive_forfeits_segment() {
        let report = grader().grade(Some("5"), &[check("always_fail"), grade(40.0, false)]);
        assert_grade(&report, 0.0);
    }

    #[test]
    fn continue_resets_streak_after_forfeit() {
        let report = grader().grade(
            Some("5"),
            &[check("always_fail"), grade(40.0, true), check("is_positive")],
        );
        assert_grade(&report, 0.6);
    }

    #[test]
    fn two_half_segments() {
        let report = grader().grade(
            Some("5"),
            &[
                check("is_positive"),
                grade(50.0, false),
                check("always_fail"),
                grade(50.0, false),
            ],
        );
        assert_grade(&report, 0.5);
    }

    #[test]
    fn failure_without_continue_blocks_later_segments() {
        let report = grader().grade(
            Some("5"),
            &[
                check("always_fail"),
                grade(50.0, false),
                check("is_positive"),
                grade(50.0, false),
            ],
        );
        assert_grade(&report, 0.0);
    }

    #[test]
    fn errored_check_does_not_touch_streak() {
        let report = grader().grade(Some("5"), &[check("explode"), check("is_positive")]);
        assert_grade(&report, 1.0);
        let outcome = &report.results()[0];
        assert_eq!(outcome.error(), Some("division by zero"));
        assert_eq!(outcome.correct(), None);
    }

    #[test]
    fn directive_after_errored_check_awards_points() {
        let report = grader().grade(
            Some("5"),
            &[check("explode"), grade(50.0, false), check("always_fail")],
        );
        assert_grade(&report, 0.5);
        assert!(report.results()[0].error().is_some());
    }

    #[test]
    fn errored_check_does_not_reset_failure() {
        let report = grader().grade(Some("5"), &[check("always_fail"), check("explode")]);
        assert_grade(&report, 0.0);
    }

    #[test]
    fn unknown_checks_are_isolated() {
        let specs = [
            CheckSpec::Check(CheckInvocation::new("graph", "girth")),
            check("girth"),
            check("unimplemented"),
            check("is_positive"),
        ];
        let report = grader().grade(Some("5"), &specs);
        let errors: Vec<_> = report.results().iter().map(|o| o.error()).collect();
        assert_eq!(
            errors,
            vec![
                Some("Unknown check module 'graph'"),
                Some("Unknown check method 'girth' in module 'num'"),
                Some("Unknown check method 'unimplemented' in module 'num'"),
                None,
            ]
        );
        assert_grade(&report, 1.0);
    }

    #[test]
    fn argument_errors_are_isolated() {
        let specs = [
            CheckSpec::Check(CheckInvocation::new("num", "equals").arg("expected", "five")),
            CheckSpec::Check(CheckInvocation::new("num", "equals").arg("colour", "red")),
        ];
        let report = grader().grade(Some("5"), &specs);
        assert!(report.results().iter().all(|o| o.error().is_some()));
        assert_grade(&report, 1.0);
    }

    #[test]
    fn feedback_is_rendered_from_templates() {
        let specs = [
            CheckSpec::Check(CheckInvocation::new("num", "equals").arg("expected", "3")),
            check("always_fail"),
        ];
        let report = grader().grade(Some("5"), &specs);
        assert_eq!(report.results()[0].feedback(), Some("Expected 3, got 5"));
        assert_eq!(report.results()[1].feedback(), Some("Nope"));
    }

    #[test]
    fn author_override_wins() {
        let specs = [CheckSpec::Check(
            CheckInvocation::new("num", "is_positive").template("not_positive", "Too small: [[value]]"),
        )];
        let report = grader().grade(Some("-2"), &specs);
        assert_eq!(report.results()[0].feedback(), Some("Too small: -2"));
        assert_grade(&report, 0.0);
    }

    #[test]
    fn passing_check_has_no_feedback() {
        let report = grader().grade(Some("5"), &[check("is_positive")]);
        match &report.results()[0].status {
            OutcomeStatus::Completed(r) => assert!(r.feedback.is_none()),
            other => panic!("expected completed outcome, got {other:?}"),
        }
    }

    #[test]
    fn empty_submission_is_preprocess_fail() {
        for submission in [None, Some("")] {
            let report = grader().grade(submission, &[check("is_positive")]);
            assert_eq!(
                report,
                GradingReport::PreprocessFail {
                    feedback: EMPTY_ANSWER_FEEDBACK.into()
                }
            );
            let v = serde_json::to_value(&report).unwrap();
            assert!(v.get("grade").is_none());
            assert!(v.get("results").is_none());
        }
    }

    #[test]
    fn blank_submission_reaches_the_preprocessor() {
        let report = grader().grade(Some("  \n"), &[check("is_positive")]);
        assert_eq!(
            report,
            GradingReport::PreprocessFail {
                feedback: "'' is not a number".into()
            }
        );
    }

    #[test]
    fn preprocess_error_is_reported_verbatim() {
        let report = grader().grade(Some("five"), &[check("is_positive")]);
        assert_eq!(
            report,
            GradingReport::PreprocessFail {
                feedback: "'five' is not a number".into()
            }
        );
    }

    #[test]
    fn grade_json_parses_check_list() {
        let report = grader()
            .grade_json(
                Some("5"),
                &json!([
                    {"module": "num", "method": "equals", "arguments": {"expected": "5"}},
                    {"type": "grade", "points": "30"},
                    {"module": "num", "method": "always_fail"}
                ])
                .to_string(),
            )
            .unwrap();
        assert_grade(&report, 0.3);
    }

    #[test]
    fn grade_json_rejects_malformed_list() {
        let err = grader().grade_json(Some("5"), "{not json").unwrap_err();
        assert!(matches!(err, GraderError::InvalidChecks(_)));
    }

    #[test]
    fn report_serialization_shape() {
        let report = grader().grade(Some("5"), &[check("is_positive"), check("explode")]);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "type": "success",
                "grade": 1.0,
                "results": [
                    {"module": "num", "method": "is_positive", "correct": true},
                    {"module": "num", "method": "explode", "error": "division by zero"}
                ]
            })
        );
    }

    // --- Config ---

    #[test]
    fn config_deserializes_with_default_layout() {
        let cfg: GraderConfig = serde_json::from_value(json!({"checks_dir": "/srv/checks"})).unwrap();
        assert_eq!(cfg.layout, LayoutKind::PerType);
        assert_eq!(
            cfg.check_layout().type_dir("directed"),
            PathBuf::from("/srv/checks/directed")
        );
    }

    #[test]
    fn shared_layout_ignores_type() {
        let cfg = GraderConfig::new("/srv/checks", LayoutKind::Shared);
        assert_eq!(cfg.check_layout().type_dir("directed"), PathBuf::from("/srv/checks"));
    }

    #[test]
    fn layout_kind_from_str() {
        assert_eq!("shared".parse::<LayoutKind>().unwrap(), LayoutKind::Shared);
        assert_eq!("per-type".parse::<LayoutKind>().unwrap(), LayoutKind::PerType);
        assert!("flat".parse::<LayoutKind>().is_err());
    }
}
