//! Vertex label checks.

use std::collections::BTreeSet;

use graphchecker_types::{CheckResult, Result};

use crate::arguments::Arguments;
use crate::check::CheckContext;
use crate::graph::Graph;

/// The set of non-blank vertex labels must equal `expected`.
///
/// Reports the first missing label under feedback key `missing`, otherwise
/// the first unexpected label under key `unexpected`; both carry `label`.
pub fn vertex_labels(
    graph: &Graph,
    args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    let expected: BTreeSet<&str> = args
        .string_list("expected")?
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let actual: BTreeSet<&str> = graph.labels().filter(|l| !l.is_empty()).collect();

    if let Some(label) = expected.difference(&actual).next() {
        return Ok(CheckResult::fail("missing").with("label", *label));
    }
    if let Some(label) = actual.difference(&expected).next() {
        return Ok(CheckResult::fail("unexpected").with("label", *label));
    }
    Ok(CheckResult::pass())
}
