//! Size and connectivity checks.

use graphchecker_types::{CheckResult, Result};

use crate::arguments::Arguments;
use crate::check::CheckContext;
use crate::graph::Graph;

fn count_check(actual: usize, expected: i64) -> CheckResult {
    if i64::try_from(actual).is_ok_and(|a| a == expected) {
        CheckResult::pass()
    } else {
        CheckResult::fail("wrong_count")
            .with("actual", actual)
            .with("expected", expected)
    }
}

/// Feedback key `wrong_count` with fields `actual` and `expected`.
pub fn vertex_count(
    graph: &Graph,
    args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    Ok(count_check(graph.vertex_count(), args.integer("expected")?))
}

/// Feedback key `wrong_count` with fields `actual` and `expected`.
pub fn edge_count(
    graph: &Graph,
    args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    Ok(count_check(graph.edge_count(), args.integer("expected")?))
}

pub fn connected(
    graph: &Graph,
    _args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    if graph.is_connected() {
        Ok(CheckResult::pass())
    } else {
        Ok(CheckResult::fail("Graph is not connected"))
    }
}

/// Compare vertex and edge counts against the author's sample graph.
pub fn same_size(
    graph: &Graph,
    args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    let sample = args.graph("sample")?;
    if graph.vertex_count() == sample.vertex_count() && graph.edge_count() == sample.edge_count() {
        return Ok(CheckResult::pass());
    }
    Ok(CheckResult::fail(format!(
        "The graph has {} vertices and {} edges, expected {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count(),
        sample.vertex_count(),
        sample.edge_count()
    ))
    .with("vertices", graph.vertex_count())
    .with("edges", graph.edge_count()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Argument;
    use crate::catalog::TypeDescriptor;
    use graphchecker_types::{GraderError, Value};

    fn triangle() -> Graph {
        let mut g = Graph::new(false);
        for l in ["a", "b", "c"] {
            g.add_vertex(l);
        }
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 0);
        g
    }

    fn expected(n: i64) -> Arguments<Graph> {
        let mut args = Arguments::new();
        args.insert("expected", Argument::Integer(n));
        args
    }

    #[test]
    fn vertex_count_pass_and_fail() {
        let d = TypeDescriptor::default();
        let ctx = CheckContext::new("undirected", &d);
        assert!(vertex_count(&triangle(), &expected(3), &ctx).unwrap().correct);

        let r = vertex_count(&triangle(), &expected(4), &ctx).unwrap();
        assert!(!r.correct);
        assert_eq!(r.feedback.as_deref(), Some("wrong_count"));
        assert_eq!(r.extra.get("actual"), Some(&Value::Integer(3)));
        assert_eq!(r.extra.get("expected"), Some(&Value::Integer(4)));
    }

    #[test]
    fn negative_expected_count_never_matches() {
        let d = TypeDescriptor::default();
        let ctx = CheckContext::new("undirected", &d);
        assert!(!edge_count(&Graph::new(false), &expected(-1), &ctx).unwrap().correct);
    }

    #[test]
    fn edge_count_requires_argument() {
        let d = TypeDescriptor::default();
        let ctx = CheckContext::new("undirected", &d);
        let err = edge_count(&triangle(), &Arguments::new(), &ctx).unwrap_err();
        assert!(matches!(err, GraderError::MissingArgument { .. }));
    }

    #[test]
    fn connected_reports_verbatim_feedback() {
        let d = TypeDescriptor::default();
        let ctx = CheckContext::new("undirected", &d);
        assert!(connected(&triangle(), &Arguments::new(), &ctx).unwrap().correct);

        let mut g = triangle();
        g.add_vertex("d");
        let r = connected(&g, &Arguments::new(), &ctx).unwrap();
        assert_eq!(r.feedback.as_deref(), Some("Graph is not connected"));
    }

    #[test]
    fn same_size_compares_with_sample() {
        let d = TypeDescriptor::default();
        let ctx = CheckContext::new("undirected", &d);
        let mut args = Arguments::new();
        args.insert("sample", Argument::Graph(triangle()));

        assert!(same_size(&triangle(), &args, &ctx).unwrap().correct);

        let mut g = triangle();
        g.add_edge(0, 0);
        let r = same_size(&g, &args, &ctx).unwrap();
        assert!(!r.correct);
        assert_eq!(
            r.feedback.as_deref(),
            Some("The graph has 3 vertices and 4 edges, expected 3 vertices and 3 edges")
        );
    }
}
