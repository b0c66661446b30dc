//! Degree checks. Degrees count edge endpoints, so a self-loop adds two.

use graphchecker_types::{CheckResult, GraderError, Result};

use crate::arguments::Arguments;
use crate::check::CheckContext;
use crate::graph::Graph;

fn describe_vertex(label: &str) -> String {
    if label.is_empty() {
        "Some vertex".to_string()
    } else {
        format!("Vertex {label}")
    }
}

/// Fails on the first vertex whose degree exceeds `max_degree`.
pub fn vertex_degree_at_most(
    graph: &Graph,
    args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    let max_degree = args.integer("max_degree")?;
    for (v, vertex) in graph.vertices().iter().enumerate() {
        let degree = graph.degree(v);
        if i64::try_from(degree).map_or(true, |d| d > max_degree) {
            return Ok(CheckResult::fail("too_high")
                .with("vertex", describe_vertex(&vertex.label))
                .with("degree", degree));
        }
    }
    Ok(CheckResult::pass())
}

/// Exactly `number_of_verts` vertices must have degree `degree`.
pub fn number_vertices_of_degree(
    graph: &Graph,
    args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    let wanted = args.integer("number_of_verts")?;
    let degree = args.integer("degree")?;
    let found = graph
        .degrees()
        .into_iter()
        .filter(|d| i64::try_from(*d).is_ok_and(|d| d == degree))
        .count();
    if i64::try_from(found).is_ok_and(|f| f == wanted) {
        Ok(CheckResult::pass())
    } else {
        Ok(CheckResult::fail("wrong_number").with("found", found))
    }
}

fn parse_sequence(items: &[String]) -> Result<Vec<usize>> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>().map_err(|_| GraderError::ArgumentType {
                param: "degree_sequence".into(),
                expected: "list of non-negative integers".into(),
                value: format!("'{s}'"),
            })
        })
        .collect()
}

/// The multiset of vertex degrees must equal the given sequence.
pub fn vertex_degree_sequence(
    graph: &Graph,
    args: &Arguments<Graph>,
    _ctx: &CheckContext<'_>,
) -> Result<CheckResult> {
    let mut expected = parse_sequence(args.string_list("degree_sequence")?)?;
    let mut actual = graph.degrees();

    if actual.len() != expected.len() {
        return Ok(CheckResult::fail(format!(
            "Number of vertices {}, does not match the expected number of vertices {}",
            actual.len(),
            expected.len()
        )));
    }

    expected.sort_unstable();
    actual.sort_unstable();
    for (want, got) in expected.iter().zip(&actual) {
        if want != got {
            return Ok(CheckResult::fail(format!(
                "Degree sequence does not match expected degree sequence. \
                 Expected a vertex with degree {want} but found one with degree {got}."
            )));
        }
    }
    Ok(CheckResult::pass())
}
