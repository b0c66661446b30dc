//! Built-in question types over diagram graphs.
//!
//! `undirected` and `directed` share one preprocessor and one set of checks,
//! differing only in how edges are interpreted.

pub mod basic;
pub mod degrees;
pub mod labels;

use graphchecker_types::Result;
use tracing::debug;

use crate::check::CheckRegistry;
use crate::graph::Graph;
use crate::question::QuestionType;

/// Names of the built-in question types.
pub const BUILTIN_TYPES: &[&str] = &["undirected", "directed"];

/// Parse a submitted diagram into a [`Graph`].
pub fn preprocess_diagram(raw: &str, directed: bool) -> Result<Graph> {
    let diagram = graphchecker_diagram::parse(raw)?;
    graphchecker_diagram::require_unique_labels(&diagram)?;
    let graph = Graph::from_diagram(&diagram, directed)?;
    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        directed,
        "preprocessed submission"
    );
    Ok(graph)
}

/// All checks shared by the built-in graph types.
pub fn default_registry() -> CheckRegistry<Graph> {
    let mut registry: CheckRegistry<Graph> = CheckRegistry::new();
    registry.register("basic", "vertex_count", basic::vertex_count);
    registry.register("basic", "edge_count", basic::edge_count);
    registry.register("basic", "connected", basic::connected);
    registry.register("basic", "same_size", basic::same_size);
    registry.register("degrees", "vertex_degree_at_most", degrees::vertex_degree_at_most);
    registry.register(
        "degrees",
        "number_vertices_of_degree",
        degrees::number_vertices_of_degree,
    );
    registry.register("degrees", "vertex_degree_sequence", degrees::vertex_degree_sequence);
    registry.register("labels", "vertex_labels", labels::vertex_labels);
    registry
}

pub fn undirected() -> QuestionType<Graph> {
    QuestionType::<Graph>::new("undirected", |raw: &str| preprocess_diagram(raw, false))
        .with_registry(default_registry())
}

pub fn directed() -> QuestionType<Graph> {
    QuestionType::<Graph>::new("directed", |raw: &str| preprocess_diagram(raw, true))
        .with_registry(default_registry())
}

/// Look up a built-in question type by name.
pub fn builtin(name: &str) -> Option<QuestionType<Graph>> {
    match name {
        "undirected" => Some(undirected()),
        "directed" => Some(directed()),
        _ => None,
    }
}
