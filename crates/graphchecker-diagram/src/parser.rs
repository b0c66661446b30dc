use graphchecker_types::{GraderError, Result};
use tracing::debug;

use crate::model::{Diagram, DIAGRAM_VERSION};

/// Parse the editor's JSON text into a [`Diagram`].
///
/// Every failure is reported as [`GraderError::Preprocess`] with a message
/// that can be shown to the student as-is.
pub fn parse(raw: &str) -> Result<Diagram> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| GraderError::preprocess(format!("The answer is not valid JSON: {e}")))?;
    parse_value(value)
}

/// Parse an already-decoded JSON value into a [`Diagram`].
pub fn parse_value(value: serde_json::Value) -> Result<Diagram> {
    if value.is_null() {
        return Ok(Diagram::default());
    }
    if !value.is_object() {
        return Err(GraderError::preprocess("The answer is not a graph"));
    }

    let diagram: Diagram = serde_json::from_value(value)
        .map_err(|e| GraderError::preprocess(format!("The answer is not a valid graph: {e}")))?;

    if let Some(version) = diagram.version {
        if version != DIAGRAM_VERSION {
            return Err(GraderError::preprocess(format!(
                "Unsupported graph version {version}"
            )));
        }
    }

    check_edge_endpoints(&diagram)?;

    debug!(
        vertices = diagram.vertices.len(),
        edges = diagram.edges.len(),
        "parsed diagram"
    );
    Ok(diagram)
}

fn check_edge_endpoints(diagram: &Diagram) -> Result<()> {
    let count = diagram.vertices.len() as i64;
    for (i, edge) in diagram.edges.iter().enumerate() {
        if edge.to < 0 || edge.to >= count {
            return Err(GraderError::preprocess(format!(
                "Edge {i} points to a vertex that does not exist"
            )));
        }
        if edge.from >= count {
            return Err(GraderError::preprocess(format!(
                "Edge {i} starts at a vertex that does not exist"
            )));
        }
    }
    Ok(())
}

/// Reject diagrams in which two vertices carry the same non-empty label.
pub fn require_unique_labels(diagram: &Diagram) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for vertex in &diagram.vertices {
        let label = vertex.label.trim();
        if label.is_empty() {
            continue;
        }
        if !seen.insert(label) {
            return Err(GraderError::preprocess(format!(
                "Label '{label}' is not unique"
            )));
        }
    }
    Ok(())
}
