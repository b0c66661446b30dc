//! JSON diagram model and parser for GraphChecker submissions.
//!
//! The diagram editor serialises a drawing as
//! `{"_version": 1, "vertices": [...], "edges": [...]}` where edges refer to
//! vertices by index. Produces a typed model: [`Diagram`], [`Vertex`], [`Edge`].
//!
//! # Example
//! ```
//! let raw = r#"{"_version": 1,
//!     "vertices": [{"label": "a", "position": [0, 0]}, {"label": "b", "position": [10, 0]}],
//!     "edges": [{"from": 0, "to": 1, "label": ""}]}"#;
//! let diagram = graphchecker_diagram::parse(raw).unwrap();
//! assert_eq!(diagram.vertices.len(), 2);
//! assert_eq!(diagram.edges[0].to, 1);
//! ```

pub mod model;
mod parser;

pub use model::*;
pub use parser::{parse, parse_value, require_unique_labels};
