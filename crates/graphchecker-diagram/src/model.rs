use serde::{Deserialize, Serialize};

/// Version tag written by the diagram editor.
pub const DIAGRAM_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: [f64; 2],
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "final", default)]
    pub accepting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source vertex index; `-1` (or absent) marks an initial-state arrow.
    #[serde(default = "initial_marker")]
    pub from: i64,
    pub to: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Editor-only curve geometry, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bend: Option<serde_json::Value>,
}

fn initial_marker() -> i64 {
    -1
}

impl Edge {
    /// True for the start arrow pointing at an initial state.
    pub fn is_initial_marker(&self) -> bool {
        self.from < 0
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
