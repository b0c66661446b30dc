use std::collections::{BTreeMap, HashMap, VecDeque};

use graphchecker_diagram::Diagram;
use graphchecker_types::{GraderError, Result};

/// Domain graph built from a submitted diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub directed: bool,
    vertices: Vec<GraphVertex>,
    edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphVertex {
    pub label: String,
    pub position: (f64, f64),
    pub highlighted: bool,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    pub label: String,
    pub highlighted: bool,
    pub color: Option<String>,
}

fn vertex_index(index: i64, count: usize, edge: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < count)
        .ok_or_else(|| {
            GraderError::preprocess(format!(
                "Edge {edge} points to a vertex that does not exist"
            ))
        })
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Build a graph from a parsed diagram. Initial-state arrows are dropped.
    pub fn from_diagram(diagram: &Diagram, directed: bool) -> Result<Self> {
        let mut graph = Self::new(directed);
        for v in &diagram.vertices {
            graph.vertices.push(GraphVertex {
                label: v.label.trim().to_string(),
                position: (v.position[0], v.position[1]),
                highlighted: v.highlighted,
                color: v.color.clone(),
            });
        }
        let count = graph.vertices.len();
        for (i, e) in diagram.edges.iter().enumerate() {
            if e.is_initial_marker() {
                continue;
            }
            graph.edges.push(GraphEdge {
                from: vertex_index(e.from, count, i)?,
                to: vertex_index(e.to, count, i)?,
                label: e.label.trim().to_string(),
                highlighted: e.highlighted,
                color: e.color.clone(),
            });
        }
        Ok(graph)
    }

    pub fn add_vertex(&mut self, label: impl Into<String>) -> usize {
        self.vertices.push(GraphVertex {
            label: label.into(),
            position: (0.0, 0.0),
            highlighted: false,
            color: None,
        });
        self.vertices.len() - 1
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.edges.push(GraphEdge {
            from,
            to,
            label: String::new(),
            highlighted: false,
            color: None,
        });
    }

    pub fn vertices(&self) -> &[GraphVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|v| v.label.as_str())
    }

    pub fn out_degree(&self, v: usize) -> usize {
        self.edges.iter().filter(|e| e.from == v).count()
    }

    pub fn in_degree(&self, v: usize) -> usize {
        self.edges.iter().filter(|e| e.to == v).count()
    }

    /// Number of edge endpoints at `v`; a self-loop counts twice.
    pub fn degree(&self, v: usize) -> usize {
        self.out_degree(v) + self.in_degree(v)
    }

    /// Degrees of all vertices, in vertex order.
    pub fn degrees(&self) -> Vec<usize> {
        (0..self.vertex_count()).map(|v| self.degree(v)).collect()
    }

    /// Degree → number of vertices with that degree.
    pub fn degree_histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for d in self.degrees() {
            *histogram.entry(d).or_insert(0) += 1;
        }
        histogram
    }

    fn neighbours(&self) -> HashMap<usize, Vec<usize>> {
        let mut adj: HashMap<usize, Vec<usize>> = HashMap::new();
        for e in &self.edges {
            adj.entry(e.from).or_default().push(e.to);
            adj.entry(e.to).or_default().push(e.from);
        }
        adj
    }

    /// Connectivity ignoring edge direction. The empty graph is connected.
    pub fn is_connected(&self) -> bool {
        if self.vertices.is_empty() {
            return true;
        }
        let adj = self.neighbours();
        let mut seen = vec![false; self.vertices.len()];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        while let Some(v) = queue.pop_front() {
            for &w in adj.get(&v).into_iter().flatten() {
                if !seen[w] {
                    seen[w] = true;
                    queue.push_back(w);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }
}
