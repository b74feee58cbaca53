//! Planar adjacency graph built from a triangulation.
//!
//! Vertices are point indices; edges are the triangle sides, weighted by
//! the floor of their Euclidean length. Storage is an undirected
//! `petgraph` graph, so each vertex pair carries exactly one weight and a
//! cost change is seen from both endpoints at once.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::triangulate::Triangle;
use crate::types::{GenerationError, Path, Point};

/// An incident edge as seen from one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The other endpoint.
    pub target: usize,
    /// Current traversal cost.
    pub cost: u64,
}

/// An undirected edge listed once, with `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeEntry {
    /// Smaller endpoint index.
    pub from: usize,
    /// Larger endpoint index.
    pub to: usize,
    /// Current traversal cost.
    pub cost: u64,
}

/// Weighted undirected graph over point indices.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: UnGraph<(), u64>,
}

impl Graph {
    /// A graph with `vertex_count` vertices and no edges.
    #[must_use]
    pub fn with_vertices(vertex_count: usize) -> Self {
        let mut inner = UnGraph::with_capacity(vertex_count, vertex_count * 3);
        for _ in 0..vertex_count {
            inner.add_node(());
        }
        Self { inner }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    fn node(&self, index: usize) -> Result<NodeIndex, GenerationError> {
        if index < self.vertex_count() {
            Ok(NodeIndex::new(index))
        } else {
            Err(GenerationError::VertexOutOfRange {
                index,
                vertex_count: self.vertex_count(),
            })
        }
    }

    /// Connect `a` and `b` with the given cost.
    ///
    /// Zero costs and self-loops are ignored, as is a pair that is already
    /// connected. Returns `true` if an edge was added.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::VertexOutOfRange`] if either index is not
    /// a vertex.
    pub fn add_edge(&mut self, a: usize, b: usize, cost: u64) -> Result<bool, GenerationError> {
        let (na, nb) = (self.node(a)?, self.node(b)?);
        if cost == 0 || a == b || self.inner.find_edge(na, nb).is_some() {
            return Ok(false);
        }
        self.inner.add_edge(na, nb, cost);
        Ok(true)
    }

    /// Edges incident to `vertex`, each seen from `vertex`.
    ///
    /// An out-of-range vertex has no edges.
    pub fn edges(&self, vertex: usize) -> impl Iterator<Item = Edge> + '_ {
        let node = self.node(vertex).ok();
        node.into_iter().flat_map(move |n| {
            self.inner.edges(n).map(|e| Edge {
                target: e.target().index(),
                cost: *e.weight(),
            })
        })
    }

    /// Current cost of the edge between `a` and `b`, if connected.
    #[must_use]
    pub fn cost(&self, a: usize, b: usize) -> Option<u64> {
        let (na, nb) = (self.node(a).ok()?, self.node(b).ok()?);
        self.inner
            .find_edge(na, nb)
            .and_then(|e| self.inner.edge_weight(e))
            .copied()
    }

    /// Raise the cost of the edge between `a` and `b` by `amount`.
    ///
    /// Saturates at `u64::MAX`. Returns the new cost.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::VertexOutOfRange`] for an unknown vertex
    /// and [`GenerationError::MissingEdge`] if `a` and `b` are not
    /// connected.
    pub fn increase_cost(&mut self, a: usize, b: usize, amount: u64) -> Result<u64, GenerationError> {
        let (na, nb) = (self.node(a)?, self.node(b)?);
        let weight = self
            .inner
            .find_edge(na, nb)
            .and_then(|e| self.inner.edge_weight_mut(e))
            .ok_or(GenerationError::MissingEdge { from: a, to: b })?;
        *weight = weight.saturating_add(amount);
        Ok(*weight)
    }

    /// Summed cost of every edge along `path`.
    ///
    /// `Some(0)` for an empty or single-index path, `None` if two
    /// consecutive indices are not connected.
    #[must_use]
    pub fn path_cost(&self, path: &Path) -> Option<u64> {
        path.edges()
            .try_fold(0_u64, |acc, (a, b)| Some(acc.saturating_add(self.cost(a, b)?)))
    }

    /// Every edge once, sorted by endpoints.
    #[must_use]
    pub fn edge_list(&self) -> Vec<EdgeEntry> {
        let mut list: Vec<EdgeEntry> = self
            .inner
            .edge_references()
            .map(|e| {
                let (s, t) = (e.source().index(), e.target().index());
                EdgeEntry {
                    from: s.min(t),
                    to: s.max(t),
                    cost: *e.weight(),
                }
            })
            .collect();
        list.sort_unstable();
        list
    }
}

/// Floor of the Euclidean distance between two points as an edge cost.
///
/// Non-finite distances map to zero, which [`Graph::add_edge`] ignores.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn edge_cost(a: Point, b: Point) -> u64 {
    let d = a.distance(b);
    if d.is_finite() { d.floor() as u64 } else { 0 }
}

/// Build the adjacency graph for `points` from `triangles`.
///
/// Every triangle side becomes an undirected edge weighted by
/// [`edge_cost`]. Sides shorter than one unit are skipped, and a side
/// shared by two triangles is stored once.
///
/// # Errors
///
/// Returns [`GenerationError::VertexOutOfRange`] if a triangle refers to a
/// point index outside `points`.
pub fn build_graph(triangles: &[Triangle], points: &[Point]) -> Result<Graph, GenerationError> {
    let mut graph = Graph::with_vertices(points.len());
    for triangle in triangles {
        for (a, b) in triangle.sides() {
            let (pa, pb) = (graph_point(points, a)?, graph_point(points, b)?);
            graph.add_edge(a, b, edge_cost(pa, pb))?;
        }
    }
    log::debug!(
        "built graph: {} vertices, {} edges from {} triangles",
        graph.vertex_count(),
        graph.edge_count(),
        triangles.len()
    );
    Ok(graph)
}

fn graph_point(points: &[Point], index: usize) -> Result<Point, GenerationError> {
    points
        .get(index)
        .copied()
        .ok_or(GenerationError::VertexOutOfRange {
            index,
            vertex_count: points.len(),
        })
}
