//! Single-source shortest paths (Dijkstra) with path reconstruction.
//!
//! Distances are integers so equal-cost routes compare exactly. The caller
//! owns the distance buffer and can reuse it across queries; on return it
//! holds the best known distance from the source to every vertex, with
//! [`UNREACHABLE`] for vertices the search never reached.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::Graph;
use crate::types::{GenerationError, Path};

/// Distance of a vertex that has not been reached.
///
/// Sums saturate, so no accumulated path cost can reach this value
/// without meaning "no route".
pub const UNREACHABLE: u64 = u64::MAX;

/// A fresh distance buffer for `graph`, every entry [`UNREACHABLE`].
#[must_use]
pub fn distance_buffer(graph: &Graph) -> Vec<u64> {
    vec![UNREACHABLE; graph.vertex_count()]
}

/// Compute the minimum-cost path from `source` to `target`.
///
/// `distances` must have one entry per vertex. It is reset to
/// [`UNREACHABLE`] before the search and afterwards holds the distances
/// from `source`. Returns an empty [`Path`] when `target` cannot be
/// reached.
///
/// # Errors
///
/// Returns [`GenerationError::DistanceBufferMismatch`] if `distances` does
/// not match the vertex count and [`GenerationError::VertexOutOfRange`] if
/// `source` or `target` is not a vertex.
pub fn shortest_path(
    graph: &Graph,
    distances: &mut [u64],
    source: usize,
    target: usize,
) -> Result<Path, GenerationError> {
    let n = graph.vertex_count();
    if distances.len() != n {
        return Err(GenerationError::DistanceBufferMismatch {
            expected: n,
            actual: distances.len(),
        });
    }
    for index in [source, target] {
        if index >= n {
            return Err(GenerationError::VertexOutOfRange {
                index,
                vertex_count: n,
            });
        }
    }

    distances.fill(UNREACHABLE);
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    let mut queue = BinaryHeap::new();

    distances[source] = 0;
    queue.push(Reverse((0_u64, source)));

    while let Some(Reverse((distance, from))) = queue.pop() {
        // A better distance was recorded after this entry was queued.
        if distances[from] < distance {
            continue;
        }
        for edge in graph.edges(from) {
            let d = distance.saturating_add(edge.cost);
            if d < distances[edge.target] {
                distances[edge.target] = d;
                predecessor[edge.target] = Some(from);
                queue.push(Reverse((d, edge.target)));
            }
        }
    }

    if distances[target] == UNREACHABLE {
        log::trace!("vertex {target} unreachable from {source}");
        return Ok(Path::empty());
    }

    let mut indices = vec![target];
    let mut current = target;
    while let Some(prev) = predecessor[current] {
        indices.push(prev);
        current = prev;
    }
    indices.reverse();

    log::trace!(
        "shortest path {source} -> {target}: cost {}, {} vertices",
        distances[target],
        indices.len()
    );
    Ok(Path::new(indices))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Hand-weighted graph:
    ///
    /// ```text
    ///   0 --4-- 1 --1-- 3
    ///   |       |       |
    ///   1       2       6
    ///   |       |       |
    ///   2 --5-- 4 --1-- 5
    /// ```
    fn grid() -> Graph {
        let mut g = Graph::with_vertices(6);
        for (a, b, c) in [
            (0, 1, 4),
            (1, 3, 1),
            (0, 2, 1),
            (1, 4, 2),
            (3, 5, 6),
            (2, 4, 5),
            (4, 5, 1),
        ] {
            g.add_edge(a, b, c).unwrap();
        }
        g
    }

    #[test]
    fn finds_minimum_cost_route() {
        let graph = grid();
        let mut distances = distance_buffer(&graph);
        let path = shortest_path(&graph, &mut distances, 0, 5).unwrap();
        // 0-1-4-5 and 0-2-4-5 both cost 7.
        assert_eq!(distances[5], 7);
        assert_eq!(graph.path_cost(&path), Some(7));
        assert_eq!(path.first(), Some(0));
        assert_eq!(path.last(), Some(5));
    }

    #[test]
    fn reports_all_distances() {
        let graph = grid();
        let mut distances = distance_buffer(&graph);
        shortest_path(&graph, &mut distances, 0, 3).unwrap();
        assert_eq!(distances, vec![0, 4, 1, 5, 6, 7]);
    }

    #[test]
    fn source_equals_target() {
        let graph = grid();
        let mut distances = distance_buffer(&graph);
        let path = shortest_path(&graph, &mut distances, 2, 2).unwrap();
        assert_eq!(path.indices(), &[2]);
        assert_eq!(distances[2], 0);
    }

    #[test]
    fn unreachable_target_gives_empty_path() {
        let mut graph = Graph::with_vertices(4);
        graph.add_edge(0, 1, 3).unwrap();
        graph.add_edge(2, 3, 3).unwrap();
        let mut distances = distance_buffer(&graph);
        let path = shortest_path(&graph, &mut distances, 0, 3).unwrap();
        assert!(path.is_empty());
        assert_eq!(distances[3], UNREACHABLE);
        assert_eq!(distances[1], 3);
    }

    #[test]
    fn stale_buffer_contents_are_ignored() {
        let graph = grid();
        let mut distances = vec![0; graph.vertex_count()];
        let path = shortest_path(&graph, &mut distances, 0, 3).unwrap();
        assert_eq!(path.indices(), &[0, 1, 3]);
        assert_eq!(distances[3], 5);
    }

    #[test]
    fn reuse_after_cost_increase_reroutes() {
        let mut graph = grid();
        let mut distances = distance_buffer(&graph);
        let first = shortest_path(&graph, &mut distances, 0, 3).unwrap();
        assert_eq!(first.indices(), &[0, 1, 3]);
        graph.increase_cost(1, 3, 10_000).unwrap();
        let second = shortest_path(&graph, &mut distances, 0, 3).unwrap();
        assert_ne!(second, first);
        assert!(!second.edges().any(|e| e == (1, 3)));
        assert_eq!(distances[3], 13);
        assert_eq!(graph.path_cost(&second), Some(13));
    }

    #[test]
    fn huge_costs_do_not_wrap() {
        let mut graph = Graph::with_vertices(3);
        graph.add_edge(0, 1, u64::MAX - 1).unwrap();
        graph.add_edge(1, 2, u64::MAX - 1).unwrap();
        let mut distances = distance_buffer(&graph);
        let path = shortest_path(&graph, &mut distances, 0, 2).unwrap();
        // The saturated sum equals the sentinel, so vertex 2 counts as
        // unreachable rather than wrapping to a small cost.
        assert!(path.is_empty());
        assert_eq!(distances[1], u64::MAX - 1);
    }

    #[test]
    fn contract_violations_are_errors() {
        let graph = grid();
        let mut short = vec![UNREACHABLE; 2];
        assert!(matches!(
            shortest_path(&graph, &mut short, 0, 1),
            Err(GenerationError::DistanceBufferMismatch {
                expected: 6,
                actual: 2
            })
        ));
        let mut distances = distance_buffer(&graph);
        assert!(matches!(
            shortest_path(&graph, &mut distances, 0, 6),
            Err(GenerationError::VertexOutOfRange { index: 6, .. })
        ));
    }
}
