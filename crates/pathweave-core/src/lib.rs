//! pathweave-core: Procedural route-map generation (sans-IO).
//!
//! Builds a map of alternative routes between two anchor points through:
//! Poisson-disk sampling -> Delaunay triangulation -> weighted graph ->
//! repeated shortest-path search with random edge penalties.
//!
//! This crate has **no I/O dependencies** -- it returns structured data
//! (points, triangles, edges, routes) for the caller to render or store.
//! Timing is injected through [`diagnostics::Clock`], and randomness comes
//! from a seeded or entropy-backed `StdRng` owned by the session.

pub mod diagnostics;
pub mod dijkstra;
pub mod diversify;
pub mod graph;
pub mod sample;
pub mod session;
pub mod triangulate;
pub mod types;

pub use diagnostics::{Clock, GenerationDiagnostics, generate_with_diagnostics};
pub use dijkstra::{UNREACHABLE, distance_buffer, shortest_path};
pub use diversify::{Penalty, penalize_random_edge};
pub use graph::{Edge, EdgeEntry, Graph, build_graph, edge_cost};
pub use sample::generate_points;
pub use session::{GenerationSession, SessionSnapshot, add_path, reset};
pub use triangulate::{Triangle, triangulate};
pub use types::{GenerationConfig, GenerationError, Path, Point, PointSet, Region};

/// Create a session and accept `routes` routes.
///
/// Convenience wrapper around [`GenerationSession::new`] followed by
/// repeated [`GenerationSession::add_path`].
///
/// # Errors
///
/// Returns [`GenerationError::InvalidConfig`] if `config` fails validation,
/// or a triangulation error for unrepresentable points.
pub fn generate(
    config: GenerationConfig,
    routes: usize,
) -> Result<GenerationSession, GenerationError> {
    let mut session = GenerationSession::new(config)?;
    for _ in 0..routes {
        session.add_path()?;
    }
    log::info!(
        "generated {} points, {} edges, {} routes",
        session.points().len(),
        session.graph().edge_count(),
        session.paths().len()
    );
    Ok(session)
}
