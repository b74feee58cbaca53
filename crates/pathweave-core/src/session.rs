//! Generation session: owns every piece of mutable route-map state.
//!
//! A session is created once from a [`GenerationConfig`] (or from points
//! and triangles produced elsewhere). Points, triangles and the pristine
//! graph never change afterwards. [`GenerationSession::add_path`] routes
//! between the anchors on the working graph and penalizes one edge of the
//! result; [`GenerationSession::reset`] puts the working graph back to the
//! pristine snapshot and forgets all accepted routes.
//!
//! ```rust
//! # use pathweave_core::{GenerationConfig, GenerationSession, GenerationError};
//! # fn run() -> Result<(), GenerationError> {
//! let config = GenerationConfig {
//!     seed: Some(7),
//!     ..GenerationConfig::default()
//! };
//! let mut session = GenerationSession::new(config)?;
//! for _ in 0..6 {
//!     session.add_path()?;
//! }
//! assert_eq!(session.paths().len(), 6);
//! session.reset();
//! assert!(session.paths().is_empty());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::diagnostics::{Clock, Untimed};
use crate::dijkstra::{UNREACHABLE, distance_buffer, shortest_path};
use crate::diversify::{Penalty, penalize_random_edge};
use crate::graph::{EdgeEntry, Graph, build_graph};
use crate::sample::generate_points;
use crate::triangulate::{Triangle, triangulate};
use crate::types::{GenerationConfig, GenerationError, Path, PointSet};

/// Random source for a session: seeded when `seed` is set, OS entropy
/// otherwise.
#[must_use]
pub fn session_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// All state of one route-map generation.
#[derive(Debug, Clone)]
pub struct GenerationSession {
    config: GenerationConfig,
    points: PointSet,
    triangles: Vec<Triangle>,
    pristine: Graph,
    graph: Graph,
    distances: Vec<u64>,
    paths: Vec<Path>,
    penalties: Vec<Penalty>,
    rng: StdRng,
}

impl GenerationSession {
    /// Sample points, triangulate them, and build the graph.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] if `config` fails
    /// validation, or a triangulation error for unrepresentable points.
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        Self::build(config, &Untimed).map(|(session, _)| session)
    }

    /// Construction stages of [`GenerationSession::new`], each timed with
    /// `clock`.
    pub(crate) fn build<C: Clock>(
        config: GenerationConfig,
        clock: &C,
    ) -> Result<(Self, BuildTimings), GenerationError> {
        config.validate()?;
        let mut rng = session_rng(config.seed);

        let t = clock.now();
        let points = generate_points(
            &config.effective_region(),
            config.start,
            config.end,
            config.min_radius,
            config.sample_attempts,
            &mut rng,
        );
        let sampling = clock.elapsed(&t);

        let t = clock.now();
        let triangles = triangulate(points.points())?;
        let triangulation = clock.elapsed(&t);

        let t = clock.now();
        let graph = build_graph(&triangles, points.points())?;
        let graph_time = clock.elapsed(&t);

        let timings = BuildTimings {
            sampling,
            triangulation,
            graph: graph_time,
        };
        Ok((Self::assemble(config, points, triangles, graph, rng), timings))
    }

    /// Build a session from an externally produced point set and
    /// triangulation.
    ///
    /// The anchors are taken from `points`; `config` supplies the penalty
    /// and the seed of the edge-selection random source.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] if `config` fails
    /// validation and [`GenerationError::VertexOutOfRange`] if a triangle
    /// refers to a point that does not exist.
    pub fn from_parts(
        config: GenerationConfig,
        points: PointSet,
        triangles: Vec<Triangle>,
    ) -> Result<Self, GenerationError> {
        config.validate()?;
        let rng = session_rng(config.seed);
        let graph = build_graph(&triangles, points.points())?;
        Ok(Self::assemble(config, points, triangles, graph, rng))
    }

    fn assemble(
        config: GenerationConfig,
        points: PointSet,
        triangles: Vec<Triangle>,
        graph: Graph,
        rng: StdRng,
    ) -> Self {
        Self {
            distances: distance_buffer(&graph),
            pristine: graph.clone(),
            graph,
            config,
            points,
            triangles,
            paths: Vec::new(),
            penalties: Vec::new(),
            rng,
        }
    }

    /// Route from the start anchor to the end anchor, record the route,
    /// and penalize one of its edges.
    ///
    /// An unreachable end anchor yields an empty path. It is recorded like
    /// any other route but leaves the graph unchanged.
    ///
    /// # Errors
    ///
    /// Only on internal inconsistency between the graph and the point set,
    /// which construction rules out.
    pub fn add_path(&mut self) -> Result<Path, GenerationError> {
        let (source, target) = (self.points.start_index(), self.points.end_index());
        let path = shortest_path(&self.graph, &mut self.distances, source, target)?;
        self.paths.push(path.clone());
        if let Some(penalty) =
            penalize_random_edge(&mut self.graph, &path, self.config.penalty, &mut self.rng)?
        {
            self.penalties.push(penalty);
        }
        log::debug!(
            "route {} accepted with {} vertices",
            self.paths.len(),
            path.len()
        );
        Ok(path)
    }

    /// Restore the pristine graph and clear accepted routes.
    ///
    /// Points and triangles are kept.
    pub fn reset(&mut self) {
        self.graph.clone_from(&self.pristine);
        self.distances.fill(UNREACHABLE);
        self.paths.clear();
        self.penalties.clear();
        log::debug!("session reset");
    }

    /// The configuration the session was created with.
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// The point set, anchors last.
    #[must_use]
    pub const fn points(&self) -> &PointSet {
        &self.points
    }

    /// The triangulation the graph was built from.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// The working graph, including penalties.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The graph as it was before any penalty.
    #[must_use]
    pub const fn pristine_graph(&self) -> &Graph {
        &self.pristine
    }

    /// Accepted routes in the order they were added.
    #[must_use]
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Penalties in the order they were applied.
    #[must_use]
    pub fn penalties(&self) -> &[Penalty] {
        &self.penalties
    }

    /// Distances from the start anchor computed by the latest query.
    #[must_use]
    pub fn distances(&self) -> &[u64] {
        &self.distances
    }

    /// Length of accepted route `index` measured on the pristine graph.
    ///
    /// `None` if there is no such route or it is empty.
    #[must_use]
    pub fn path_cost(&self, index: usize) -> Option<u64> {
        let path = self.paths.get(index).filter(|p| !p.is_empty())?;
        self.pristine.path_cost(path)
    }

    /// A serializable view of the current state for external rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            points: self.points.points(),
            start_index: self.points.start_index(),
            end_index: self.points.end_index(),
            triangles: &self.triangles,
            edges: self.graph.edge_list(),
            paths: &self.paths,
            penalties: &self.penalties,
        }
    }
}

/// Duration of each construction stage.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BuildTimings {
    pub(crate) sampling: Duration,
    pub(crate) triangulation: Duration,
    pub(crate) graph: Duration,
}

/// Read-only state of a session, ready to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<'a> {
    /// All points, anchors last.
    pub points: &'a [crate::Point],
    /// Index of the start anchor.
    pub start_index: usize,
    /// Index of the end anchor.
    pub end_index: usize,
    /// Triangles as point indices.
    pub triangles: &'a [Triangle],
    /// Working-graph edges with current costs.
    pub edges: Vec<EdgeEntry>,
    /// Accepted routes.
    pub paths: &'a [Path],
    /// Applied penalties.
    pub penalties: &'a [Penalty],
}

/// Add one route to `session`. See [`GenerationSession::add_path`].
///
/// # Errors
///
/// See [`GenerationSession::add_path`].
pub fn add_path(session: &mut GenerationSession) -> Result<Path, GenerationError> {
    session.add_path()
}

/// Reset `session`. See [`GenerationSession::reset`].
pub fn reset(session: &mut GenerationSession) {
    session.reset();
}
