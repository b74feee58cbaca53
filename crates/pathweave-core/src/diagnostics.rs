//! Generation diagnostics: timing and counts for each stage.
//!
//! These diagnostics are permanent instrumentation for parameter tuning.
//! [`generate_with_diagnostics`] runs sampling, triangulation, graph
//! construction and a number of routing rounds, timing each stage with a
//! caller-supplied [`Clock`] so this crate never reads the time itself.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::session::GenerationSession;
use crate::types::{GenerationConfig, GenerationError, Path};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationDiagnostics {
    /// Stage 1: Poisson-disk sampling.
    pub sampling: StageDiagnostics,
    /// Stage 2: Delaunay triangulation.
    pub triangulation: StageDiagnostics,
    /// Stage 3: graph construction.
    pub graph: StageDiagnostics,
    /// Stage 4: repeated routing with penalties.
    pub routing: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: GenerationSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Point sampling metrics.
    Sampling {
        /// Separation radius used.
        min_radius: f64,
        /// Area of the sampling region.
        region_area: f64,
        /// Interior points kept (anchors excluded).
        interior_points: usize,
        /// Interior points per unit area, scaled by `min_radius²`.
        packing_density: f64,
    },
    /// Triangulation metrics.
    Triangulation {
        /// Points handed to the triangulation.
        point_count: usize,
        /// Inner triangles produced.
        triangle_count: usize,
    },
    /// Graph construction metrics.
    Graph {
        /// Vertex count.
        vertex_count: usize,
        /// Undirected edge count.
        edge_count: usize,
        /// Smallest edge cost.
        min_cost: u64,
        /// Largest edge cost.
        max_cost: u64,
        /// Mean edge cost.
        mean_cost: f64,
    },
    /// Routing metrics.
    Routing {
        /// Routes requested.
        requested: usize,
        /// Routes that reached the end anchor.
        found: usize,
        /// Distinct routes among those found.
        distinct: usize,
        /// Distinct edges used by any found route.
        edges_used: usize,
        /// Mean pristine-graph cost of found routes.
        mean_cost: f64,
    },
}

/// High-level summary for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Points including both anchors.
    pub point_count: usize,
    /// Undirected edges in the graph.
    pub edge_count: usize,
    /// Routes that reached the end anchor.
    pub route_count: usize,
    /// Distinct routes.
    pub distinct_route_count: usize,
}

/// Run a full generation with `routes` calls to `add_path`, timing each
/// stage.
///
/// # Errors
///
/// Same as [`GenerationSession::new`].
pub fn generate_with_diagnostics<C: Clock>(
    config: GenerationConfig,
    routes: usize,
    clock: &C,
) -> Result<(GenerationSession, GenerationDiagnostics), GenerationError> {
    config.validate()?;
    let run_start = clock.now();

    // 1-3. Sampling, triangulation, graph construction.
    let (mut session, timings) = GenerationSession::build(config, clock)?;
    let sampling = StageDiagnostics {
        duration: timings.sampling,
        metrics: sampling_metrics(&session),
    };
    let triangulation = StageDiagnostics {
        duration: timings.triangulation,
        metrics: StageMetrics::Triangulation {
            point_count: session.points().len(),
            triangle_count: session.triangles().len(),
        },
    };
    let graph = session.pristine_graph();
    let stats = cost_stats(graph);
    let graph_stage = StageDiagnostics {
        duration: timings.graph,
        metrics: StageMetrics::Graph {
            vertex_count: graph.vertex_count(),
            edge_count: graph.edge_count(),
            min_cost: stats.min,
            max_cost: stats.max,
            mean_cost: stats.mean,
        },
    };

    // 4. Routing.
    let t = clock.now();
    for _ in 0..routes {
        session.add_path()?;
    }
    let routing = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: routing_metrics(&session, routes),
    };

    let found: Vec<&Path> = session.paths().iter().filter(|p| !p.is_empty()).collect();
    let summary = GenerationSummary {
        point_count: session.points().len(),
        edge_count: session.pristine_graph().edge_count(),
        route_count: found.len(),
        distinct_route_count: found.iter().collect::<HashSet<_>>().len(),
    };

    let diagnostics = GenerationDiagnostics {
        sampling,
        triangulation,
        graph: graph_stage,
        routing,
        total_duration: clock.elapsed(&run_start),
        summary,
    };
    Ok((session, diagnostics))
}

/// Clock for untimed construction. Every duration is zero.
pub(crate) struct Untimed;

impl Clock for Untimed {
    type Instant = ();

    fn now(&self) -> Self::Instant {}

    fn elapsed(&self, _since: &Self::Instant) -> Duration {
        Duration::ZERO
    }
}

fn sampling_metrics(session: &GenerationSession) -> StageMetrics {
    let config = session.config();
    let interior_points = session.points().interior().len();
    let region_area = config.effective_region().area();
    #[allow(clippy::cast_precision_loss)]
    let packing_density = if region_area > 0.0 {
        interior_points as f64 * config.min_radius * config.min_radius / region_area
    } else {
        0.0
    };
    StageMetrics::Sampling {
        min_radius: config.min_radius,
        region_area,
        interior_points,
        packing_density,
    }
}

/// Edge cost statistics for a graph.
struct CostStats {
    min: u64,
    max: u64,
    mean: f64,
}

fn cost_stats(graph: &Graph) -> CostStats {
    let edges = graph.edge_list();
    let min = edges.iter().map(|e| e.cost).min().unwrap_or(0);
    let max = edges.iter().map(|e| e.cost).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if edges.is_empty() {
        0.0
    } else {
        edges.iter().map(|e| e.cost as f64).sum::<f64>() / edges.len() as f64
    };
    CostStats { min, max, mean }
}

fn routing_metrics(session: &GenerationSession, requested: usize) -> StageMetrics {
    let found: Vec<&Path> = session.paths().iter().filter(|p| !p.is_empty()).collect();
    let distinct = found.iter().collect::<HashSet<_>>().len();
    let edges_used = found
        .iter()
        .flat_map(|p| p.edges().map(|(a, b)| (a.min(b), a.max(b))))
        .collect::<HashSet<_>>()
        .len();
    let costs: Vec<u64> = (0..session.paths().len())
        .filter_map(|i| session.path_cost(i))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let mean_cost = if costs.is_empty() {
        0.0
    } else {
        costs.iter().map(|&c| c as f64).sum::<f64>() / costs.len() as f64
    };
    StageMetrics::Routing {
        requested,
        found: found.len(),
        distinct,
        edges_used,
        mean_cost,
    }
}

impl GenerationDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Generation Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Points: {}  |  Edges: {}",
            self.summary.point_count, self.summary.edge_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Sampling", &self.sampling),
            ("Triangulation", &self.triangulation),
            ("Graph", &self.graph),
            ("Routing", &self.routing),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Routes: {}  |  Distinct: {}",
            self.summary.route_count, self.summary.distinct_route_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Sampling {
            min_radius,
            region_area,
            interior_points,
            packing_density,
        } => format!(
            "r={min_radius:.1} area={region_area:.0} {interior_points} pts (density {packing_density:.3})"
        ),
        StageMetrics::Triangulation {
            point_count,
            triangle_count,
        } => format!("{point_count} pts -> {triangle_count} triangles"),
        StageMetrics::Graph {
            vertex_count,
            edge_count,
            min_cost,
            max_cost,
            mean_cost,
        } => format!(
            "{vertex_count} vertices, {edge_count} edges (cost min={min_cost} max={max_cost} mean={mean_cost:.1})"
        ),
        StageMetrics::Routing {
            requested,
            found,
            distinct,
            edges_used,
            mean_cost,
        } => format!(
            "{found}/{requested} routes, {distinct} distinct, {edges_used} edges used (mean cost {mean_cost:.1})"
        ),
    }
}
