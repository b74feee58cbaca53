//! Shared types for the pathweave route-map generator.

use geo::{Area, BoundingRect, Intersects, IsConvex};
use serde::{Deserialize, Serialize};

/// A 2D point in map coordinates.
///
/// Equality is exact coordinate equality. Anchors are identified this way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Midpoint of the segment between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Convert a map `Point` to a `geo::Coord`.
pub(crate) const fn point_to_coord(p: Point) -> geo::Coord<f64> {
    geo::Coord { x: p.x, y: p.y }
}

/// Convert a `geo::Coord` back to a map `Point`.
pub(crate) const fn coord_to_point(c: geo::Coord<f64>) -> Point {
    Point::new(c.x, c.y)
}

/// A generated point set with the two anchors stored last.
///
/// Index `len - 2` is the start anchor and `len - 1` the end anchor. Every
/// other point is a sampled interior point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSet(Vec<Point>);

impl PointSet {
    /// Build a point set from interior points plus the two anchors.
    #[must_use]
    pub fn new(mut interior: Vec<Point>, start: Point, end: Point) -> Self {
        interior.reserve(2);
        interior.push(start);
        interior.push(end);
        Self(interior)
    }

    /// Total number of points, anchors included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: a point set holds at least its two anchors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the start anchor.
    #[must_use]
    pub const fn start_index(&self) -> usize {
        self.0.len() - 2
    }

    /// Index of the end anchor.
    #[must_use]
    pub const fn end_index(&self) -> usize {
        self.0.len() - 1
    }

    /// The start anchor.
    #[must_use]
    pub fn start(&self) -> Point {
        self.0[self.start_index()]
    }

    /// The end anchor.
    #[must_use]
    pub fn end(&self) -> Point {
        self.0[self.end_index()]
    }

    /// Returns `true` if `index` refers to one of the anchors.
    #[must_use]
    pub const fn is_anchor(&self, index: usize) -> bool {
        index == self.start_index() || index == self.end_index()
    }

    /// All points, anchors last.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// The sampled points without the anchors.
    #[must_use]
    pub fn interior(&self) -> &[Point] {
        &self.0[..self.start_index()]
    }
}

/// A route through the graph as an ordered sequence of point indices.
///
/// A non-empty path starts at the source anchor, ends at the target
/// anchor, and has at least two indices. An empty path means the target
/// was unreachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path(Vec<usize>);

impl Path {
    /// Create a new path from point indices.
    #[must_use]
    pub const fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The unreachable path.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if the path has no indices (target unreachable).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of indices in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first index, if any.
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Returns the last index, if any.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Returns a slice of all indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Consecutive index pairs, one per traversed edge.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }
}

/// A convex area in which interior points are sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Region {
    /// A disc. Points on the circle count as inside.
    Circle {
        /// Centre of the disc.
        center: Point,
        /// Radius of the disc.
        radius: f64,
    },
    /// An axis-aligned rectangle, boundary inclusive.
    Rect {
        /// Corner with the smallest coordinates.
        min: Point,
        /// Corner with the largest coordinates.
        max: Point,
    },
    /// A convex polygon given by its vertices in either winding order.
    Polygon {
        /// Polygon vertices; the ring is closed implicitly.
        vertices: Vec<Point>,
    },
}

impl Region {
    /// The disc whose diameter is the segment from `start` to `end`.
    #[must_use]
    pub fn spanning(start: Point, end: Point) -> Self {
        Self::Circle {
            center: start.midpoint(end),
            radius: start.distance(end) / 2.0,
        }
    }

    /// Returns `true` if `p` lies inside the region or on its boundary.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        Footprint::new(self).contains(p)
    }

    /// Axis-aligned bounding box as `(min, max)`.
    ///
    /// `None` for a polygon without vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        match self {
            Self::Circle { center, radius } => Some((
                Point::new(center.x - radius, center.y - radius),
                Point::new(center.x + radius, center.y + radius),
            )),
            Self::Rect { min, max } => Some((*min, *max)),
            Self::Polygon { vertices } => polygon(vertices)
                .bounding_rect()
                .map(|r| (coord_to_point(r.min()), coord_to_point(r.max()))),
        }
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Circle { radius, .. } => std::f64::consts::PI * radius * radius,
            Self::Rect { min, max } => (max.x - min.x) * (max.y - min.y),
            Self::Polygon { vertices } => polygon(vertices).unsigned_area(),
        }
    }

    /// Check the region's geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] for a non-finite or
    /// non-positive circle radius, an inverted or degenerate rectangle,
    /// or a polygon with fewer than three vertices, non-finite
    /// coordinates, or a non-convex ring.
    pub fn validate(&self) -> Result<(), GenerationError> {
        match self {
            Self::Circle { center, radius } => {
                if !center.is_finite() {
                    return Err(GenerationError::InvalidConfig(
                        "circle centre must be finite".to_string(),
                    ));
                }
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(GenerationError::InvalidConfig(format!(
                        "circle radius must be finite and positive, got {radius}"
                    )));
                }
            }
            Self::Rect { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(GenerationError::InvalidConfig(
                        "rectangle corners must be finite".to_string(),
                    ));
                }
                if min.x >= max.x || min.y >= max.y {
                    return Err(GenerationError::InvalidConfig(format!(
                        "rectangle min ({}, {}) must be below max ({}, {})",
                        min.x, min.y, max.x, max.y
                    )));
                }
            }
            Self::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(GenerationError::InvalidConfig(format!(
                        "polygon needs at least 3 vertices, got {}",
                        vertices.len()
                    )));
                }
                if vertices.iter().any(|v| !v.is_finite()) {
                    return Err(GenerationError::InvalidConfig(
                        "polygon vertices must be finite".to_string(),
                    ));
                }
                if !polygon(vertices).exterior().is_convex() {
                    return Err(GenerationError::InvalidConfig(
                        "polygon must be convex".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn polygon(vertices: &[Point]) -> geo::Polygon<f64> {
    let ring: Vec<geo::Coord<f64>> = vertices.iter().copied().map(point_to_coord).collect();
    geo::Polygon::new(geo::LineString::new(ring), Vec::new())
}

/// A region prepared for repeated containment queries.
///
/// Polygons are converted to `geo` geometry once instead of per query.
pub(crate) enum Footprint {
    Circle { center: Point, radius_sq: f64 },
    Rect { min: Point, max: Point },
    Polygon(geo::Polygon<f64>),
}

impl Footprint {
    pub(crate) fn new(region: &Region) -> Self {
        match region {
            Region::Circle { center, radius } => Self::Circle {
                center: *center,
                radius_sq: radius * radius,
            },
            Region::Rect { min, max } => Self::Rect {
                min: *min,
                max: *max,
            },
            Region::Polygon { vertices } => Self::Polygon(polygon(vertices)),
        }
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        match self {
            Self::Circle { center, radius_sq } => p.distance_squared(*center) <= *radius_sq,
            Self::Rect { min, max } => p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y,
            Self::Polygon(poly) => poly.intersects(&geo::Point::from(point_to_coord(p))),
        }
    }
}

/// Configuration for a generation session.
///
/// All parameters have defaults matching the classic portrait map layout:
/// anchors 700 units apart on a vertical line, the sampling disc spanning
/// them, and points roughly 80 units apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Source anchor. Every route starts here.
    pub start: Point,

    /// Target anchor. Every route ends here.
    pub end: Point,

    /// Sampling region. `None` uses [`Region::spanning`] of the anchors.
    pub region: Option<Region>,

    /// Minimum separation between sampled points, and between sampled
    /// points and the anchors.
    pub min_radius: f64,

    /// Candidates tried around each active point before it is retired.
    pub sample_attempts: u32,

    /// Cost added to one edge of every accepted route.
    pub penalty: u64,

    /// Seed for the session's random source. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl GenerationConfig {
    /// Default source anchor.
    pub const DEFAULT_START: Point = Point::new(1100.0, 850.0);
    /// Default target anchor.
    pub const DEFAULT_END: Point = Point::new(1100.0, 150.0);
    /// Default Poisson-disk separation.
    pub const DEFAULT_MIN_RADIUS: f64 = 80.0;
    /// Default candidate count per active point (Bridson's `k`).
    pub const DEFAULT_SAMPLE_ATTEMPTS: u32 = 30;
    /// Default per-route penalty, far above any single edge cost.
    pub const DEFAULT_PENALTY: u64 = 10_000;
    /// Largest accepted point estimate, the sampling box area divided by
    /// `min_radius²`.
    pub const MAX_POINT_ESTIMATE: f64 = 1_000_000.0;

    /// The configured region, or the disc spanning the anchors.
    #[must_use]
    pub fn effective_region(&self) -> Region {
        self.region
            .clone()
            .unwrap_or_else(|| Region::spanning(self.start, self.end))
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] describing the first
    /// offending parameter.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(GenerationError::InvalidConfig(
                "anchor coordinates must be finite".to_string(),
            ));
        }
        if self.start == self.end {
            return Err(GenerationError::InvalidConfig(
                "start and end anchors must differ".to_string(),
            ));
        }
        if !(2.0 * self.min_radius).is_finite() || self.min_radius <= 0.0 {
            return Err(GenerationError::InvalidConfig(format!(
                "min_radius must be positive and finite when doubled, got {}",
                self.min_radius
            )));
        }
        if self.sample_attempts == 0 {
            return Err(GenerationError::InvalidConfig(
                "sample_attempts must be at least 1".to_string(),
            ));
        }
        if self.penalty == 0 {
            return Err(GenerationError::InvalidConfig(
                "penalty must be positive".to_string(),
            ));
        }
        if let Some(region) = &self.region {
            region.validate()?;
        }
        if let Some((min, max)) = self.effective_region().bounding_box() {
            let estimate =
                (max.x - min.x) * (max.y - min.y) / (self.min_radius * self.min_radius);
            if !estimate.is_finite() || estimate > Self::MAX_POINT_ESTIMATE {
                return Err(GenerationError::InvalidConfig(format!(
                    "min_radius {} is too small for the sampling region (about {estimate:.0} points, at most {} allowed)",
                    self.min_radius,
                    Self::MAX_POINT_ESTIMATE
                )));
            }
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            start: Self::DEFAULT_START,
            end: Self::DEFAULT_END,
            region: None,
            min_radius: Self::DEFAULT_MIN_RADIUS,
            sample_attempts: Self::DEFAULT_SAMPLE_ATTEMPTS,
            penalty: Self::DEFAULT_PENALTY,
            seed: None,
        }
    }
}

/// Errors that can occur while generating or querying a route map.
///
/// Unreachable targets and degenerate regions are not errors; they show up
/// as an empty [`Path`] and an anchors-only [`PointSet`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Generation configuration is invalid.
    #[error("invalid generation configuration: {0}")]
    InvalidConfig(String),

    /// A vertex index does not exist in the graph.
    #[error("vertex {index} is out of range for a graph with {vertex_count} vertices")]
    VertexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },

    /// The distance buffer does not have one entry per vertex.
    #[error("distance buffer has {actual} entries, graph has {expected} vertices")]
    DistanceBufferMismatch {
        /// Number of vertices in the graph.
        expected: usize,
        /// Length of the buffer that was passed.
        actual: usize,
    },

    /// Two consecutive path indices are not joined by an edge.
    #[error("no edge between vertices {from} and {to}")]
    MissingEdge {
        /// First endpoint.
        from: usize,
        /// Second endpoint.
        to: usize,
    },

    /// The triangulation rejected a point.
    #[error("failed to triangulate point {index}: {source}")]
    Triangulation {
        /// Index of the rejected point.
        index: usize,
        /// Reason reported by the triangulation.
        #[source]
        source: spade::InsertionError,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_equality() {
        assert_eq!(Point::new(1.0, 2.0), Point::new(1.0, 2.0));
        assert_ne!(Point::new(1.0, 2.0), Point::new(1.0, 3.0));
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_midpoint() {
        let m = Point::new(0.0, 10.0).midpoint(Point::new(4.0, 0.0));
        assert_eq!(m, Point::new(2.0, 5.0));
    }

    // --- PointSet tests ---

    #[test]
    fn point_set_stores_anchors_last() {
        let set = PointSet::new(
            vec![Point::new(5.0, 5.0), Point::new(-5.0, 5.0)],
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
        );
        assert_eq!(set.len(), 4);
        assert_eq!(set.start_index(), 2);
        assert_eq!(set.end_index(), 3);
        assert_eq!(set.start(), Point::new(0.0, 0.0));
        assert_eq!(set.end(), Point::new(0.0, 10.0));
        assert_eq!(set.interior().len(), 2);
        assert!(set.is_anchor(2));
        assert!(!set.is_anchor(0));
    }

    #[test]
    fn point_set_with_only_anchors() {
        let set = PointSet::new(Vec::new(), Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.start_index(), 0);
        assert!(set.interior().is_empty());
    }

    // --- Path tests ---

    #[test]
    fn path_edges_are_consecutive_pairs() {
        let path = Path::new(vec![3, 0, 1, 4]);
        let edges: Vec<_> = path.edges().collect();
        assert_eq!(edges, vec![(3, 0), (0, 1), (1, 4)]);
        assert_eq!(path.first(), Some(3));
        assert_eq!(path.last(), Some(4));
    }

    #[test]
    fn empty_path_has_no_edges() {
        let path = Path::empty();
        assert!(path.is_empty());
        assert_eq!(path.edges().count(), 0);
        assert_eq!(path.first(), None);
    }

    // --- Region tests ---

    #[test]
    fn spanning_region_has_anchors_on_boundary() {
        let start = Point::new(1100.0, 850.0);
        let end = Point::new(1100.0, 150.0);
        let region = Region::spanning(start, end);
        assert_eq!(
            region,
            Region::Circle {
                center: Point::new(1100.0, 500.0),
                radius: 350.0,
            }
        );
        assert!(region.contains(start));
        assert!(region.contains(end));
        assert!(!region.contains(Point::new(1500.0, 500.0)));
    }

    #[test]
    fn rect_contains_is_boundary_inclusive() {
        let region = Region::Rect {
            min: Point::new(0.0, 0.0),
            max: Point::new(10.0, 5.0),
        };
        assert!(region.contains(Point::new(10.0, 5.0)));
        assert!(region.contains(Point::new(3.0, 2.0)));
        assert!(!region.contains(Point::new(10.1, 2.0)));
        assert!((region.area() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn polygon_contains_and_bounds() {
        let region = Region::Polygon {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 10.0),
            ],
        };
        assert!(region.contains(Point::new(2.0, 2.0)));
        assert!(!region.contains(Point::new(8.0, 8.0)));
        assert_eq!(
            region.bounding_box(),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 10.0)))
        );
        assert!((region.area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn region_validation() {
        assert!(
            Region::Circle {
                center: Point::new(0.0, 0.0),
                radius: 0.0,
            }
            .validate()
            .is_err()
        );
        assert!(
            Region::Rect {
                min: Point::new(5.0, 0.0),
                max: Point::new(0.0, 5.0),
            }
            .validate()
            .is_err()
        );
        assert!(
            Region::Polygon {
                vertices: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn polygon_must_be_convex() {
        let arrow = Region::Polygon {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(0.0, 10.0),
                Point::new(4.0, 5.0),
            ],
        };
        assert!(matches!(
            arrow.validate(),
            Err(GenerationError::InvalidConfig(msg)) if msg.contains("convex")
        ));
        let kite = Region::Polygon {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(0.0, 10.0),
                Point::new(-4.0, 5.0),
            ],
        };
        assert!(kite.validate().is_ok());
    }

    // --- GenerationConfig tests ---

    #[test]
    fn config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.start, Point::new(1100.0, 850.0));
        assert_eq!(config.end, Point::new(1100.0, 150.0));
        assert!(config.region.is_none());
        assert!((config.min_radius - 80.0).abs() < f64::EPSILON);
        assert_eq!(config.sample_attempts, 30);
        assert_eq!(config.penalty, 10_000);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_identical_anchors() {
        let config = GenerationConfig {
            end: GenerationConfig::DEFAULT_START,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_bad_radius_and_penalty() {
        for min_radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = GenerationConfig {
                min_radius,
                ..GenerationConfig::default()
            };
            assert!(config.validate().is_err(), "accepted min_radius {min_radius}");
        }
        let config = GenerationConfig {
            penalty: 0,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_radius_that_overflows_when_doubled() {
        for min_radius in [f64::MAX / 1.5, 1e308] {
            let config = GenerationConfig {
                min_radius,
                seed: Some(1),
                ..GenerationConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(GenerationError::InvalidConfig(_))),
                "accepted min_radius {min_radius}"
            );
        }
    }

    #[test]
    fn config_rejects_radius_too_small_for_region() {
        let config = GenerationConfig {
            min_radius: 1e-6,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenerationError::InvalidConfig(msg)) if msg.contains("too small")
        ));
        // The default layout is far below the limit.
        let config = GenerationConfig {
            min_radius: 1.0,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_deserializes_partial_json() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{"min_radius": 40.0, "seed": 7}"#).unwrap();
        assert!((config.min_radius - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.penalty, GenerationConfig::DEFAULT_PENALTY);
    }

    // --- GenerationError tests ---

    #[test]
    fn error_display() {
        let err = GenerationError::VertexOutOfRange {
            index: 9,
            vertex_count: 4,
        };
        assert_eq!(
            err.to_string(),
            "vertex 9 is out of range for a graph with 4 vertices"
        );
        let err = GenerationError::InvalidConfig("penalty must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid generation configuration: penalty must be positive"
        );
    }
}
