//! Delaunay triangulation of a point set, reported as point indices.
//!
//! Each point is inserted into a `spade` triangulation and the returned
//! vertex handle is mapped back to the point's index. Triangles therefore
//! carry stable indices from the moment they are computed and graph
//! construction never has to search for a vertex by its coordinates.

use serde::{Deserialize, Serialize};
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::types::{GenerationError, Point};

/// A triangle given by three indices into the canonical point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle(pub [usize; 3]);

impl Triangle {
    /// The three vertex indices.
    #[must_use]
    pub const fn vertices(self) -> [usize; 3] {
        self.0
    }

    /// The three vertex pairs forming the triangle's sides.
    #[must_use]
    pub const fn sides(self) -> [(usize, usize); 3] {
        let [a, b, c] = self.0;
        [(a, b), (a, c), (b, c)]
    }
}

/// Triangulate `points` and return every inner triangle as point indices.
///
/// A point whose coordinates repeat an earlier point gets no vertex of its
/// own and appears in no triangle. Fewer than three distinct,
/// non-collinear points produce no triangles.
///
/// # Errors
///
/// Returns [`GenerationError::Triangulation`] if a point cannot be
/// inserted (NaN or out-of-range coordinates).
pub fn triangulate(points: &[Point]) -> Result<Vec<Triangle>, GenerationError> {
    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    // Vertex handle index -> point index.
    let mut vertex_to_point: Vec<Option<usize>> = Vec::with_capacity(points.len());

    for (index, p) in points.iter().enumerate() {
        let handle = triangulation
            .insert(Point2::new(p.x, p.y))
            .map_err(|source| GenerationError::Triangulation { index, source })?;
        let slot = handle.index();
        if slot >= vertex_to_point.len() {
            vertex_to_point.resize(slot + 1, None);
        }
        if vertex_to_point[slot].is_some() {
            log::warn!(
                "point {index} at ({}, {}) duplicates an earlier point, leaving it isolated",
                p.x,
                p.y
            );
        } else {
            vertex_to_point[slot] = Some(index);
        }
    }

    let triangles: Vec<Triangle> = triangulation
        .inner_faces()
        .filter_map(|face| {
            let [a, b, c] = face.vertices();
            Some(Triangle([
                vertex_to_point.get(a.fix().index()).copied().flatten()?,
                vertex_to_point.get(b.fix().index()).copied().flatten()?,
                vertex_to_point.get(c.fix().index()).copied().flatten()?,
            ]))
        })
        .collect();

    log::debug!(
        "triangulated {} points into {} triangles",
        points.len(),
        triangles.len()
    );
    Ok(triangles)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sorted(mut t: [usize; 3]) -> [usize; 3] {
        t.sort_unstable();
        t
    }

    #[test]
    fn single_triangle_keeps_point_indices() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let triangles = triangulate(&points).unwrap();
        assert_eq!(triangles.len(), 1);
        assert_eq!(sorted(triangles[0].vertices()), [0, 1, 2]);
    }

    #[test]
    fn square_with_center_gives_four_triangles() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(5.0, 5.0),
        ];
        let triangles = triangulate(&points).unwrap();
        assert_eq!(triangles.len(), 4);
        for t in &triangles {
            assert!(t.vertices().contains(&4), "centre missing from {t:?}");
        }
    }

    #[test]
    fn too_few_points_give_no_triangles() {
        assert!(triangulate(&[]).unwrap().is_empty());
        let two = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(triangulate(&two).unwrap().is_empty());
    }

    #[test]
    fn collinear_points_give_no_triangles() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        assert!(triangulate(&points).unwrap().is_empty());
    }

    #[test]
    fn duplicate_point_is_left_out() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ];
        let triangles = triangulate(&points).unwrap();
        assert_eq!(triangles.len(), 1);
        assert!(!triangles[0].vertices().contains(&3));
    }

    #[test]
    fn nan_point_is_an_error() {
        let points = [Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)];
        let err = triangulate(&points).unwrap_err();
        assert!(matches!(err, GenerationError::Triangulation { index: 1, .. }));
    }

    #[test]
    fn sides_cover_all_pairs() {
        let sides = Triangle([4, 7, 9]).sides();
        assert_eq!(sides, [(4, 7), (4, 9), (7, 9)]);
    }
}
