//! Point sampling: blue-noise points inside a region, anchors appended.
//!
//! Interior points come from Bridson's Poisson-disk algorithm run over the
//! region's bounding box. Candidates are kept only if they fall inside the
//! region and stay at least `min_radius` away from both anchors, so the
//! anchors never end up crowded. Neighbour checks go through an R\*-tree.
//!
//! Sampling never fails: degenerate parameters produce a point set that
//! holds only the two anchors.

use std::f64::consts::TAU;

use rand::Rng;
use rstar::RTree;

use crate::types::{Footprint, Point, PointSet, Region};

/// Generate a blue-noise point set inside `region` with both anchors
/// appended at the end.
///
/// `attempts` is the number of candidates drawn around an active point
/// before it is retired (Bridson's `k`).
///
/// Returns only `[start, end]` when `min_radius` is not positive or `2 *
/// min_radius` is not finite, `attempts` is zero, or the region has an
/// empty or non-finite bounding box.
#[must_use = "returns the generated point set"]
pub fn generate_points<R: Rng + ?Sized>(
    region: &Region,
    start: Point,
    end: Point,
    min_radius: f64,
    attempts: u32,
    rng: &mut R,
) -> PointSet {
    let Some((min, max)) = region.bounding_box() else {
        return PointSet::new(Vec::new(), start, end);
    };
    if !(2.0 * min_radius).is_finite() || min_radius <= 0.0 || attempts == 0 {
        return PointSet::new(Vec::new(), start, end);
    }

    let footprint = Footprint::new(region);
    let radius_sq = min_radius * min_radius;
    let interior: Vec<Point> = poisson_disk(min, max, min_radius, attempts, rng)
        .into_iter()
        .filter(|&p| {
            footprint.contains(p)
                && p.distance_squared(start) >= radius_sq
                && p.distance_squared(end) >= radius_sq
        })
        .collect();

    log::debug!(
        "sampled {} interior points (min_radius={min_radius})",
        interior.len()
    );
    PointSet::new(interior, start, end)
}

/// Bridson's Poisson-disk sampling over the box `[min, max]`.
///
/// Every returned pair of points is at least `radius` apart.
fn poisson_disk<R: Rng + ?Sized>(
    min: Point,
    max: Point,
    radius: f64,
    attempts: u32,
    rng: &mut R,
) -> Vec<Point> {
    let (width, height) = (max.x - min.x, max.y - min.y);
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    let radius_sq = radius * radius;
    let inside_box = |p: Point| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y;

    let first = Point::new(
        rng.gen_range(min.x..=max.x),
        rng.gen_range(min.y..=max.y),
    );
    let mut points = vec![first];
    let mut active = vec![0_usize];
    let mut tree: RTree<[f64; 2]> = RTree::new();
    tree.insert([first.x, first.y]);

    while !active.is_empty() {
        let slot = rng.gen_range(0..active.len());
        let base = points[active[slot]];

        let mut accepted = None;
        for _ in 0..attempts {
            let angle = rng.gen_range(0.0..TAU);
            let dist = rng.gen_range(radius..2.0 * radius);
            let candidate = Point::new(
                dist.mul_add(angle.cos(), base.x),
                dist.mul_add(angle.sin(), base.y),
            );
            if !inside_box(candidate) {
                continue;
            }
            // Strictly-closer neighbours only: a point exactly `radius`
            // away is acceptable.
            let crowded = tree
                .locate_within_distance([candidate.x, candidate.y], radius_sq)
                .any(|q| candidate.distance_squared(Point::new(q[0], q[1])) < radius_sq);
            if !crowded {
                accepted = Some(candidate);
                break;
            }
        }

        if let Some(candidate) = accepted {
            active.push(points.len());
            points.push(candidate);
            tree.insert([candidate.x, candidate.y]);
        } else {
            active.swap_remove(slot);
        }
    }

    points
}
