//! Route diversification: penalize one edge of each accepted route.
//!
//! After a route is accepted, one of its edges is chosen uniformly at
//! random and its cost is raised by a large fixed amount. Later shortest
//! path searches then avoid that edge unless it is the only connection
//! left, which spreads successive routes across the map.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::types::{GenerationError, Path};

/// One applied penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    /// Earlier endpoint along the route.
    pub from: usize,
    /// Later endpoint along the route.
    pub to: usize,
    /// Edge cost after the increase.
    pub cost: u64,
}

/// Raise the cost of one randomly chosen edge of `path` by `amount`.
///
/// Paths with fewer than two indices have no edge to penalize; they leave
/// the graph untouched and return `Ok(None)`.
///
/// # Errors
///
/// Returns [`GenerationError::MissingEdge`] or
/// [`GenerationError::VertexOutOfRange`] if `path` does not follow edges of
/// `graph`.
pub fn penalize_random_edge<R: Rng + ?Sized>(
    graph: &mut Graph,
    path: &Path,
    amount: u64,
    rng: &mut R,
) -> Result<Option<Penalty>, GenerationError> {
    let indices = path.indices();
    if indices.len() < 2 {
        return Ok(None);
    }
    let i = rng.gen_range(0..indices.len() - 1);
    let (from, to) = (indices[i], indices[i + 1]);
    let cost = graph.increase_cost(from, to, amount)?;
    log::debug!("penalized edge {from}-{to}, cost now {cost}");
    Ok(Some(Penalty { from, to, cost }))
}
