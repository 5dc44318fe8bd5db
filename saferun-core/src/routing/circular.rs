//! Randomized search for there-and-back routes of a requested length.
//!
//! Every attempt samples a far-end node uniformly from the whole graph, then
//! runs one weighted shortest path per still-missing category from the start
//! to that node. The path followed by its own reverse is accepted when its
//! physical length falls inside the tolerance window and no other category
//! already holds the identical walk. The first acceptable walk per category
//! wins; there is no optimization among valid candidates.

use std::time::Instant;

use log::{debug, info, trace, warn};
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::cost::RouteCategory;
use super::dijkstra::shortest_path;
use super::route::{Route, there_and_back};
use crate::model::SafetyGraph;
use crate::{DEFAULT_DISTANCE_TOLERANCE, DEFAULT_MAX_ATTEMPTS, Error};

/// Tuning knobs of the retry loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Upper bound on sampled far-end nodes
    pub max_attempts: usize,
    /// Accepted relative deviation from the requested length
    pub tolerance: f64,
    /// Stop sampling once this instant has passed; checked before every attempt
    pub deadline: Option<Instant>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tolerance: DEFAULT_DISTANCE_TOLERANCE,
            deadline: None,
        }
    }
}

/// Routes found by one search call; categories that never qualified are `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircularRoutes {
    pub safe: Option<Route>,
    pub shortest: Option<Route>,
    pub balanced: Option<Route>,
    /// Number of far-end samples drawn
    pub attempts: usize,
}

impl CircularRoutes {
    pub fn get(&self, category: RouteCategory) -> Option<&Route> {
        match category {
            RouteCategory::Safe => self.safe.as_ref(),
            RouteCategory::Shortest => self.shortest.as_ref(),
            RouteCategory::Balanced => self.balanced.as_ref(),
        }
    }

    fn slot_mut(&mut self, category: RouteCategory) -> &mut Option<Route> {
        match category {
            RouteCategory::Safe => &mut self.safe,
            RouteCategory::Shortest => &mut self.shortest,
            RouteCategory::Balanced => &mut self.balanced,
        }
    }

    /// Found routes in category order
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        RouteCategory::ALL
            .into_iter()
            .filter_map(|category| self.get(category))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All three categories are filled
    pub fn is_complete(&self) -> bool {
        self.len() == RouteCategory::ALL.len()
    }
}

/// Searches up to three distinct there-and-back routes of roughly
/// `desired_distance_km` starting and ending at `start`.
///
/// Returning fewer than three routes, or none, is a normal outcome.
///
/// # Errors
///
/// [`Error::NodeNotFound`] if `start` is not in the graph,
/// [`Error::InvalidDistance`] if the distance is not a positive number.
pub fn find_circular_routes<R: Rng + ?Sized>(
    graph: &SafetyGraph,
    start: NodeIndex,
    desired_distance_km: f64,
    options: &SearchOptions,
    rng: &mut R,
) -> Result<CircularRoutes, Error> {
    if !graph.contains(start) {
        return Err(Error::NodeNotFound(format!("node index {}", start.index())));
    }
    if !desired_distance_km.is_finite() || desired_distance_km <= 0.0 {
        return Err(Error::InvalidDistance(desired_distance_km));
    }

    let target_m = desired_distance_km * 1000.0;
    let window_m = options.tolerance * target_m;
    let node_count = graph.node_count();
    let mut found = CircularRoutes::default();

    while found.attempts < options.max_attempts && !found.is_complete() {
        if options.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!(
                "Circular search from {} stopped at its deadline after {} attempts",
                graph.graph[start].id, found.attempts
            );
            break;
        }
        found.attempts += 1;
        let far_end = NodeIndex::new(rng.random_range(0..node_count));

        for category in RouteCategory::ALL {
            if found.get(category).is_some() {
                continue;
            }

            let Some(path) =
                shortest_path(graph, start, far_end, |edge| category.edge_cost(graph, edge))
            else {
                trace!(
                    "Attempt {}: no {category} path to {}",
                    found.attempts, graph.graph[far_end].id
                );
                continue;
            };

            let walk = there_and_back(&path);
            let length_m = graph.walk_length(&walk);
            if (length_m - target_m).abs() >= window_m {
                continue;
            }
            if found.iter().any(|route| route.nodes == walk) {
                trace!(
                    "Attempt {}: {category} walk duplicates an accepted route",
                    found.attempts
                );
                continue;
            }

            debug!(
                "Attempt {}: accepted {category} route via {} ({length_m:.0} m, {} nodes)",
                found.attempts,
                graph.graph[far_end].id,
                walk.len()
            );
            *found.slot_mut(category) = Some(Route::from_walk(graph, category, walk, length_m));
        }
    }

    info!(
        "Circular search from {} for {desired_distance_km} km: {} of {} routes after {} attempts",
        graph.graph[start].id,
        found.len(),
        RouteCategory::ALL.len(),
        found.attempts
    );
    Ok(found)
}

/// Runs independent searches for many start nodes in parallel.
///
/// Search `i` uses a `StdRng` seeded with `seed + i`, so results are
/// reproducible and come back in input order.
pub fn find_circular_routes_batch(
    graph: &SafetyGraph,
    starts: &[NodeIndex],
    desired_distance_km: f64,
    options: &SearchOptions,
    seed: u64,
) -> Vec<Result<CircularRoutes, Error>> {
    starts
        .par_iter()
        .enumerate()
        .map(|(i, &start)| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            find_circular_routes(graph, start, desired_distance_km, options, &mut rng)
        })
        .collect()
}
