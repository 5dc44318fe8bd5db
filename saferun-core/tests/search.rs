mod common;

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use saferun_core::prelude::*;
use tempfile::tempdir;

use common::{grid_id, load_grid};

#[test]
fn grid_routes_hold_route_invariants() {
    let dir = tempdir().unwrap();
    let graph = load_grid(dir.path(), 6);
    let start = graph.resolve(&grid_id(6, 0, 0).to_string()).unwrap();
    let desired_km = 1.2;

    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let found =
            find_circular_routes(&graph, start, desired_km, &SearchOptions::default(), &mut rng)
                .unwrap();
        assert!(!found.is_empty(), "seed {seed} found nothing");
        assert!(found.attempts <= DEFAULT_MAX_ATTEMPTS);

        let mut sequences = HashSet::new();
        for route in found.iter() {
            let target_m = desired_km * 1000.0;
            assert!((route.length_m - target_m).abs() < DEFAULT_DISTANCE_TOLERANCE * target_m);
            assert!(route.is_closed());
            assert_eq!(route.nodes[0], start);
            assert_eq!(route.waypoints.first(), route.waypoints.last());
            assert!((0.0..=100.0).contains(&route.average_safety_score));
            assert_eq!(route.nodes.len(), route.waypoints.len());
            assert!(sequences.insert(route.nodes.clone()), "duplicate walk");
        }
    }
}

#[test]
fn records_and_geojson_follow_routes() {
    let dir = tempdir().unwrap();
    let graph = load_grid(dir.path(), 6);
    let start = graph.resolve(&grid_id(6, 5, 0).to_string()).unwrap();

    let found = find_circular_routes(
        &graph,
        start,
        1.0,
        &SearchOptions::default(),
        &mut StdRng::seed_from_u64(11),
    )
    .unwrap();
    let records = format_routes(&found);
    assert_eq!(records.len(), found.len());

    let order: Vec<_> = records.iter().map(|r| r.category).collect();
    let expected: Vec<_> = found.iter().map(|r| r.category).collect();
    assert_eq!(order, expected);

    for record in &records {
        assert_eq!(record.distance_km, (record.distance_km * 100.0).round() / 100.0);
        assert_eq!(record.waypoints[0].lat_lon(), graph.graph[start].lat_lon());
    }

    let collection = routes_to_geojson(&records).unwrap();
    // one line per route and the start marker
    assert_eq!(collection.features.len(), records.len() + 1);
}

#[test]
fn batch_search_keeps_input_order() {
    let dir = tempdir().unwrap();
    let graph = load_grid(dir.path(), 5);
    let starts: Vec<_> = [(0, 0), (4, 4), (2, 2), (0, 4)]
        .into_iter()
        .map(|(r, c)| graph.resolve(&grid_id(5, r, c).to_string()).unwrap())
        .collect();
    let options = SearchOptions {
        max_attempts: 300,
        ..SearchOptions::default()
    };

    let first = find_circular_routes_batch(&graph, &starts, 0.8, &options, 99);
    let second = find_circular_routes_batch(&graph, &starts, 0.8, &options, 99);
    assert_eq!(first.len(), starts.len());

    for ((a, b), &start) in first.into_iter().zip(second).zip(&starts) {
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a, b);
        for route in a.iter() {
            assert_eq!(route.nodes[0], start);
        }
    }
}

#[test]
fn batch_reports_bad_starts_individually() {
    let dir = tempdir().unwrap();
    let graph = load_grid(dir.path(), 3);
    let good = graph.resolve(&grid_id(3, 1, 1).to_string()).unwrap();
    let bad = petgraph::graph::NodeIndex::new(500);

    let results =
        find_circular_routes_batch(&graph, &[bad, good], 0.4, &SearchOptions::default(), 1);
    assert!(matches!(results[0], Err(Error::NodeNotFound(_))));
    assert!(results[1].is_ok());
}
