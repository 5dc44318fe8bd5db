use serde::{Deserialize, Serialize};

use super::circular::CircularRoutes;
use super::cost::RouteCategory;
use super::route::{Route, Waypoint};

/// External shape of one recommended route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    #[serde(rename = "type")]
    pub category: RouteCategory,
    pub distance_km: f64,
    pub safety_score: f64,
    pub waypoints: Vec<Waypoint>,
}

/// Rounds to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<&Route> for RouteRecord {
    fn from(route: &Route) -> Self {
        Self {
            category: route.category,
            distance_km: round2(route.distance_km),
            safety_score: round2(route.average_safety_score),
            waypoints: route.waypoints.clone(),
        }
    }
}

/// Route records in safe, shortest, balanced order; missing categories are skipped
pub fn format_routes(routes: &CircularRoutes) -> Vec<RouteRecord> {
    routes.iter().map(RouteRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use petgraph::graph::NodeIndex;
    use serde_json::json;

    use super::*;

    fn route(category: RouteCategory, length_m: f64, score: f64) -> Route {
        Route {
            category,
            nodes: vec![NodeIndex::new(0), NodeIndex::new(1), NodeIndex::new(0)],
            node_ids: vec!["1".into(), "2".into(), "1".into()],
            length_m,
            distance_km: length_m / 1000.0,
            average_safety_score: score,
            waypoints: vec![
                Waypoint(Some(37.5), Some(127.0)),
                Waypoint(Some(37.501), Some(127.002)),
                Waypoint(Some(37.5), Some(127.0)),
            ],
        }
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(2.345_678), 2.35);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn keeps_category_order_and_skips_missing() {
        let routes = CircularRoutes {
            safe: None,
            shortest: Some(route(RouteCategory::Shortest, 4_812.4, 55.556)),
            balanced: Some(route(RouteCategory::Balanced, 5_190.0, 71.0)),
            attempts: 12,
        };

        let records = format_routes(&routes);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, RouteCategory::Shortest);
        assert_eq!(records[0].distance_km, 4.81);
        assert_eq!(records[0].safety_score, 55.56);
        assert_eq!(records[1].category, RouteCategory::Balanced);
    }

    #[test]
    fn serializes_wire_shape() {
        let record = RouteRecord::from(&route(RouteCategory::Safe, 1_000.0, 90.0));
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "type": "safe",
                "distance_km": 1.0,
                "safety_score": 90.0,
                "waypoints": [[37.5, 127.0], [37.501, 127.002], [37.5, 127.0]],
            })
        );
    }
}
