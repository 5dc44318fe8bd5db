//! In-memory records kept between requests: recommended routes and
//! favorites. Recommended routes are bounded; once the capacity is reached
//! the oldest route is evicted. Crew post selections are returned to the
//! caller and not retained.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use saferun_core::RouteCategory;
use saferun_core::routing::{RouteRecord, round2};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::DEFAULT_MAX_ROUTES;

/// A recommended route under its public id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRoute {
    pub route_id: String,
    #[serde(flatten)]
    pub record: RouteRecord,
    pub estimated_time_min: f64,
    pub created_at: DateTime<Utc>,
}

impl StoredRoute {
    /// Pace implied by the stored estimate, 0 for a zero-length route
    pub fn pace_min_per_km(&self) -> f64 {
        if self.record.distance_km > 0.0 {
            self.estimated_time_min / self.record.distance_km
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub favorite_id: String,
    pub route_id: String,
    pub name: String,
    pub distance_km: f64,
    pub category: RouteCategory,
    pub safety_score: f64,
    pub estimated_time_min: f64,
    pub pace_min_per_km: f64,
    pub created_at: DateTime<Utc>,
}

/// Crew post reference; clients send either a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrewPostId {
    Int(i64),
    Str(String),
}

impl CrewPostId {
    pub fn is_blank(&self) -> bool {
        matches!(self, CrewPostId::Str(s) if s.trim().is_empty())
    }
}

impl fmt::Display for CrewPostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewPostId::Int(id) => write!(f, "{id}"),
            CrewPostId::Str(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedRoute {
    pub selected_route_id: String,
    pub route_id: String,
    pub crew_post_id: CrewPostId,
    pub distance_km: f64,
    pub pace_min_per_km: f64,
    pub safety_score: f64,
    pub selected_at: DateTime<Utc>,
}

/// Routes by id plus their ids in insertion order
#[derive(Debug, Default)]
struct RouteTable {
    by_id: HashMap<String, StoredRoute>,
    order: VecDeque<String>,
}

/// Thread-safe record store shared by all handlers
#[derive(Debug)]
pub struct RouteStore {
    routes: RwLock<RouteTable>,
    favorites: RwLock<Vec<Favorite>>,
    max_routes: usize,
}

impl Default for RouteStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ROUTES)
    }
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store keeping at most `max_routes` recommended routes (at least one)
    pub fn with_capacity(max_routes: usize) -> Self {
        Self {
            routes: RwLock::new(RouteTable::default()),
            favorites: RwLock::new(Vec::new()),
            max_routes: max_routes.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_routes
    }

    /// Stores a freshly recommended route, deriving its time estimate from `pace`
    pub fn insert_route(&self, record: RouteRecord, pace_min_per_km: f64) -> StoredRoute {
        let route = StoredRoute {
            route_id: Uuid::new_v4().to_string(),
            estimated_time_min: round2(record.distance_km * pace_min_per_km),
            record,
            created_at: Utc::now(),
        };

        let mut table = self.routes.write();
        while table.order.len() >= self.max_routes {
            let Some(oldest) = table.order.pop_front() else {
                break;
            };
            table.by_id.remove(&oldest);
            debug!("Evicted route {oldest}");
        }
        table.order.push_back(route.route_id.clone());
        table.by_id.insert(route.route_id.clone(), route.clone());
        route
    }

    pub fn route(&self, route_id: &str) -> Option<StoredRoute> {
        self.routes.read().by_id.get(route_id).cloned()
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().by_id.len()
    }

    /// Saves a stored route as a favorite; `None` if the route is unknown
    pub fn add_favorite(&self, route_id: &str, name: &str) -> Option<Favorite> {
        let route = self.route(route_id)?;
        let favorite = Favorite {
            favorite_id: Uuid::new_v4().to_string(),
            route_id: route.route_id.clone(),
            name: name.to_string(),
            distance_km: route.record.distance_km,
            category: route.record.category,
            safety_score: route.record.safety_score,
            estimated_time_min: route.estimated_time_min,
            pace_min_per_km: route.pace_min_per_km(),
            created_at: Utc::now(),
        };
        self.favorites.write().push(favorite.clone());
        Some(favorite)
    }

    /// Favorites in insertion order
    pub fn favorites(&self) -> Vec<Favorite> {
        self.favorites.read().clone()
    }

    /// Builds the crew post attachment for a stored route; `None` if the route is unknown
    pub fn select_route(&self, route_id: &str, crew_post_id: CrewPostId) -> Option<SelectedRoute> {
        let route = self.route(route_id)?;
        Some(SelectedRoute {
            selected_route_id: Uuid::new_v4().to_string(),
            route_id: route.route_id.clone(),
            crew_post_id,
            distance_km: route.record.distance_km,
            pace_min_per_km: route.pace_min_per_km(),
            safety_score: route.record.safety_score,
            selected_at: Utc::now(),
        })
    }
}
