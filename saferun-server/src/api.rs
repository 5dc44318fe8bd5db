//! HTTP routes and handlers

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use saferun_core::routing::routes_to_geojson;
use saferun_core::{Error as CoreError, find_circular_routes, format_routes};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::AppState;
use crate::store::{CrewPostId, Favorite, SelectedRoute, StoredRoute};

/// Error returned by every handler, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Missing or invalid parameters: {}", rejection.body_text()))
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NodeNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::InvalidDistance(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                warn!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Routes behind a timeout of `state.request_timeout`.
///
/// A timed-out request answers 408 at once; its blocking search stops at the
/// same deadline on its next attempt.
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/routes/recommend", post(recommend_routes))
        .route("/api/routes/{route_id}", get(get_route))
        .route("/api/routes/{route_id}/geojson", get(get_route_geojson))
        .route("/api/favorites", post(add_favorite).get(list_favorites))
        .route("/api/selected-route", post(select_route))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Unhandled internal error: {err}") })),
        )
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "nodes": state.graph.node_count(),
        "edges": state.graph.edge_count(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// `[lat, lon]`
    pub start_point: [f64; 2],
    pub distance_km: f64,
    pub pace_min_per_km: f64,
}

impl RecommendRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let [lat, lon] = self.start_point;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ApiError::BadRequest("start_point must be [lat, lon]".into()));
        }
        if !self.distance_km.is_finite() || self.distance_km <= 0.0 {
            return Err(ApiError::BadRequest("distance_km must be positive".into()));
        }
        if !self.pace_min_per_km.is_finite() || self.pace_min_per_km <= 0.0 {
            return Err(ApiError::BadRequest("pace_min_per_km must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub routes: Vec<StoredRoute>,
}

async fn recommend_routes(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let [lat, lon] = request.start_point;
    let distance_km = request.distance_km;
    let graph = state.graph.clone();
    let options = state.search_options();
    let mut rng = state.rng();

    let records = tokio::task::spawn_blocking(move || {
        let start = graph.nearest_node(lat, lon).ok_or_else(|| {
            CoreError::NodeNotFound(format!("no road node near ({lat}, {lon})"))
        })?;
        let found = find_circular_routes(&graph, start, distance_km, &options, &mut rng)?;
        Ok::<_, CoreError>(format_routes(&found))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Route search failed: {e}")))??;

    let routes: Vec<StoredRoute> = records
        .into_iter()
        .map(|record| state.store.insert_route(record, request.pace_min_per_km))
        .collect();

    info!(
        "Recommended {} routes for {distance_km} km near ({lat}, {lon})",
        routes.len()
    );
    Ok(Json(RecommendResponse { routes }))
}

fn stored_route(state: &AppState, route_id: &str) -> Result<StoredRoute, ApiError> {
    state
        .store
        .route(route_id)
        .ok_or_else(|| ApiError::NotFound(format!("Route not found: {route_id}")))
}

async fn get_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<StoredRoute>, ApiError> {
    stored_route(&state, &route_id).map(Json)
}

async fn get_route_geojson(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Response, ApiError> {
    let route = stored_route(&state, &route_id)?;
    let collection = routes_to_geojson(std::slice::from_ref(&route.record))?;
    Ok(Json(collection).into_response())
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub route_id: String,
    pub name: String,
}

async fn add_favorite(
    State(state): State<AppState>,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Favorite>), ApiError> {
    let Json(request) = payload?;
    if request.route_id.trim().is_empty() || request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing required parameters".into()));
    }

    let favorite = state
        .store
        .add_favorite(&request.route_id, &request.name)
        .ok_or_else(|| ApiError::NotFound(format!("Route not found: {}", request.route_id)))?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

async fn list_favorites(State(state): State<AppState>) -> Json<Vec<Favorite>> {
    Json(state.store.favorites())
}

#[derive(Debug, Deserialize)]
pub struct SelectRouteRequest {
    pub route_id: String,
    pub crew_post_id: CrewPostId,
}

async fn select_route(
    State(state): State<AppState>,
    payload: Result<Json<SelectRouteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SelectedRoute>), ApiError> {
    let Json(request) = payload?;
    if request.route_id.trim().is_empty() || request.crew_post_id.is_blank() {
        return Err(ApiError::BadRequest("Missing required parameters".into()));
    }

    let selected = state
        .store
        .select_route(&request.route_id, request.crew_post_id)
        .ok_or_else(|| ApiError::NotFound(format!("Route not found: {}", request.route_id)))?;
    Ok((StatusCode::CREATED, Json(selected)))
}
