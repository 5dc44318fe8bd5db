use geo::{Coord, LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, GeometryValue};
use serde_json::json;

use super::cost::RouteCategory;
use super::format::RouteRecord;
use crate::Error;

/// Line color used on the map for each category
pub fn category_color(category: RouteCategory) -> &'static str {
    match category {
        RouteCategory::Safe => "green",
        RouteCategory::Shortest => "blue",
        RouteCategory::Balanced => "orange",
    }
}

/// Converts route records to a `GeoJSON` `FeatureCollection`: one `LineString`
/// per route plus a `Point` for the shared start and finish.
pub fn routes_to_geojson(records: &[RouteRecord]) -> Result<FeatureCollection, Error> {
    let mut features = Vec::with_capacity(records.len() + 1);

    for record in records {
        features.push(create_route_feature(record)?);
    }

    let start = records
        .iter()
        .find_map(|record| record.waypoints.iter().find_map(|w| w.lat_lon()));
    if let Some((lat, lon)) = start {
        features.push(create_start_feature(lat, lon)?);
    }

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn routes_to_geojson_string(records: &[RouteRecord]) -> Result<String, Error> {
    serde_json::to_string(&routes_to_geojson(records)?)
        .map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn create_route_feature(record: &RouteRecord) -> Result<Feature, Error> {
    // GeoJSON wants lon/lat
    let coords: Vec<Coord<f64>> = record
        .waypoints
        .iter()
        .filter_map(|w| w.lat_lon())
        .map(|(lat, lon)| Coord { x: lon, y: lat })
        .collect();

    let geometry = Geometry::new(GeometryValue::from(&LineString::new(coords)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "type": record.category,
            "distance_km": record.distance_km,
            "safety_score": record.safety_score,
            "color": category_color(record.category),
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn create_start_feature(lat: f64, lon: f64) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeometryValue::from(&Point::new(lon, lat)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "type": "start",
            "name": "Start/Finish",
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
