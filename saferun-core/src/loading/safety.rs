//! Per-node safety dataset (CSV) and score normalization

use std::io::Read;
use std::path::Path;

use geo::Point;
use serde::Deserialize;

use crate::Error;

/// Upper bound of the normalized safety scale
pub const MAX_SAFETY_SCORE: f64 = 100.0;

/// Raw CSV row: `osmid,safety_score,x,y` (x = lon, y = lat)
#[derive(Debug, Deserialize)]
struct FeedSafetyRow {
    osmid: String,
    #[serde(default)]
    safety_score: Option<f64>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
}

/// Safety record keyed by node id
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyRecord {
    pub id: String,
    /// Score in source units, 0 when the cell was empty
    pub raw: f64,
    pub location: Option<Point<f64>>,
}

impl TryFrom<FeedSafetyRow> for SafetyRecord {
    type Error = String;

    fn try_from(row: FeedSafetyRow) -> Result<Self, Self::Error> {
        let raw = row.safety_score.unwrap_or(0.0);
        if !raw.is_finite() {
            return Err(format!("non-finite safety score for node {}", row.osmid));
        }

        let location = match (row.x, row.y) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
                Some(Point::new(lon, lat))
            }
            _ => None,
        };

        Ok(Self {
            id: row.osmid.trim().to_string(),
            raw,
            location,
        })
    }
}

/// Reads safety records from any CSV reader with a header row
pub fn read_safety_records<R: Read>(reader: R) -> Result<Vec<SafetyRecord>, Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (row_idx, row) in reader.deserialize::<FeedSafetyRow>().enumerate() {
        // header is line 1
        let line = row_idx + 2;
        let row = row.map_err(|e| Error::GraphLoad(format!("line {line}: {e}")))?;
        let record =
            SafetyRecord::try_from(row).map_err(|e| Error::GraphLoad(format!("line {line}: {e}")))?;
        records.push(record);
    }

    Ok(records)
}

/// Reads the safety dataset from disk
///
/// # Errors
///
/// Returns [`Error::GraphLoad`] if the file cannot be opened or any row is malformed
pub fn load_safety_records(path: &Path) -> Result<Vec<SafetyRecord>, Error> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::GraphLoad(format!(
            "Failed to open safety dataset '{}': {e}",
            path.display()
        ))
    })?;

    read_safety_records(file).map_err(|e| {
        Error::GraphLoad(format!(
            "Failed to read safety dataset '{}': {e}",
            path.display()
        ))
    })
}

/// Scales raw scores linearly so that the dataset maximum maps to 100.
///
/// When the maximum is not positive every score becomes 0. Negative raw
/// values are clamped into the `0..=100` range.
pub fn normalize_scores(records: &[SafetyRecord]) -> Vec<f64> {
    let max_score = records
        .iter()
        .map(|r| r.raw)
        .fold(f64::NEG_INFINITY, f64::max);

    if max_score > 0.0 {
        records
            .iter()
            .map(|r| (r.raw / max_score * MAX_SAFETY_SCORE).clamp(0.0, MAX_SAFETY_SCORE))
            .collect()
    } else {
        vec![0.0; records.len()]
    }
}
