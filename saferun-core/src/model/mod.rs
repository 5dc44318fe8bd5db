//! Data model for safety-aware route planning
//!
//! Contains the road network annotated with safety scores.

pub mod components;
pub mod network;

pub use components::{RoadEdge, RoadNode};
pub use network::{IndexedPoint, SafetyGraph};
