//! Normalized route and vehicle records handed to callers.

use serde::{Deserialize, Serialize};

/// A route as published by the upstream route list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub route_number: String,
    pub route_name: String,
    pub route_color: String,
    /// Secondary descriptor, passed through verbatim.
    pub rtdd: String,
}

/// One vehicle position report. Tracking fields are opaque to this crate and
/// are preserved exactly as the upstream sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub vehicle_id: String,
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
    pub heading: String,
    pub pattern_id: String,
    pub pattern_distance: String,
    pub route: String,
    pub destination: String,
    pub delayed: bool,
    pub tablock_id: String,
    pub trip_id: String,
    pub origin_trip_no: String,
    pub zone: String,
}
