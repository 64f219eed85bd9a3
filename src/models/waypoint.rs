use crate::models::{Coordinates, Poi, PoiCategory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A routing-level stop: the start, a POI, or a custom endpoint. Created per
/// route-generation request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PoiCategory>,
}

impl Waypoint {
    /// Synthesize a waypoint for a start or custom-endpoint location.
    pub fn synthesized(name: String, coordinates: Coordinates) -> Self {
        Waypoint {
            name,
            coordinates,
            address: None,
            category: None,
        }
    }

    /// Dwell time this stop contributes to the visit-time estimate.
    /// Synthesized stops (start, custom endpoint) contribute nothing.
    pub fn visit_minutes(&self) -> u32 {
        self.category.map(|c| c.visit_minutes()).unwrap_or(0)
    }
}

impl From<&Poi> for Waypoint {
    fn from(poi: &Poi) -> Self {
        Waypoint {
            name: poi.name.clone(),
            coordinates: poi.coordinates,
            address: poi.address.clone(),
            category: Some(poi.category),
        }
    }
}

/// Where the tour ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum EndpointPolicy {
    /// Return to the start point.
    #[default]
    RoundTrip,
    /// End at the final POI.
    LastPlace,
    /// End at a separately resolved named location.
    Custom(String),
}

impl fmt::Display for EndpointPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointPolicy::RoundTrip => write!(f, "round_trip"),
            EndpointPolicy::LastPlace => write!(f, "last_place"),
            EndpointPolicy::Custom(name) => write!(f, "custom ({})", name),
        }
    }
}

/// How the caller identifies the tour's starting location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StartPoint {
    /// Free-text query resolved through the geocoder.
    Address(String),
    /// Already-known coordinate; no geocoding needed.
    Coordinate(Coordinates),
}

/// Requested route length, which bounds how far from the start POIs may be.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteLengthClass {
    Short,
    #[default]
    Medium,
    Long,
}

impl RouteLengthClass {
    /// Step function: maximum POI distance from the start for this class.
    pub fn max_poi_distance_km(&self) -> f64 {
        match self {
            RouteLengthClass::Short => crate::constants::MAX_POI_DISTANCE_SHORT_KM,
            RouteLengthClass::Medium => crate::constants::MAX_POI_DISTANCE_MEDIUM_KM,
            RouteLengthClass::Long => crate::constants::MAX_POI_DISTANCE_LONG_KM,
        }
    }
}

impl FromStr for RouteLengthClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(RouteLengthClass::Short),
            "medium" => Ok(RouteLengthClass::Medium),
            "long" => Ok(RouteLengthClass::Long),
            _ => Err(format!("Invalid route length class: '{}'", s)),
        }
    }
}
