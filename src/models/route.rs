use crate::models::{Coordinates, EndpointPolicy, PoiCategory, RouteLengthClass, StartPoint, Waypoint};
use serde::{Deserialize, Serialize};

/// The walking connection between two consecutive waypoints, as routed by
/// the directions provider (not straight-line).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteSegment {
    pub from: Coordinates,
    pub to: Coordinates,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteSegment {
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}

/// A fully assembled tour. `segments.len() == waypoints.len() - 1` holds for
/// every route with at least two waypoints; `waypoints[0]` is the start and
/// the last waypoint is the resolved endpoint per the chosen policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedRoute {
    pub waypoints: Vec<Waypoint>,
    pub segments: Vec<RouteSegment>,
    pub total_distance_meters: f64,
    pub total_walking_seconds: f64,
    /// Sum of per-category dwell-time estimates across POI stops.
    pub estimated_visit_minutes: u32,
    /// Walking time plus visit time.
    pub total_experience_minutes: u32,
}

impl GeneratedRoute {
    pub fn assemble(waypoints: Vec<Waypoint>, segments: Vec<RouteSegment>) -> Self {
        let total_distance_meters = segments.iter().map(|s| s.distance_meters).sum();
        let total_walking_seconds: f64 = segments.iter().map(|s| s.duration_seconds).sum();
        let estimated_visit_minutes = waypoints.iter().map(|w| w.visit_minutes()).sum();
        let total_experience_minutes =
            (total_walking_seconds / 60.0).round() as u32 + estimated_visit_minutes;

        GeneratedRoute {
            waypoints,
            segments,
            total_distance_meters,
            total_walking_seconds,
            estimated_visit_minutes,
            total_experience_minutes,
        }
    }

    pub fn walking_minutes(&self) -> f64 {
        self.total_walking_seconds / 60.0
    }

    /// Number of POI stops, excluding the synthesized start/end waypoints.
    pub fn stop_count(&self) -> usize {
        self.waypoints.iter().filter(|w| w.category.is_some()).count()
    }
}

/// Everything the orchestrator needs to plan one tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourRequest {
    pub start: StartPoint,
    /// City whose POI pool backs the tour; also the POI cache key.
    pub city: String,
    pub max_stops: usize,
    #[serde(default)]
    pub endpoint: EndpointPolicy,
    #[serde(default)]
    pub length_class: RouteLengthClass,
    /// Restrict the pool to these categories. `None` means all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<PoiCategory>>,
    /// Walking-time budget. `None` disables constraint validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_walking_minutes: Option<u32>,
    /// Minimum spacing between consecutive stops. `None` disables the filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stop_spacing_meters: Option<f64>,
}

impl TourRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_stops == 0 {
            return Err("max_stops must be at least 1".to_string());
        }
        if self.max_stops > crate::constants::MAX_STOPS_CLAMP {
            return Err(format!(
                "max_stops must be at most {}",
                crate::constants::MAX_STOPS_CLAMP
            ));
        }
        if self.city.trim().is_empty() {
            return Err("city must not be empty".to_string());
        }
        if let Some(minutes) = self.max_walking_minutes {
            if minutes == 0 {
                return Err("max_walking_minutes must be positive when set".to_string());
            }
        }
        if let Some(spacing) = self.min_stop_spacing_meters {
            if spacing < 0.0 {
                return Err("min_stop_spacing_meters must not be negative".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn wp(name: &str, lat: f64, lng: f64) -> Waypoint {
        Waypoint::synthesized(name.to_string(), Coordinates::new(lat, lng).unwrap())
    }

    fn seg(from: &Waypoint, to: &Waypoint, meters: f64, seconds: f64) -> RouteSegment {
        RouteSegment {
            from: from.coordinates,
            to: to.coordinates,
            distance_meters: meters,
            duration_seconds: seconds,
        }
    }

    #[test]
    fn test_route_aggregates() {
        let a = wp("A", 49.4521, 11.0767);
        let b = wp("B", 49.4600, 11.0800);
        let c = wp("C", 49.4521, 11.0767);
        let segments = vec![seg(&a, &b, 900.0, 720.0), seg(&b, &c, 900.0, 720.0)];

        let route = GeneratedRoute::assemble(vec![a, b, c], segments);
        assert_eq!(route.total_distance_meters, 1800.0);
        assert_eq!(route.total_walking_seconds, 1440.0);
        assert_eq!(route.walking_minutes(), 24.0);
        // No categories on synthesized waypoints: visit time is zero.
        assert_eq!(route.estimated_visit_minutes, 0);
        assert_eq!(route.total_experience_minutes, 24);
        assert_eq!(route.segments.len(), route.waypoints.len() - 1);
    }

    #[test]
    fn test_request_validation() {
        let mut req = TourRequest {
            start: StartPoint::Coordinate(Coordinates::new(49.4521, 11.0767).unwrap()),
            city: "Nürnberg".to_string(),
            max_stops: 5,
            endpoint: EndpointPolicy::RoundTrip,
            length_class: RouteLengthClass::Medium,
            categories: None,
            max_walking_minutes: Some(90),
            min_stop_spacing_meters: None,
        };
        assert!(req.validate().is_ok());

        req.max_stops = 0;
        assert!(req.validate().is_err());

        req.max_stops = 100;
        assert!(req.validate().is_err());

        req.max_stops = 5;
        req.city = "  ".to_string();
        assert!(req.validate().is_err());
    }
}
