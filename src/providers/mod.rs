pub mod nominatim;
pub mod osrm;
pub mod overpass;
pub mod rate_limit;

pub use nominatim::NominatimClient;
pub use osrm::OsrmClient;
pub use overpass::OverpassClient;
pub use rate_limit::RateLimiter;

use crate::error::Result;
use crate::models::{Coordinates, Poi, PoiCategory};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A resolved place name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// Distance and duration of one walking leg, as routed by the directions
/// provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkingSegment {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Resolves free-text queries to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Errors with [`TourError::LocationNotFound`](crate::TourError) when the
    /// query matches nothing.
    async fn resolve(&self, query: &str) -> Result<GeocodedLocation>;
}

/// Computes walking directions between two points.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Errors are classified as `RateLimited` (retryable), `LocationNotFound`
    /// (no walking route exists) or `ProviderUnavailable` (network/5xx).
    async fn walking_segment(
        &self,
        from: &Coordinates,
        to: &Coordinates,
    ) -> Result<WalkingSegment>;
}

/// Discovers POIs for a city or area.
#[async_trait]
pub trait PoiSource: Send + Sync {
    async fn fetch(&self, city: &str, categories: &[PoiCategory]) -> Result<Vec<Poi>>;
}
