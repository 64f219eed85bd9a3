use crate::error::{Result, TourError};
use crate::models::Coordinates;
use crate::providers::{DirectionsProvider, WalkingSegment};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const OSRM_BASE_URL: &str = "https://router.project-osrm.org";
const OSRM_REQUEST_TIMEOUT_SECONDS: u64 = 15;

/// OSRM-backed walking directions client.
#[derive(Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new() -> Self {
        Self::with_base_url(OSRM_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        OsrmClient {
            client: Client::new(),
            base_url,
        }
    }
}

impl Default for OsrmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectionsProvider for OsrmClient {
    async fn walking_segment(
        &self,
        from: &Coordinates,
        to: &Coordinates,
    ) -> Result<WalkingSegment> {
        // OSRM takes lng,lat pairs.
        let url = format!(
            "{}/route/v1/foot/{},{};{},{}",
            self.base_url, from.lng, from.lat, to.lng, to.lat
        );

        tracing::debug!(
            "OSRM request: ({:.4},{:.4}) -> ({:.4},{:.4})",
            from.lat,
            from.lng,
            to.lat,
            to.lng
        );

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "false"), ("steps", "false")])
            .timeout(std::time::Duration::from_secs(OSRM_REQUEST_TIMEOUT_SECONDS))
            .send()
            .await
            .map_err(|e| TourError::ProviderUnavailable(format!("OSRM request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TourError::RateLimited(
                "OSRM returned HTTP 429".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("OSRM HTTP error {}: {}", status, body);
            return Err(TourError::ProviderUnavailable(format!(
                "OSRM HTTP {}: {}",
                status, body
            )));
        }

        let parsed: OsrmRouteResponse = response.json().await.map_err(|e| {
            TourError::ProviderUnavailable(format!("Failed to parse OSRM response: {}", e))
        })?;

        let route = parsed.routes.first().ok_or_else(|| {
            TourError::LocationNotFound("No walking route found between stops".to_string())
        })?;

        tracing::debug!(
            "OSRM response: {:.0}m, {:.0}s",
            route.distance,
            route.duration
        );

        Ok(WalkingSegment {
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}

// OSRM API response types

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    routes: Vec<OsrmRoute>,
    #[allow(dead_code)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64, // meters
    duration: f64, // seconds
}
