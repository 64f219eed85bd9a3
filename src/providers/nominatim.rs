use crate::error::{Result, TourError};
use crate::models::Coordinates;
use crate::providers::{GeocodedLocation, Geocoder};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const NOMINATIM_REQUEST_TIMEOUT_SECONDS: u64 = 15;
// Nominatim's usage policy requires an identifying user agent.
const NOMINATIM_USER_AGENT: &str = concat!("strollplan/", env!("CARGO_PKG_VERSION"));

/// Nominatim-backed geocoder.
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new() -> Self {
        Self::with_base_url(NOMINATIM_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        NominatimClient {
            client: Client::new(),
            base_url,
        }
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn resolve(&self, query: &str) -> Result<GeocodedLocation> {
        let url = format!("{}/search", self.base_url);

        tracing::debug!("Nominatim query: {}", query);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", NOMINATIM_USER_AGENT)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .timeout(std::time::Duration::from_secs(
                NOMINATIM_REQUEST_TIMEOUT_SECONDS,
            ))
            .send()
            .await
            .map_err(|e| {
                TourError::ProviderUnavailable(format!("Nominatim request failed: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TourError::RateLimited(
                "Nominatim returned HTTP 429".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(TourError::ProviderUnavailable(format!(
                "Nominatim HTTP {}",
                status
            )));
        }

        let results: Vec<NominatimResult> = response.json().await.map_err(|e| {
            TourError::ProviderUnavailable(format!("Failed to parse Nominatim response: {}", e))
        })?;

        let hit = results
            .into_iter()
            .next()
            .ok_or_else(|| TourError::LocationNotFound(format!("'{}' matched no place", query)))?;

        let lat: f64 = hit.lat.parse().map_err(|_| {
            TourError::ProviderUnavailable(format!("Nominatim returned bad latitude: {}", hit.lat))
        })?;
        let lon: f64 = hit.lon.parse().map_err(|_| {
            TourError::ProviderUnavailable(format!("Nominatim returned bad longitude: {}", hit.lon))
        })?;

        let coordinates = Coordinates::new(lat, lon)
            .map_err(TourError::ProviderUnavailable)?;

        tracing::debug!(
            "Nominatim resolved '{}' -> ({:.4},{:.4}) {}",
            query,
            lat,
            lon,
            hit.display_name
        );

        Ok(GeocodedLocation {
            coordinates,
            display_name: hit.display_name,
        })
    }
}

// Nominatim API response types (coordinates arrive as strings)

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let json = r#"[{"lat":"49.4538501","lon":"11.0772914","display_name":"Nürnberg, Bayern, Deutschland"}]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].lat, "49.4538501");
        assert!(results[0].display_name.starts_with("Nürnberg"));
    }

    #[test]
    fn test_user_agent_identifies_crate() {
        assert!(NOMINATIM_USER_AGENT.starts_with("strollplan/"));
    }
}
