use crate::error::{Result, TourError};
use crate::models::{Coordinates, Poi, PoiCategory};
use crate::providers::PoiSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Primary Overpass API endpoints with automatic rotation.
const OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
];

const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 30;

/// Overpass-backed POI source: queries OpenStreetMap for named places
/// inside a city's administrative area.
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoints: Vec<String>,
    current_endpoint_idx: Arc<AtomicUsize>,
}

impl OverpassClient {
    pub fn new() -> Self {
        let endpoints = OVERPASS_ENDPOINTS.iter().map(|s| s.to_string()).collect();
        OverpassClient {
            client: Client::new(),
            endpoints,
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_endpoints(endpoints: Vec<String>) -> Self {
        OverpassClient {
            client: Client::new(),
            endpoints,
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the next endpoint to try (round-robin)
    fn next_endpoint(&self) -> String {
        let idx = self.current_endpoint_idx.fetch_add(1, Ordering::Relaxed);
        self.endpoints[idx % self.endpoints.len()].clone()
    }

    /// Build an Overpass QL query selecting the requested categories inside
    /// the named city area.
    fn build_query(city: &str, categories: &[PoiCategory]) -> String {
        let escaped = city.replace('"', "");
        let selectors: Vec<String> = categories
            .iter()
            .map(|c| format!("nwr{}(area.city);", category_selector(c)))
            .collect();

        format!(
            "[out:json][timeout:{}];area[name=\"{}\"][boundary=administrative]->.city;({})out center tags;",
            OVERPASS_QUERY_TIMEOUT_SECONDS,
            escaped,
            selectors.join("")
        )
    }

    fn convert_elements(&self, elements: Vec<OverpassElement>) -> Vec<Poi> {
        let mut pois = Vec::new();

        for element in elements {
            let Some(tags) = element.tags else { continue };

            // Nodes carry lat/lon directly; ways and relations get a center.
            let (lat, lon) = match (element.lat, element.lon, element.center) {
                (Some(lat), Some(lon), _) => (lat, lon),
                (_, _, Some(center)) => (center.lat, center.lon),
                _ => continue,
            };

            let Ok(coordinates) = Coordinates::new(lat, lon) else {
                continue;
            };

            let Some(category) = classify(&tags) else {
                continue;
            };

            let name = tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| format!("Unnamed {}", category));

            let mut poi = Poi {
                id: Uuid::new_v4(),
                name,
                category,
                coordinates,
                description: tags.get("description").cloned(),
                address: build_address(&tags),
                wikipedia_ref: tags.get("wikipedia").cloned(),
                tags,
            };
            // Normalize: the id used for dedup upstream is the OSM element id.
            poi.tags
                .insert("osm_id".to_string(), element.id.to_string());

            pois.push(poi);
        }

        pois
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoiSource for OverpassClient {
    async fn fetch(&self, city: &str, categories: &[PoiCategory]) -> Result<Vec<Poi>> {
        let query = Self::build_query(city, categories);
        let endpoint = self.next_endpoint();

        tracing::debug!("Overpass query against {}: {}", endpoint, query);

        let response = self
            .client
            .post(&endpoint)
            .form(&[("data", query.as_str())])
            .timeout(std::time::Duration::from_secs(
                OVERPASS_QUERY_TIMEOUT_SECONDS + 5,
            ))
            .send()
            .await
            .map_err(|e| {
                TourError::ProviderUnavailable(format!("Overpass request failed: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TourError::RateLimited(
                "Overpass returned HTTP 429".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Overpass HTTP error {}: {}", status, body);
            return Err(TourError::ProviderUnavailable(format!(
                "Overpass HTTP {}: {}",
                status, body
            )));
        }

        let parsed: OverpassResponse = response.json().await.map_err(|e| {
            TourError::ProviderUnavailable(format!("Failed to parse Overpass response: {}", e))
        })?;

        let pois = self.convert_elements(parsed.elements);
        tracing::info!("Overpass returned {} POIs for '{}'", pois.len(), city);
        Ok(pois)
    }
}

/// OSM tag selector for a category.
fn category_selector(category: &PoiCategory) -> &'static str {
    match category {
        PoiCategory::Monument => "[historic=monument]",
        PoiCategory::Castle => "[historic=castle]",
        PoiCategory::Historic => "[historic=memorial]",
        PoiCategory::Museum => "[tourism=museum]",
        PoiCategory::Viewpoint => "[tourism=viewpoint]",
        PoiCategory::Theatre => "[amenity=theatre]",
        PoiCategory::Church => "[building=church]",
        PoiCategory::Bridge => "[man_made=bridge]",
        PoiCategory::Tower => "[man_made=tower]",
        PoiCategory::Plaza => "[place=square]",
        PoiCategory::Market => "[amenity=marketplace]",
        PoiCategory::Fountain => "[amenity=fountain]",
        PoiCategory::Artwork => "[tourism=artwork]",
        PoiCategory::Park => "[leisure=park]",
        PoiCategory::Waterfront => "[natural=beach]",
        PoiCategory::NatureReserve => "[leisure=nature_reserve]",
    }
}

/// Classify an element's tag map back into a category. First match wins in
/// the same order the selectors are issued.
fn classify(tags: &HashMap<String, String>) -> Option<PoiCategory> {
    let has = |k: &str, v: &str| tags.get(k).map(|t| t == v).unwrap_or(false);

    if has("historic", "castle") {
        Some(PoiCategory::Castle)
    } else if has("historic", "monument") {
        Some(PoiCategory::Monument)
    } else if has("historic", "memorial") {
        Some(PoiCategory::Historic)
    } else if has("tourism", "museum") {
        Some(PoiCategory::Museum)
    } else if has("tourism", "viewpoint") {
        Some(PoiCategory::Viewpoint)
    } else if has("amenity", "theatre") {
        Some(PoiCategory::Theatre)
    } else if has("building", "church") {
        Some(PoiCategory::Church)
    } else if has("man_made", "bridge") {
        Some(PoiCategory::Bridge)
    } else if has("man_made", "tower") {
        Some(PoiCategory::Tower)
    } else if has("place", "square") {
        Some(PoiCategory::Plaza)
    } else if has("amenity", "marketplace") {
        Some(PoiCategory::Market)
    } else if has("amenity", "fountain") {
        Some(PoiCategory::Fountain)
    } else if has("tourism", "artwork") {
        Some(PoiCategory::Artwork)
    } else if has("leisure", "park") {
        Some(PoiCategory::Park)
    } else if has("natural", "beach") {
        Some(PoiCategory::Waterfront)
    } else if has("leisure", "nature_reserve") {
        Some(PoiCategory::NatureReserve)
    } else {
        None
    }
}

fn build_address(tags: &HashMap<String, String>) -> Option<String> {
    let street = tags.get("addr:street")?;
    let number = tags.get("addr:housenumber");
    Some(match number {
        Some(n) => format!("{} {}", street, n),
        None => street.clone(),
    })
}

// Overpass API response types

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}
