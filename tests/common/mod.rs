//! Shared fakes and builders for integration tests. The engine only talks
//! to providers through its trait seams, so everything here is in-process.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use strollplan::cache::{DiskCacheConfig, DiskCacheStore, SegmentCache};
use strollplan::providers::{
    DirectionsProvider, GeocodedLocation, Geocoder, PoiSource, RateLimiter, WalkingSegment,
};
use strollplan::services::poi_service::PoiService;
use strollplan::services::segments::{SegmentMode, SegmentPlanner};
use strollplan::services::selection::PoiSelector;
use strollplan::services::RouteGenerator;
use strollplan::{Coordinates, Poi, PoiCategory, Result, TourError};
use tempfile::TempDir;

pub const START_LAT: f64 = 49.4521;
pub const START_LNG: f64 = 11.0767;

pub fn start() -> Coordinates {
    Coordinates::new(START_LAT, START_LNG).unwrap()
}

/// Route tracing output through the usual env filter; safe to call from
/// every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "strollplan=debug".into()),
        )
        .try_init();
}

/// Table-driven geocoder: knows a couple of Nuremberg landmarks.
pub struct FakeGeocoder;

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve(&self, query: &str) -> Result<GeocodedLocation> {
        match query {
            "Hauptbahnhof" => Ok(GeocodedLocation {
                coordinates: Coordinates::new(49.4460, 11.0820).unwrap(),
                display_name: "Nürnberg Hauptbahnhof".to_string(),
            }),
            "Hauptmarkt" => Ok(GeocodedLocation {
                coordinates: Coordinates::new(49.4539, 11.0775).unwrap(),
                display_name: "Hauptmarkt".to_string(),
            }),
            other => Err(TourError::LocationNotFound(format!(
                "'{}' matched no place",
                other
            ))),
        }
    }
}

/// Straight-line distances with a street detour factor, ~5 km/h pace.
/// Counts provider calls so cache behavior is observable.
pub struct CrowFliesDirections {
    pub calls: AtomicUsize,
}

impl CrowFliesDirections {
    pub fn new() -> Self {
        CrowFliesDirections {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectionsProvider for CrowFliesDirections {
    async fn walking_segment(
        &self,
        from: &Coordinates,
        to: &Coordinates,
    ) -> Result<WalkingSegment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let meters = from.distance_meters_to(to) * 1.3;
        Ok(WalkingSegment {
            distance_meters: meters,
            duration_seconds: meters / 1.39,
        })
    }
}

/// Every leg takes the same fixed time, making trimming arithmetic exact.
pub struct FixedDurationDirections {
    pub seconds_per_leg: f64,
}

#[async_trait]
impl DirectionsProvider for FixedDurationDirections {
    async fn walking_segment(
        &self,
        from: &Coordinates,
        to: &Coordinates,
    ) -> Result<WalkingSegment> {
        Ok(WalkingSegment {
            distance_meters: from.distance_meters_to(to).max(100.0),
            duration_seconds: self.seconds_per_leg,
        })
    }
}

/// POI source that serves a fixed pool.
pub struct FixedPoolSource {
    pub pool: Vec<Poi>,
}

#[async_trait]
impl PoiSource for FixedPoolSource {
    async fn fetch(&self, _city: &str, _categories: &[PoiCategory]) -> Result<Vec<Poi>> {
        Ok(self.pool.clone())
    }
}

/// Ten named places fanned out around the old town start point.
pub fn nuremberg_pool() -> Vec<Poi> {
    let places = [
        ("Kaiserburg", PoiCategory::Castle, 49.4577, 11.0756),
        ("Schöner Brunnen", PoiCategory::Fountain, 49.4539, 11.0776),
        ("Germanisches Nationalmuseum", PoiCategory::Museum, 49.4480, 11.0745),
        ("Lorenzkirche", PoiCategory::Church, 49.4508, 11.0785),
        ("Henkersteg", PoiCategory::Bridge, 49.4517, 11.0728),
        ("Albrecht-Dürer-Haus", PoiCategory::Historic, 49.4572, 11.0730),
        ("Frauenkirche", PoiCategory::Church, 49.4536, 11.0780),
        ("Stadtpark", PoiCategory::Park, 49.4630, 11.0900),
        ("Sinwellturm", PoiCategory::Tower, 49.4580, 11.0762),
        ("Neues Museum", PoiCategory::Museum, 49.4495, 11.0800),
    ];
    places
        .into_iter()
        .map(|(name, category, lat, lng)| {
            Poi::new(
                name.to_string(),
                category,
                Coordinates::new(lat, lng).unwrap(),
            )
        })
        .collect()
}

/// Full engine wired over in-process fakes: sequential segments, no rate
/// limiting, disk cache in a temp directory.
pub async fn build_generator(
    dir: &TempDir,
    directions: Arc<dyn DirectionsProvider>,
    pool: Vec<Poi>,
) -> RouteGenerator {
    init_tracing();

    let disk = Arc::new(
        DiskCacheStore::open(DiskCacheConfig::new(dir.path()))
            .await
            .unwrap(),
    );

    let poi_service = Arc::new(PoiService::new(
        Arc::new(FixedPoolSource { pool }),
        disk.clone(),
        Duration::from_secs(3600),
        Duration::from_millis(1),
    ));

    let planner = SegmentPlanner::new(
        directions,
        Arc::new(SegmentCache::new(Duration::from_secs(3600), 1000)),
        Arc::new(RateLimiter::unlimited()),
        SegmentMode::Sequential,
        3,
        Duration::from_millis(1),
    )
    .with_disk_tier(disk);

    RouteGenerator::new(
        Arc::new(FakeGeocoder),
        poi_service,
        PoiSelector::default(),
        planner,
    )
}
