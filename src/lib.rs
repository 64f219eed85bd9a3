//! Walking-tour planning engine: POI selection, nearest-neighbor route
//! ordering, constraint validation, and a layered (memory + disk) cache in
//! front of the external geocoding/directions/POI providers.
//!
//! This is an embedded library — it exposes no network protocol of its own.
//! Construct the services once at process start and share them by reference;
//! there is no hidden global state.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;

// Re-export commonly used types
pub use error::{Result, TourError};
pub use models::{
    Coordinates, EndpointPolicy, GeneratedRoute, Poi, PoiCategory, RouteLengthClass, RouteSegment,
    StartPoint, TourRequest, Waypoint,
};
pub use services::route_generator::RouteGenerator;

use cache::{DiskCacheConfig, DiskCacheStore, SegmentCache};
use config::Config;
use providers::{DirectionsProvider, Geocoder, PoiSource, RateLimiter};
use services::poi_service::PoiService;
use services::segments::SegmentPlanner;
use services::selection::PoiSelector;
use std::sync::Arc;
use std::time::Duration;

/// Wire a [`RouteGenerator`] and its cache stack from a [`Config`] and the
/// three provider implementations. Returns the generator plus the shared
/// disk store so callers can run maintenance passes
/// ([`DiskCacheStore::sweep_expired`], [`DiskCacheStore::enforce_size_limit`])
/// on their own schedule.
pub async fn build_planner(
    config: &Config,
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn DirectionsProvider>,
    poi_source: Arc<dyn PoiSource>,
) -> Result<(RouteGenerator, Arc<DiskCacheStore>)> {
    let disk = Arc::new(
        DiskCacheStore::open(DiskCacheConfig {
            dir: config.cache_dir.clone(),
            route_ttl: Duration::from_secs(config.route_cache_ttl),
            poi_ttl: Duration::from_secs(config.poi_cache_ttl),
            enrichment_ttl: Duration::from_secs(config.enrichment_cache_ttl),
            max_total_bytes: config.disk_cache_max_bytes,
        })
        .await?,
    );

    let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
        config.planner.rate_limit_interval_ms,
    )));

    let segment_cache = Arc::new(SegmentCache::new(
        Duration::from_secs(config.route_cache_ttl),
        config.planner.segment_cache_max_entries,
    ));

    let planner = SegmentPlanner::new(
        directions,
        segment_cache,
        limiter,
        config.planner.segment_mode,
        config.planner.segment_concurrency,
        Duration::from_millis(config.planner.retry_backoff_ms),
    )
    .with_disk_tier(disk.clone());

    let poi_service = Arc::new(PoiService::new(
        poi_source,
        disk.clone(),
        Duration::from_secs(config.poi_cache_ttl),
        Duration::from_millis(config.planner.retry_backoff_ms),
    ));

    let generator = RouteGenerator::new(
        geocoder,
        poi_service,
        PoiSelector::new(config.planner.distribution_min_separation_m),
        planner,
    );

    Ok((generator, disk))
}
