use crate::constants::*;
use crate::services::segments::SegmentMode;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the per-domain disk cache files.
    pub cache_dir: PathBuf,
    pub route_cache_ttl: u64,
    pub poi_cache_ttl: u64,
    pub enrichment_cache_ttl: u64,
    pub disk_cache_max_bytes: u64,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Scheduling mode for segment computation.
    pub segment_mode: SegmentMode,

    /// Max simultaneous in-flight segment requests in bounded-parallel mode.
    pub segment_concurrency: usize,

    /// Minimum interval (ms) between external provider calls.
    pub rate_limit_interval_ms: u64,

    /// Backoff (ms) before the single bounded retry after a rate-limit
    /// response.
    pub retry_backoff_ms: u64,

    /// Entry cap for the in-memory segment cache.
    pub segment_cache_max_entries: usize,

    /// Soft minimum separation (meters) the distribution filter prefers
    /// between selected POIs.
    pub distribution_min_separation_m: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            segment_mode: SegmentMode::BoundedParallel,
            segment_concurrency: DEFAULT_SEGMENT_CONCURRENCY,
            rate_limit_interval_ms: DEFAULT_RATE_LIMIT_INTERVAL_MS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            segment_cache_max_entries: DEFAULT_SEGMENT_CACHE_MAX_ENTRIES,
            distribution_min_separation_m: DISTRIBUTION_MIN_SEPARATION_METERS,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let segment_mode = match env::var("SEGMENT_MODE")
            .unwrap_or_else(|_| "parallel".to_string())
            .to_lowercase()
            .as_str()
        {
            "sequential" => SegmentMode::Sequential,
            "parallel" => SegmentMode::BoundedParallel,
            other => return Err(format!("Invalid SEGMENT_MODE: {}", other)),
        };

        Ok(Self {
            segment_mode,

            segment_concurrency: env::var("SEGMENT_CONCURRENCY")
                .unwrap_or_else(|_| defaults.segment_concurrency.to_string())
                .parse()
                .map_err(|_| "Invalid SEGMENT_CONCURRENCY")?,

            rate_limit_interval_ms: env::var("RATE_LIMIT_INTERVAL_MS")
                .unwrap_or_else(|_| defaults.rate_limit_interval_ms.to_string())
                .parse()
                .map_err(|_| "Invalid RATE_LIMIT_INTERVAL_MS")?,

            retry_backoff_ms: env::var("RETRY_BACKOFF_MS")
                .unwrap_or_else(|_| defaults.retry_backoff_ms.to_string())
                .parse()
                .map_err(|_| "Invalid RETRY_BACKOFF_MS")?,

            segment_cache_max_entries: env::var("SEGMENT_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| defaults.segment_cache_max_entries.to_string())
                .parse()
                .map_err(|_| "Invalid SEGMENT_CACHE_MAX_ENTRIES")?,

            distribution_min_separation_m: env::var("DISTRIBUTION_MIN_SEPARATION_M")
                .unwrap_or_else(|_| defaults.distribution_min_separation_m.to_string())
                .parse()
                .map_err(|_| "Invalid DISTRIBUTION_MIN_SEPARATION_M")?,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let cache_dir = env::var("CACHE_DIR").unwrap_or_else(|_| ".strollplan_cache".to_string());

        let disk_cache_max_bytes: u64 = env::var("DISK_CACHE_MAX_BYTES")
            .unwrap_or_else(|_| DEFAULT_DISK_CACHE_MAX_BYTES.to_string())
            .parse()
            .map_err(|_| "Invalid DISK_CACHE_MAX_BYTES")?;

        if disk_cache_max_bytes == 0 {
            return Err("DISK_CACHE_MAX_BYTES must be positive".to_string());
        }

        Ok(Config {
            cache_dir: PathBuf::from(cache_dir),
            route_cache_ttl: env::var("ROUTE_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_ROUTE_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_CACHE_TTL")?,
            poi_cache_ttl: env::var("POI_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_POI_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid POI_CACHE_TTL")?,
            enrichment_cache_ttl: env::var("ENRICHMENT_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_ENRICHMENT_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid ENRICHMENT_CACHE_TTL")?,
            disk_cache_max_bytes,
            planner: PlannerConfig::from_env()?,
        })
    }
}
