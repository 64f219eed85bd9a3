//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For tuning knobs that benefit from runtime experimentation, see
//! [`PlannerConfig`](crate::config::PlannerConfig) instead.

// --- Cache TTL defaults (seconds, used when env vars are absent) ---

/// Default route-segment cache TTL: 7 days. Overridden by `ROUTE_CACHE_TTL`.
/// Walking segments between fixed coordinate pairs change only when the road
/// network does, so this TTL is deliberately long.
pub const DEFAULT_ROUTE_CACHE_TTL_SECONDS: u64 = 604_800;
/// Default POI result-set cache TTL: 24 hours. Overridden by `POI_CACHE_TTL`.
pub const DEFAULT_POI_CACHE_TTL_SECONDS: u64 = 86_400;
/// Default enrichment (encyclopedia extract) cache TTL: 24 hours.
/// Overridden by `ENRICHMENT_CACHE_TTL`.
pub const DEFAULT_ENRICHMENT_CACHE_TTL_SECONDS: u64 = 86_400;

// --- Disk cache limits ---

/// Total on-disk cache budget across all domains: 100 MB.
/// Overridden by `DISK_CACHE_MAX_BYTES`. Enforcement deletes whole domain
/// files oldest-modification-first until back under the cap.
pub const DEFAULT_DISK_CACHE_MAX_BYTES: u64 = 100 * 1024 * 1024;

// --- In-memory segment cache ---

/// Maximum entries for the in-memory walking-segment cache. Inserting past
/// the cap evicts the single oldest entry first (amortized O(n), acceptable
/// at this size).
pub const DEFAULT_SEGMENT_CACHE_MAX_ENTRIES: usize = 1_000;
/// Coordinate quantization factor for segment cache keys. 1e4 rounds to
/// ~4 decimal degrees (~10 m), so two queries within 10 m of each other
/// intentionally collide on the same cached segment.
pub const SEGMENT_KEY_QUANT_FACTOR: f64 = 10_000.0;

// --- POI scoring weights ---
// Combined score = category*W_CATEGORY + distance*W_DISTANCE + quality*W_QUALITY.

/// Weight of the fixed per-category attractiveness table.
pub const SCORE_WEIGHT_CATEGORY: f64 = 0.4;
/// Weight of proximity to the start point.
pub const SCORE_WEIGHT_DISTANCE: f64 = 0.3;
/// Weight of per-POI quality signals (name, description, tags).
pub const SCORE_WEIGHT_QUALITY: f64 = 0.3;

/// Base quality score every POI starts from.
pub const QUALITY_SCORE_BASE: f64 = 0.5;
/// Quality bonus for a non-generic display name.
pub const QUALITY_BONUS_NAME: f64 = 0.3;
/// Quality bonus for carrying a free-text description.
pub const QUALITY_BONUS_DESCRIPTION: f64 = 0.2;
/// Quality bonus for recognized quality tags (wikipedia/wikidata/heritage).
pub const QUALITY_BONUS_TAGS: f64 = 0.1;

// --- Distance budgets per route-length class (km from the start point) ---

/// Maximum POI distance from the start for a short route.
pub const MAX_POI_DISTANCE_SHORT_KM: f64 = 5.0;
/// Maximum POI distance from the start for a medium route.
pub const MAX_POI_DISTANCE_MEDIUM_KM: f64 = 10.0;
/// Maximum POI distance from the start for a long route.
pub const MAX_POI_DISTANCE_LONG_KM: f64 = 20.0;

// --- Candidate selection structure ---

/// The selection engine hands `multiplier * target_count` top-scored
/// candidates to the distribution filter so it has room to trade score for
/// spatial spread.
pub const CANDIDATE_POOL_MULTIPLIER: usize = 2;
/// Soft minimum separation (meters) the distribution filter prefers between
/// selected POIs. Not a hard constraint: once no remaining candidate clears
/// it, the best available candidate is accepted anyway.
pub const DISTRIBUTION_MIN_SEPARATION_METERS: f64 = 200.0;

// --- Route assembly ---

/// Dwell time assumed for a stop whose category has no table entry.
pub const DEFAULT_VISIT_MINUTES: u32 = 30;
/// Below this many waypoints (start + 1 intermediate + end) there is nothing
/// for the nearest-neighbor pass to reorder.
pub const NEAREST_NEIGHBOR_MIN_WAYPOINTS: usize = 4;
/// Hard upper bound on requested stops, regardless of user input.
pub const MAX_STOPS_CLAMP: usize = 20;

// --- Provider pacing defaults (used when env vars are absent) ---

/// Default max simultaneous in-flight segment requests in bounded-parallel
/// mode. Overridden by `SEGMENT_CONCURRENCY`.
pub const DEFAULT_SEGMENT_CONCURRENCY: usize = 3;
/// Default minimum interval (ms) between external provider calls.
/// Overridden by `RATE_LIMIT_INTERVAL_MS`.
pub const DEFAULT_RATE_LIMIT_INTERVAL_MS: u64 = 500;
/// Default backoff (ms) before the single bounded retry after a rate-limit
/// response. Overridden by `RETRY_BACKOFF_MS`.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 2_000;

// --- In-memory POI cache ---

/// Maximum city result-sets kept in the in-memory POI cache tier.
pub const DEFAULT_POI_MEMORY_CACHE_MAX_ENTRIES: u64 = 64;
