use crate::cache::{CacheDomain, DiskCacheStore, SegmentCache, SegmentKey};
use crate::error::Result;
use crate::models::{Coordinates, RouteSegment, Waypoint};
use crate::providers::{DirectionsProvider, RateLimiter, WalkingSegment};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// How segment requests for one route are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentMode {
    /// One request at a time.
    Sequential,
    /// A small worker pool; results are index-tagged and reassembled in
    /// waypoint order regardless of completion order.
    #[default]
    BoundedParallel,
}

/// Computes actual walking segments for consecutive waypoint pairs,
/// consulting the segment cache (memory, then disk) before any external
/// call and populating both tiers after a miss.
///
/// Every provider call first acquires the shared rate limiter; a rate-limit
/// response gets one bounded retry after a fixed backoff.
pub struct SegmentPlanner {
    directions: Arc<dyn DirectionsProvider>,
    cache: Arc<SegmentCache>,
    disk: Option<Arc<DiskCacheStore>>,
    limiter: Arc<RateLimiter>,
    mode: SegmentMode,
    concurrency: usize,
    retry_backoff: Duration,
}

impl SegmentPlanner {
    pub fn new(
        directions: Arc<dyn DirectionsProvider>,
        cache: Arc<SegmentCache>,
        limiter: Arc<RateLimiter>,
        mode: SegmentMode,
        concurrency: usize,
        retry_backoff: Duration,
    ) -> Self {
        SegmentPlanner {
            directions,
            cache,
            disk: None,
            limiter,
            mode,
            concurrency: concurrency.max(1),
            retry_backoff,
        }
    }

    /// Persist computed segments across restarts under the route domain.
    pub fn with_disk_tier(mut self, disk: Arc<DiskCacheStore>) -> Self {
        self.disk = Some(disk);
        self
    }

    /// Segments for all consecutive waypoint pairs, in waypoint order.
    pub async fn segments_for(&self, waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>> {
        if waypoints.len() < 2 {
            return Ok(Vec::new());
        }

        let pairs: Vec<(Coordinates, Coordinates)> = waypoints
            .windows(2)
            .map(|pair| (pair[0].coordinates, pair[1].coordinates))
            .collect();

        match self.mode {
            SegmentMode::Sequential => {
                let mut segments = Vec::with_capacity(pairs.len());
                for (from, to) in pairs {
                    segments.push(self.segment(from, to).await?);
                }
                Ok(segments)
            }
            SegmentMode::BoundedParallel => {
                let mut tagged: Vec<(usize, Result<RouteSegment>)> =
                    stream::iter(pairs.into_iter().enumerate())
                        .map(|(idx, (from, to))| async move {
                            (idx, self.segment(from, to).await)
                        })
                        .buffer_unordered(self.concurrency)
                        .collect()
                        .await;

                tagged.sort_by_key(|(idx, _)| *idx);
                tagged.into_iter().map(|(_, result)| result).collect()
            }
        }
    }

    async fn segment(&self, from: Coordinates, to: Coordinates) -> Result<RouteSegment> {
        let key = SegmentKey::new(&from, &to);

        if let Some(hit) = self.cache.get(&key) {
            return Ok(assemble(from, to, hit));
        }

        if let Some(disk) = &self.disk {
            if let Some(hit) = disk
                .get::<WalkingSegment>(CacheDomain::Routes, &key.to_string())
                .await
            {
                tracing::debug!("Segment disk cache hit: {}", key);
                self.cache.insert(key, hit);
                return Ok(assemble(from, to, hit));
            }
        }

        let segment = self.fetch_with_retry(&from, &to).await?;

        self.cache.insert(key, segment);
        if let Some(disk) = &self.disk {
            disk.put(CacheDomain::Routes, &key.to_string(), &segment)
                .await;
        }

        Ok(assemble(from, to, segment))
    }

    async fn fetch_with_retry(
        &self,
        from: &Coordinates,
        to: &Coordinates,
    ) -> Result<WalkingSegment> {
        self.limiter.acquire().await;
        match self.directions.walking_segment(from, to).await {
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    "Directions provider rate limited ({}), retrying once in {}ms",
                    e,
                    self.retry_backoff.as_millis()
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.limiter.acquire().await;
                self.directions.walking_segment(from, to).await
            }
            other => other,
        }
    }
}

fn assemble(from: Coordinates, to: Coordinates, segment: WalkingSegment) -> RouteSegment {
    RouteSegment {
        from,
        to,
        distance_meters: segment.distance_meters,
        duration_seconds: segment.duration_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TourError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted directions provider: distance is derived from straight-line
    /// distance, calls are counted, and a prefix of calls can fail.
    struct FakeDirections {
        calls: AtomicUsize,
        fail_first: Option<TourError>,
        delay: Duration,
    }

    impl FakeDirections {
        fn new() -> Self {
            FakeDirections {
                calls: AtomicUsize::new(0),
                fail_first: None,
                delay: Duration::ZERO,
            }
        }

        fn rate_limited_once() -> Self {
            FakeDirections {
                calls: AtomicUsize::new(0),
                fail_first: Some(TourError::RateLimited("429".to_string())),
                delay: Duration::ZERO,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DirectionsProvider for FakeDirections {
        async fn walking_segment(
            &self,
            from: &Coordinates,
            to: &Coordinates,
        ) -> Result<WalkingSegment> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if call == 0 {
                if let Some(err) = &self.fail_first {
                    return Err(match err {
                        TourError::RateLimited(msg) => TourError::RateLimited(msg.clone()),
                        _ => TourError::ProviderUnavailable("scripted".to_string()),
                    });
                }
            }
            let meters = from.distance_meters_to(to);
            Ok(WalkingSegment {
                distance_meters: meters,
                // ~5 km/h walking speed.
                duration_seconds: meters / 1.39,
            })
        }
    }

    fn wp(name: &str, lat: f64, lng: f64) -> Waypoint {
        Waypoint::synthesized(name.to_string(), Coordinates::new(lat, lng).unwrap())
    }

    fn planner(directions: Arc<FakeDirections>, mode: SegmentMode) -> SegmentPlanner {
        SegmentPlanner::new(
            directions,
            Arc::new(SegmentCache::new(Duration::from_secs(3600), 100)),
            Arc::new(RateLimiter::unlimited()),
            mode,
            3,
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn sequential_returns_one_segment_per_pair() {
        let directions = Arc::new(FakeDirections::new());
        let planner = planner(directions.clone(), SegmentMode::Sequential);

        let waypoints = vec![
            wp("a", 49.4521, 11.0767),
            wp("b", 49.4600, 11.0800),
            wp("c", 49.4650, 11.0850),
        ];
        let segments = planner.segments_for(&waypoints).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(directions.call_count(), 2);
        assert_eq!(segments[0].from, waypoints[0].coordinates);
        assert_eq!(segments[1].to, waypoints[2].coordinates);
    }

    #[tokio::test]
    async fn cached_pair_skips_provider() {
        let directions = Arc::new(FakeDirections::new());
        let planner = planner(directions.clone(), SegmentMode::Sequential);

        let waypoints = vec![wp("a", 49.4521, 11.0767), wp("b", 49.4600, 11.0800)];

        planner.segments_for(&waypoints).await.unwrap();
        assert_eq!(directions.call_count(), 1);

        // Same pair again: served from cache, no new provider call.
        planner.segments_for(&waypoints).await.unwrap();
        assert_eq!(directions.call_count(), 1);
    }

    #[tokio::test]
    async fn nearby_coordinates_hit_same_cache_entry() {
        let directions = Arc::new(FakeDirections::new());
        let planner = planner(directions.clone(), SegmentMode::Sequential);

        planner
            .segments_for(&[wp("a", 49.45210, 11.07670), wp("b", 49.4600, 11.0800)])
            .await
            .unwrap();
        // ~5 m away from the first query: quantization collides on purpose.
        planner
            .segments_for(&[wp("a2", 49.45213, 11.07672), wp("b", 49.4600, 11.0800)])
            .await
            .unwrap();

        assert_eq!(directions.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_cache_entry_triggers_refetch() {
        let directions = Arc::new(FakeDirections::new());
        let planner = SegmentPlanner::new(
            directions.clone(),
            Arc::new(SegmentCache::new(Duration::from_secs(60), 100)),
            Arc::new(RateLimiter::unlimited()),
            SegmentMode::Sequential,
            3,
            Duration::from_millis(10),
        );

        let waypoints = vec![wp("a", 49.4521, 11.0767), wp("b", 49.4600, 11.0800)];
        planner.segments_for(&waypoints).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        planner.segments_for(&waypoints).await.unwrap();
        assert_eq!(directions.call_count(), 2);
    }

    #[tokio::test]
    async fn rate_limit_retried_once_then_succeeds() {
        let directions = Arc::new(FakeDirections::rate_limited_once());
        let planner = planner(directions.clone(), SegmentMode::Sequential);

        let waypoints = vec![wp("a", 49.4521, 11.0767), wp("b", 49.4600, 11.0800)];
        let segments = planner.segments_for(&waypoints).await.unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(directions.call_count(), 2);
    }

    /// Always rate limited: the single retry is exhausted and the error
    /// surfaces.
    struct AlwaysLimited;

    #[async_trait]
    impl DirectionsProvider for AlwaysLimited {
        async fn walking_segment(
            &self,
            _from: &Coordinates,
            _to: &Coordinates,
        ) -> Result<WalkingSegment> {
            Err(TourError::RateLimited("429".to_string()))
        }
    }

    #[tokio::test]
    async fn exhausted_retry_surfaces_rate_limit() {
        let planner = SegmentPlanner::new(
            Arc::new(AlwaysLimited),
            Arc::new(SegmentCache::new(Duration::from_secs(3600), 100)),
            Arc::new(RateLimiter::unlimited()),
            SegmentMode::Sequential,
            3,
            Duration::from_millis(1),
        );

        let waypoints = vec![wp("a", 49.4521, 11.0767), wp("b", 49.4600, 11.0800)];
        let err = planner.segments_for(&waypoints).await.unwrap_err();
        assert!(matches!(err, TourError::RateLimited(_)));
    }

    /// Completion order is scrambled by per-call delays; results must still
    /// come back in waypoint order.
    struct ScrambledDelays {
        delays_ms: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl DirectionsProvider for ScrambledDelays {
        async fn walking_segment(
            &self,
            from: &Coordinates,
            to: &Coordinates,
        ) -> Result<WalkingSegment> {
            let delay = {
                let mut delays = self.delays_ms.lock().unwrap();
                if delays.is_empty() {
                    0
                } else {
                    delays.remove(0)
                }
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(WalkingSegment {
                distance_meters: from.distance_meters_to(to),
                duration_seconds: 1.0,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_results_arrive_in_waypoint_order() {
        // First pair is slowest, last is fastest.
        let directions = Arc::new(ScrambledDelays {
            delays_ms: Mutex::new(vec![300, 200, 100, 0]),
        });
        let planner = SegmentPlanner::new(
            directions,
            Arc::new(SegmentCache::new(Duration::from_secs(3600), 100)),
            Arc::new(RateLimiter::unlimited()),
            SegmentMode::BoundedParallel,
            3,
            Duration::from_millis(10),
        );

        let waypoints = vec![
            wp("a", 49.4521, 11.0767),
            wp("b", 49.4600, 11.0800),
            wp("c", 49.4650, 11.0850),
            wp("d", 49.4700, 11.0900),
            wp("e", 49.4750, 11.0950),
        ];
        let segments = planner.segments_for(&waypoints).await.unwrap();

        assert_eq!(segments.len(), 4);
        for (segment, pair) in segments.iter().zip(waypoints.windows(2)) {
            assert_eq!(segment.from, pair[0].coordinates);
            assert_eq!(segment.to, pair[1].coordinates);
        }
    }

    #[tokio::test]
    async fn single_waypoint_yields_no_segments() {
        let planner = planner(Arc::new(FakeDirections::new()), SegmentMode::Sequential);
        let segments = planner
            .segments_for(&[wp("a", 49.4521, 11.0767)])
            .await
            .unwrap();
        assert!(segments.is_empty());
    }
}
