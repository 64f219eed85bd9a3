use crate::cache::{CacheDomain, DiskCacheStore};
use crate::constants::DEFAULT_POI_MEMORY_CACHE_MAX_ENTRIES;
use crate::error::Result;
use crate::models::{Poi, PoiCategory};
use crate::providers::PoiSource;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// POI repository: memoizes result sets per city in front of the disk tier
/// and the external source. Fetch order is memory -> disk -> source; a
/// successful source fetch populates both tiers.
pub struct PoiService {
    source: Arc<dyn PoiSource>,
    disk: Arc<DiskCacheStore>,
    memory: Cache<String, Arc<Vec<Poi>>>,
    retry_backoff: Duration,
}

impl PoiService {
    pub fn new(
        source: Arc<dyn PoiSource>,
        disk: Arc<DiskCacheStore>,
        memory_ttl: Duration,
        retry_backoff: Duration,
    ) -> Self {
        let memory = Cache::builder()
            .time_to_live(memory_ttl)
            .max_capacity(DEFAULT_POI_MEMORY_CACHE_MAX_ENTRIES)
            .build();

        PoiService {
            source,
            disk,
            memory,
            retry_backoff,
        }
    }

    /// Fetch the POI pool for a city, consulting both cache tiers before the
    /// external source.
    pub async fn pois_for_city(
        &self,
        city: &str,
        categories: Option<&[PoiCategory]>,
    ) -> Result<Vec<Poi>> {
        let key = Self::cache_key(city, categories);

        if let Some(cached) = self.memory.get(&key).await {
            tracing::debug!("POI memory cache hit: {}", key);
            return Ok((*cached).clone());
        }

        if let Some(cached) = self.disk.get::<Vec<Poi>>(CacheDomain::Pois, &key).await {
            tracing::debug!("POI disk cache hit: {} ({} POIs)", key, cached.len());
            self.memory.insert(key, Arc::new(cached.clone())).await;
            return Ok(cached);
        }

        let wanted = categories
            .map(|c| c.to_vec())
            .unwrap_or_else(|| PoiCategory::all().to_vec());

        let pois = self.fetch_with_retry(city, &wanted).await?;
        tracing::info!("Fetched {} POIs for '{}' from source", pois.len(), city);

        self.disk.put(CacheDomain::Pois, &key, &pois).await;
        self.memory.insert(key, Arc::new(pois.clone())).await;

        Ok(pois)
    }

    /// One bounded retry after a fixed backoff when the source reports a
    /// rate limit; every other error surfaces immediately.
    async fn fetch_with_retry(&self, city: &str, categories: &[PoiCategory]) -> Result<Vec<Poi>> {
        match self.source.fetch(city, categories).await {
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    "POI source rate limited ({}), retrying once in {}ms",
                    e,
                    self.retry_backoff.as_millis()
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.source.fetch(city, categories).await
            }
            other => other,
        }
    }

    /// Cached encyclopedia extract for a POI, if the surrounding app stored
    /// one. The core never fetches these itself.
    pub async fn cached_summary(&self, poi_name: &str) -> Option<String> {
        self.disk
            .get::<String>(CacheDomain::Enrichment, &poi_name.to_lowercase())
            .await
    }

    /// Persist an encyclopedia extract under the enrichment domain's TTL.
    pub async fn store_summary(&self, poi_name: &str, summary: &str) {
        self.disk
            .put(CacheDomain::Enrichment, &poi_name.to_lowercase(), &summary)
            .await;
    }

    fn cache_key(city: &str, categories: Option<&[PoiCategory]>) -> String {
        let mut key = format!("poi:city:{}", city.trim().to_lowercase());
        if let Some(cats) = categories {
            let mut names: Vec<String> = cats.iter().map(|c| c.to_string()).collect();
            names.sort(); // Ensure consistent ordering
            key.push(':');
            key.push_str(&names.join(","));
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DiskCacheConfig;
    use crate::error::TourError;
    use crate::models::Coordinates;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingSource {
        calls: AtomicUsize,
        rate_limit_first: bool,
    }

    #[async_trait]
    impl PoiSource for CountingSource {
        async fn fetch(&self, _city: &str, _categories: &[PoiCategory]) -> Result<Vec<Poi>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.rate_limit_first && call == 0 {
                return Err(TourError::RateLimited("slow down".to_string()));
            }
            Ok(vec![Poi::new(
                "Kaiserburg".to_string(),
                PoiCategory::Castle,
                Coordinates::new(49.4577, 11.0756).unwrap(),
            )])
        }
    }

    async fn service(dir: &TempDir, rate_limit_first: bool) -> PoiService {
        let disk = Arc::new(
            DiskCacheStore::open(DiskCacheConfig::new(dir.path()))
                .await
                .unwrap(),
        );
        PoiService::new(
            Arc::new(CountingSource {
                calls: AtomicUsize::new(0),
                rate_limit_first,
            }),
            disk,
            Duration::from_secs(3600),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn source_is_called_once_per_city() {
        let dir = TempDir::new().unwrap();
        let counting = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            rate_limit_first: false,
        });
        let disk = Arc::new(
            DiskCacheStore::open(DiskCacheConfig::new(dir.path()))
                .await
                .unwrap(),
        );
        let service = PoiService::new(
            counting.clone(),
            disk,
            Duration::from_secs(3600),
            Duration::from_millis(10),
        );

        service.pois_for_city("Nürnberg", None).await.unwrap();
        service.pois_for_city("Nürnberg", None).await.unwrap();
        service.pois_for_city("nürnberg", None).await.unwrap(); // case-folded key

        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limit_is_retried_once() {
        let dir = TempDir::new().unwrap();
        let counting = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            rate_limit_first: true,
        });
        let disk = Arc::new(
            DiskCacheStore::open(DiskCacheConfig::new(dir.path()))
                .await
                .unwrap(),
        );
        let service = PoiService::new(
            counting.clone(),
            disk,
            Duration::from_secs(3600),
            Duration::from_millis(10),
        );

        let pois = service.pois_for_city("Nürnberg", None).await.unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn category_filter_changes_cache_key() {
        let key_all = PoiService::cache_key("Nürnberg", None);
        let key_castles = PoiService::cache_key("Nürnberg", Some(&[PoiCategory::Castle]));
        assert_ne!(key_all, key_castles);

        // Category order must not matter.
        let a = PoiService::cache_key(
            "Nürnberg",
            Some(&[PoiCategory::Castle, PoiCategory::Museum]),
        );
        let b = PoiService::cache_key(
            "Nürnberg",
            Some(&[PoiCategory::Museum, PoiCategory::Castle]),
        );
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn summary_roundtrip() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, false).await;

        assert!(service.cached_summary("Kaiserburg").await.is_none());
        service
            .store_summary("Kaiserburg", "Imperial castle above the old town.")
            .await;
        assert_eq!(
            service.cached_summary("kaiserburg").await.as_deref(),
            Some("Imperial castle above the old town.")
        );
    }
}
