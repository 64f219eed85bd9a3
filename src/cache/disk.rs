use crate::cache::CacheEntry;
use crate::constants::{
    DEFAULT_DISK_CACHE_MAX_BYTES, DEFAULT_ENRICHMENT_CACHE_TTL_SECONDS,
    DEFAULT_POI_CACHE_TTL_SECONDS, DEFAULT_ROUTE_CACHE_TTL_SECONDS,
};
use crate::error::{Result, TourError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

/// The cache domains persisted to disk, one JSON file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheDomain {
    /// Walking segments between quantized coordinate pairs.
    Routes,
    /// POI result sets keyed by city (or coordinate+radius).
    Pois,
    /// Encyclopedia extracts for POIs.
    Enrichment,
}

impl CacheDomain {
    pub fn all() -> &'static [CacheDomain] {
        &[CacheDomain::Routes, CacheDomain::Pois, CacheDomain::Enrichment]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            CacheDomain::Routes => "route_cache.json",
            CacheDomain::Pois => "poi_cache.json",
            CacheDomain::Enrichment => "wikipedia_cache.json",
        }
    }

    fn from_file_name(name: &str) -> Option<CacheDomain> {
        CacheDomain::all()
            .iter()
            .copied()
            .find(|d| d.file_name() == name)
    }
}

#[derive(Debug, Clone)]
pub struct DiskCacheConfig {
    pub dir: PathBuf,
    pub route_ttl: Duration,
    pub poi_ttl: Duration,
    pub enrichment_ttl: Duration,
    pub max_total_bytes: u64,
}

impl DiskCacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskCacheConfig {
            dir: dir.into(),
            route_ttl: Duration::from_secs(DEFAULT_ROUTE_CACHE_TTL_SECONDS),
            poi_ttl: Duration::from_secs(DEFAULT_POI_CACHE_TTL_SECONDS),
            enrichment_ttl: Duration::from_secs(DEFAULT_ENRICHMENT_CACHE_TTL_SECONDS),
            max_total_bytes: DEFAULT_DISK_CACHE_MAX_BYTES,
        }
    }
}

type DomainMap = HashMap<String, CacheEntry<Value>>;

/// Disk-persisted cache tier. One JSON file per domain, each holding a map
/// from key to `{value, created_at}`. All file I/O is serialized behind a
/// single async mutex, so the store is safe to share across concurrent
/// orchestrations; callers never touch the filesystem directly.
///
/// Corrupt or undecodable files are deleted and treated as empty — a decode
/// failure never reaches the caller.
pub struct DiskCacheStore {
    config: DiskCacheConfig,
    loaded: Mutex<HashMap<CacheDomain, DomainMap>>,
}

impl DiskCacheStore {
    pub async fn open(config: DiskCacheConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.dir).await.map_err(|e| {
            TourError::Cache(format!(
                "Failed to create cache directory {}: {}",
                config.dir.display(),
                e
            ))
        })?;

        tracing::info!("Disk cache opened at {}", config.dir.display());

        Ok(DiskCacheStore {
            config,
            loaded: Mutex::new(HashMap::new()),
        })
    }

    /// Look up a value. Expired and undecodable entries are removed inline
    /// and reported as misses.
    pub async fn get<T: DeserializeOwned>(&self, domain: CacheDomain, key: &str) -> Option<T> {
        let ttl = self.ttl_for(domain);
        let mut loaded = self.loaded.lock().await;
        self.ensure_loaded(&mut loaded, domain).await;

        let map = loaded.get_mut(&domain)?;
        let entry = match map.get(key) {
            Some(entry) => entry.clone(),
            None => {
                tracing::debug!("Disk cache miss ({}): {}", domain.file_name(), key);
                return None;
            }
        };

        if entry.is_expired(ttl) {
            tracing::debug!("Disk cache expired ({}): {}", domain.file_name(), key);
            map.remove(key);
            self.persist(domain, map).await;
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => {
                tracing::debug!("Disk cache hit ({}): {}", domain.file_name(), key);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(
                    "Undecodable disk cache entry ({}): {}: {}",
                    domain.file_name(),
                    key,
                    e
                );
                map.remove(key);
                self.persist(domain, map).await;
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, domain: CacheDomain, key: &str, value: &T) {
        let json = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Failed to serialize value for disk cache: {}", e);
                return;
            }
        };

        let mut loaded = self.loaded.lock().await;
        self.ensure_loaded(&mut loaded, domain).await;
        let map = loaded.entry(domain).or_default();
        map.insert(key.to_string(), CacheEntry::new(json));
        self.persist(domain, map).await;
    }

    pub async fn delete(&self, domain: CacheDomain, key: &str) {
        let mut loaded = self.loaded.lock().await;
        self.ensure_loaded(&mut loaded, domain).await;
        if let Some(map) = loaded.get_mut(&domain) {
            if map.remove(key).is_some() {
                self.persist(domain, map).await;
            }
        }
    }

    /// Walk the cache directory and delete domain files whose last
    /// modification is older than the domain TTL. Returns how many files
    /// were removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut loaded = self.loaded.lock().await;
        let mut removed = 0;

        for entry in self.list_cache_files().await {
            let Some(domain) = CacheDomain::from_file_name(&entry.name) else {
                continue;
            };
            let age = SystemTime::now()
                .duration_since(entry.modified)
                .unwrap_or_default();

            if age >= self.ttl_for(domain) {
                if let Err(e) = tokio::fs::remove_file(&entry.path).await {
                    tracing::warn!("Failed to delete expired cache file {}: {}", entry.name, e);
                    continue;
                }
                tracing::info!(
                    "Swept expired cache file {} (age {}h)",
                    entry.name,
                    age.as_secs() / 3600
                );
                loaded.remove(&domain);
                removed += 1;
            }
        }

        removed
    }

    /// Delete domain files oldest-modification-first until total size is
    /// back under the byte cap. Returns bytes freed.
    pub async fn enforce_size_limit(&self) -> u64 {
        let mut loaded = self.loaded.lock().await;
        let mut files = self.list_cache_files().await;
        let mut total: u64 = files.iter().map(|f| f.len).sum();

        if total <= self.config.max_total_bytes {
            return 0;
        }

        // LRU approximated by modification time: oldest first.
        files.sort_by_key(|f| f.modified);

        let mut freed = 0;
        for file in files {
            if total <= self.config.max_total_bytes {
                break;
            }
            if let Err(e) = tokio::fs::remove_file(&file.path).await {
                tracing::warn!("Failed to evict cache file {}: {}", file.name, e);
                continue;
            }
            tracing::info!("Evicted cache file {} ({} bytes)", file.name, file.len);
            if let Some(domain) = CacheDomain::from_file_name(&file.name) {
                loaded.remove(&domain);
            }
            total -= file.len;
            freed += file.len;
        }

        freed
    }

    pub fn directory(&self) -> &Path {
        &self.config.dir
    }

    fn ttl_for(&self, domain: CacheDomain) -> Duration {
        match domain {
            CacheDomain::Routes => self.config.route_ttl,
            CacheDomain::Pois => self.config.poi_ttl,
            CacheDomain::Enrichment => self.config.enrichment_ttl,
        }
    }

    fn domain_path(&self, domain: CacheDomain) -> PathBuf {
        self.config.dir.join(domain.file_name())
    }

    /// Load a domain file into memory if not already loaded. A corrupt file
    /// is deleted and replaced by an empty map.
    async fn ensure_loaded(&self, loaded: &mut HashMap<CacheDomain, DomainMap>, domain: CacheDomain) {
        if loaded.contains_key(&domain) {
            return;
        }

        let path = self.domain_path(domain);
        let map = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<DomainMap>(&contents) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        "Corrupt cache file {}, deleting and starting empty: {}",
                        domain.file_name(),
                        e
                    );
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::warn!("Failed to delete corrupt cache file: {}", e);
                    }
                    DomainMap::new()
                }
            },
            Err(_) => DomainMap::new(),
        };

        loaded.insert(domain, map);
    }

    async fn persist(&self, domain: CacheDomain, map: &DomainMap) {
        let path = self.domain_path(domain);
        let json = match serde_json::to_string(map) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize cache domain {}: {}", domain.file_name(), e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&path, json).await {
            tracing::warn!("Failed to write cache file {}: {}", domain.file_name(), e);
        }
    }

    async fn list_cache_files(&self) -> Vec<CacheFile> {
        let mut files = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.config.dir).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Failed to read cache directory: {}", e);
                return files;
            }
        };

        while let Ok(Some(entry)) = dir.next_entry().await {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push(CacheFile {
                path: entry.path(),
                name,
                len: metadata.len(),
                modified,
            });
        }

        files
    }
}

struct CacheFile {
    path: PathBuf,
    name: String,
    len: u64,
    modified: SystemTime,
}
