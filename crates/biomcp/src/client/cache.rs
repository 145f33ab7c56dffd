//! Response cache backends.
//!
//! Both backends store raw response bodies keyed by the request digest and
//! check expiry lazily on read. An expired entry behaves exactly like a miss.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Key-value store for raw response bodies.
///
/// `ttl` of `None` means the entry never expires.
#[async_trait]
pub trait ResponseCache: Send + Sync + std::fmt::Debug {
    /// Look up a live entry.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a body, replacing any previous entry for the key.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Release resources held by the backend.
    async fn close(&self) -> CacheResult<()>;
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Clone)]
struct MemoryEntry {
    body: Arc<str>,
    ttl: Option<Duration>,
}

struct EntryExpiry;

impl Expiry<String, MemoryEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Process-local cache backed by moka with per-entry expiry.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, MemoryEntry>,
}

impl MemoryCache {
    /// Create a cache holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();
        Self { inner }
    }

    /// Number of live entries (approximate until pending tasks run).
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let entry = self.inner.get(key).await;
        Ok(entry.map(|entry| entry.body.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let entry = MemoryEntry {
            body: Arc::from(value),
            ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn close(&self) -> CacheResult<()> {
        self.inner.run_pending_tasks().await;
        Ok(())
    }
}

// ============================================================================
// Disk backend
// ============================================================================

/// One cached body on disk.
#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    value: String,
    cached_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl DiskEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Persistent cache storing one JSON file per key.
///
/// Writes go to a uniquely named temp file that is renamed into place, so a
/// concurrent reader sees either the old entry or the new one.
#[derive(Debug, Clone)]
pub struct DiskCache {
    cache_dir: PathBuf,
}

impl DiskCache {
    /// Open (and create if needed) a cache rooted at `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.json"))
    }

    /// Delete every expired or unreadable entry. Returns the number removed.
    pub async fn purge_expired(&self) -> CacheResult<usize> {
        let now = Utc::now();
        let mut removed = 0;
        let mut dir = tokio::fs::read_dir(&self.cache_dir).await?;

        while let Some(file) = dir.next_entry().await? {
            let path = file.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let stale = match tokio::fs::read_to_string(&path).await {
                Ok(content) => serde_json::from_str::<DiskEntry>(&content)
                    .map(|entry| entry.is_expired(now))
                    .unwrap_or(true),
                Err(_) => continue,
            };
            if stale && tokio::fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl ResponseCache for DiskCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let path = self.entry_path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };

        let entry: DiskEntry = serde_json::from_str(&content)?;
        if entry.is_expired(Utc::now()) {
            let _ = tokio::fs::remove_file(&path).await;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let now = Utc::now();
        let expires_at = match ttl {
            Some(ttl) => {
                let ttl = chrono::Duration::from_std(ttl).map_err(|e| {
                    CacheError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
                })?;
                Some(now + ttl)
            }
            None => None,
        };
        let entry = DiskEntry {
            value: value.to_string(),
            cached_at: now,
            expires_at,
        };
        let json = serde_json::to_string(&entry)?;

        let tmp = self.cache_dir.join(format!("{key}.{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, self.entry_path(key)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheError::Io(e));
        }
        Ok(())
    }

    async fn close(&self) -> CacheResult<()> {
        let removed = self.purge_expired().await?;
        tracing::debug!(removed, dir = %self.cache_dir.display(), "Swept expired cache entries");
        Ok(())
    }
}
