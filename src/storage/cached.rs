use crate::models::LinkRecord;
use crate::storage::{LinkStore, LookupMetadata, LookupResult, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache for redirect lookups.
///
/// Code-to-URL mappings never change once written, so cached entries only
/// go stale in their click counts. Stats reads go to `find_by_code`, which
/// always hits the underlying store.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn LinkStore>,
    /// Lookup cache keyed by short code (Moka cache)
    read_cache: Cache<String, LinkRecord>,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn LinkStore>, max_cache_entries: u64, ttl_secs: u64) -> Self {
        let read_cache = Cache::builder()
            .max_capacity(max_cache_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, read_cache }
    }

    pub fn entry_count(&self) -> u64 {
        self.read_cache.entry_count()
    }
}

#[async_trait]
impl LinkStore for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn create_with_id(&self, original_url: &str) -> StorageResult<LinkRecord> {
        self.inner.create_with_id(original_url).await
    }

    async fn set_short_code(&self, id: i64, short_code: &str) -> StorageResult<()> {
        self.inner.set_short_code(id, short_code).await
    }

    async fn create_with_alias(
        &self,
        original_url: &str,
        short_code: &str,
    ) -> StorageResult<LinkRecord> {
        let record = self
            .inner
            .create_with_alias(original_url, short_code)
            .await?;

        // Cache the newly created link
        self.read_cache
            .insert(short_code.to_string(), record.clone())
            .await;

        Ok(record)
    }

    async fn find_by_code(&self, short_code: &str) -> StorageResult<LinkRecord> {
        self.inner.find_by_code(short_code).await
    }

    async fn lookup(&self, short_code: &str) -> StorageResult<LookupResult> {
        if let Some(link) = self.read_cache.get(short_code).await {
            return Ok(LookupResult {
                link,
                metadata: LookupMetadata { cache_hit: true },
            });
        }

        // Misses are not cached: the code may be claimed a moment later
        let link = self.inner.find_by_code(short_code).await?;
        self.read_cache
            .insert(short_code.to_string(), link.clone())
            .await;

        Ok(LookupResult {
            link,
            metadata: LookupMetadata { cache_hit: false },
        })
    }

    async fn increment_clicks(&self, id: i64) -> StorageResult<i64> {
        self.inner.increment_clicks(id).await
    }

    async fn close(&self) {
        self.read_cache.invalidate_all();
        self.inner.close().await;
    }
}
