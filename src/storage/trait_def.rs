use crate::models::LinkRecord;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code '{0}' is already taken")]
    AliasTaken(String),
    #[error("link not found")]
    NotFound,
    #[error("link {id} already has a different short code")]
    CodeAlreadySet { id: i64 },
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

impl StorageError {
    /// Wrap a database driver error, mapping unique-constraint violations on
    /// `short_code` to [`StorageError::AliasTaken`].
    pub fn from_sqlx(err: sqlx::Error, short_code: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::AliasTaken(short_code.to_string())
            }
            _ => StorageError::Unavailable(err.into()),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Unavailable(err.into())
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Extra information about how a lookup was served
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupMetadata {
    pub cache_hit: bool,
}

#[derive(Debug, Clone)]
pub struct LookupResult {
    pub link: LinkRecord,
    pub metadata: LookupMetadata,
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Allocate a fresh id and persist a record without a short code
    async fn create_with_id(&self, original_url: &str) -> StorageResult<LinkRecord>;

    /// Attach a short code to an existing record.
    ///
    /// Setting the code a record already carries is a no-op, so the second
    /// half of auto-generation can be retried.
    async fn set_short_code(&self, id: i64, short_code: &str) -> StorageResult<()>;

    /// Insert a record with a caller-chosen code in one atomic step
    async fn create_with_alias(
        &self,
        original_url: &str,
        short_code: &str,
    ) -> StorageResult<LinkRecord>;

    /// Authoritative lookup by short code
    async fn find_by_code(&self, short_code: &str) -> StorageResult<LinkRecord>;

    /// Lookup used on the redirect path. May be served from a cache, so the
    /// click count in the returned record can be stale.
    async fn lookup(&self, short_code: &str) -> StorageResult<LookupResult> {
        let link = self.find_by_code(short_code).await?;
        Ok(LookupResult {
            link,
            metadata: LookupMetadata::default(),
        })
    }

    /// Atomically add one click and return the new total
    async fn increment_clicks(&self, id: i64) -> StorageResult<i64>;

    /// Release backend resources
    async fn close(&self) {}
}
