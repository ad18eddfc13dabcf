pub mod cached;
pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use cached::CachedStorage;
pub use memory::InMemoryStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{LinkStore, LookupMetadata, LookupResult, StorageError, StorageResult};

use crate::config::{CacheConfig, DatabaseBackend, DatabaseConfig};
use std::sync::Arc;
use tracing::info;

/// Connect to the configured backend, create the schema, and wrap the store
/// in a lookup cache if enabled.
pub async fn connect(
    database: &DatabaseConfig,
    cache: &CacheConfig,
) -> anyhow::Result<Arc<dyn LinkStore>> {
    let storage: Arc<dyn LinkStore> = match database.backend {
        DatabaseBackend::Memory => {
            info!("Using in-memory storage, links will not survive a restart");
            Arc::new(InMemoryStorage::new())
        }
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", database.url);
            Arc::new(SqliteStorage::new(&database.url, database.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage");
            Arc::new(PostgresStorage::new(&database.url, database.max_connections).await?)
        }
    };

    storage.init().await?;

    if cache.enabled {
        info!(
            max_entries = cache.max_entries,
            ttl_secs = cache.ttl_secs,
            "Lookup cache enabled"
        );
        Ok(Arc::new(CachedStorage::new(
            storage,
            cache.max_entries,
            cache.ttl_secs,
        )))
    } else {
        Ok(storage)
    }
}
