//! Link shortening operations on top of a [`LinkStore`].

use crate::codec::{self, CodecError};
use crate::models::{LinkStats, ShortenedLink};
use crate::storage::{LinkStore, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Added to store ids before encoding so early links don't get one- or
/// two-character codes.
pub const DEFAULT_CODE_OFFSET: u64 = 10_000_000;

/// Auto-generated codes can collide with custom aliases that happen to be
/// valid base-62 numbers. Each collision burns one id.
const MAX_GENERATION_ATTEMPTS: usize = 8;

/// Paths served by fixed routes. `GET /health` answers itself and
/// `/shorten` only takes POST, so links under these names would never redirect.
pub const RESERVED_ALIASES: &[&str] = &["health", "shorten"];

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("alias '{0}' is already taken")]
    AliasTaken(String),
    #[error("no link found for code '{0}'")]
    NotFound(String),
    #[error("invalid alias '{alias}': {reason}")]
    InvalidAlias { alias: String, reason: &'static str },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("no free short code after {0} attempts")]
    CodeSpaceExhausted(usize),
    #[error("link {id} already carries a different short code")]
    CodeAlreadySet { id: i64 },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
}

impl ServiceError {
    fn from_storage(err: StorageError, short_code: &str) -> Self {
        match err {
            StorageError::AliasTaken(code) => ServiceError::AliasTaken(code),
            StorageError::NotFound => ServiceError::NotFound(short_code.to_string()),
            StorageError::CodeAlreadySet { id } => ServiceError::CodeAlreadySet { id },
            StorageError::Unavailable(e) => ServiceError::StorageUnavailable(e),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of a redirect lookup
#[derive(Debug, Clone)]
pub struct Resolution {
    pub original_url: String,
    /// Click count after this resolve was recorded
    pub clicks: i64,
    pub cache_hit: bool,
}

#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    offset: u64,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self::with_offset(store, DEFAULT_CODE_OFFSET)
    }

    pub fn with_offset(store: Arc<dyn LinkStore>, offset: u64) -> Self {
        Self { store, offset }
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    /// The short code an auto-generated link with this id receives
    pub fn code_for_id(&self, id: i64) -> Result<String, CodecError> {
        codec::encode_id(id, self.offset)
    }

    /// Create a link. An empty alias counts as no alias.
    pub async fn shorten(
        &self,
        original_url: &str,
        custom_alias: Option<&str>,
    ) -> ServiceResult<ShortenedLink> {
        let short_code = match custom_alias.filter(|alias| !alias.is_empty()) {
            Some(alias) => self.create_with_alias(original_url, alias).await?,
            None => self.create_generated(original_url).await?,
        };

        info!(short_code = %short_code, original_url, "created short link");

        Ok(ShortenedLink {
            short_code,
            original_url: original_url.to_string(),
        })
    }

    async fn create_with_alias(&self, original_url: &str, alias: &str) -> ServiceResult<String> {
        if !codec::is_valid_code(alias) {
            return Err(ServiceError::InvalidAlias {
                alias: alias.to_string(),
                reason: "only 0-9, a-z and A-Z are allowed",
            });
        }
        if RESERVED_ALIASES.contains(&alias) {
            return Err(ServiceError::InvalidAlias {
                alias: alias.to_string(),
                reason: "reserved path",
            });
        }

        self.store
            .create_with_alias(original_url, alias)
            .await
            .map_err(|e| ServiceError::from_storage(e, alias))?;

        Ok(alias.to_string())
    }

    async fn create_generated(&self, original_url: &str) -> ServiceResult<String> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let record = self
                .store
                .create_with_id(original_url)
                .await
                .map_err(|e| ServiceError::from_storage(e, ""))?;
            let code = self.code_for_id(record.id)?;

            match self.store.set_short_code(record.id, &code).await {
                Ok(()) => return Ok(code),
                Err(StorageError::AliasTaken(_)) => {
                    warn!(
                        id = record.id,
                        short_code = %code,
                        "generated code already claimed by an alias, leaving record orphaned"
                    );
                }
                Err(e) => return Err(ServiceError::from_storage(e, &code)),
            }
        }

        Err(ServiceError::CodeSpaceExhausted(MAX_GENERATION_ATTEMPTS))
    }

    /// Look up a code and count the click
    pub async fn resolve(&self, short_code: &str) -> ServiceResult<Resolution> {
        let lookup = self
            .store
            .lookup(short_code)
            .await
            .map_err(|e| ServiceError::from_storage(e, short_code))?;

        let clicks = self
            .store
            .increment_clicks(lookup.link.id)
            .await
            .map_err(|e| ServiceError::from_storage(e, short_code))?;

        debug!(short_code, clicks, cache_hit = lookup.metadata.cache_hit, "resolved short link");

        Ok(Resolution {
            original_url: lookup.link.original_url,
            clicks,
            cache_hit: lookup.metadata.cache_hit,
        })
    }

    pub async fn get_stats(&self, short_code: &str) -> ServiceResult<LinkStats> {
        let record = self
            .store
            .find_by_code(short_code)
            .await
            .map_err(|e| ServiceError::from_storage(e, short_code))?;

        Ok(LinkStats::from_record(short_code, record))
    }
}
