use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LinkRecord {
    pub id: i64,
    /// `None` only between the two writes of an auto-generated link.
    pub short_code: Option<String>,
    pub original_url: String,
    pub created_at: i64,
    pub clicks: i64,
}

/// Result of a successful shorten operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortenedLink {
    pub short_code: String,
    pub original_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub short_code: String,
    pub original_url: String,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl LinkStats {
    pub fn from_record(short_code: impl Into<String>, record: LinkRecord) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: record.original_url,
            total_clicks: record.clicks,
            created_at: DateTime::from_timestamp(record.created_at, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original: String,
}
