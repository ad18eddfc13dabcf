use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::service::DEFAULT_CODE_OFFSET;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// Public prefix used to build full short URLs
    pub base_url: String,
    pub cache: CacheConfig,
    pub code_offset: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Memory,
    Sqlite,
    Postgres,
}

impl DatabaseBackend {
    /// Pick a backend from the shape of a connection URL
    pub fn infer(database_url: &str) -> Self {
        let url = database_url.to_lowercase();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseBackend::Postgres
        } else if url == "memory" || url.starts_with("memory://") {
            DatabaseBackend::Memory
        } else {
            DatabaseBackend::Sqlite
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "memory" | "inmemory" => Some(DatabaseBackend::Memory),
            "sqlite" => Some(DatabaseBackend::Sqlite),
            "postgres" | "postgresql" => Some(DatabaseBackend::Postgres),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: u64,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
            ttl_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://./nanolink.db?mode=rwc".to_string());

        let backend = match lookup("DATABASE_BACKEND") {
            Some(value) => DatabaseBackend::parse(&value).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{value}', inferring from DATABASE_URL. Supported values: memory, sqlite, postgres"
                );
                DatabaseBackend::infer(&database_url)
            }),
            None => DatabaseBackend::infer(&database_url),
        };

        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 8000u16)?;

        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let defaults = CacheConfig::default();
        let cache_enabled = lookup("CACHE_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(defaults.enabled);
        let cache_max_entries = parse_or(&lookup, "CACHE_MAX_ENTRIES", defaults.max_entries)?;
        let cache_ttl_secs = parse_or(&lookup, "CACHE_TTL_SECS", defaults.ttl_secs)?;

        let code_offset = parse_or(&lookup, "CODE_OFFSET", DEFAULT_CODE_OFFSET)?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            base_url,
            cache: CacheConfig {
                enabled: cache_enabled,
                max_entries: cache_max_entries,
                ttl_secs: cache_ttl_secs,
            },
            code_offset,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{value}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.code_offset, 10_000_000);
        assert!(config.cache.enabled);
    }

    #[test]
    fn backend_is_inferred_from_url() {
        let config = config_from(&[("DATABASE_URL", "postgres://u:p@db/links")]).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);

        let config = config_from(&[("DATABASE_URL", "postgresql://db/links")]).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);

        let config = config_from(&[("DATABASE_URL", "memory")]).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
    }

    #[test]
    fn explicit_backend_wins() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_BACKEND", "memory"),
        ])
        .unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = config_from(&[("BASE_URL", "https://nano.link/")]).unwrap();
        assert_eq!(config.base_url, "https://nano.link");
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config_from(&[("CODE_OFFSET", "-1")]).is_err());
    }

    #[test]
    fn cache_can_be_disabled() {
        let config = config_from(&[("CACHE_ENABLED", "false"), ("CACHE_TTL_SECS", "10")]).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 10);
    }
}
