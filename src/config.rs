use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::application::cache::DEFAULT_TTL;
use crate::domain::pagination::MAX_LIMIT;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub cache_ttl: Duration,
    pub max_page_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://tasks.db".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            db_max_connections: 5,
            cache_ttl: DEFAULT_TTL,
            max_page_size: MAX_LIMIT,
        }
    }
}

impl Config {
    /// Reads `DATABASE_URL`, `HOST`, `PORT`, `DB_MAX_CONNECTIONS`,
    /// `CACHE_TTL_SECS` and `MAX_PAGE_SIZE`; unset or unparseable values keep
    /// their defaults.
    pub fn from_env() -> Self { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT").and_then(|v| v.trim().parse().ok()).unwrap_or(defaults.port),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.db_max_connections),
            cache_ttl: parsed("CACHE_TTL_SECS").map_or(defaults.cache_ttl, |s| Duration::from_secs(s.max(1))),
            max_page_size: parsed("MAX_PAGE_SIZE").filter(|n| *n > 0).unwrap_or(defaults.max_page_size),
        }
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        SocketAddr::from_str(&format!("{}:{}", self.host, self.port))
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
