//! Cookie store configuration.
//!
//! `CookieStoreConfig` tells a [`SqliteCookieStore`](crate::cookies::SqliteCookieStore)
//! where its database lives and how the connection pool and scanner behave.
//!
//! `CookieStoreConfig` provides sensible defaults via [`Default`] and a fluent
//! [`CookieStoreConfig::builder()`] for customization with validation. It can
//! also be deserialized, so embedding applications can keep it in their own
//! JSON configuration files.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_cookie_store::config::{CookieStoreConfig, DatabaseLocation};
//! let cfg = CookieStoreConfig::default();
//! assert_eq!(cfg.page_size, 1000);
//! assert_eq!(cfg.location, DatabaseLocation::Memory);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_cookie_store::config::{CookieStoreConfig, JournalMode};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CookieStoreConfig::builder()
//!     .file("cookies.sqlite3")
//!     .page_size(250)
//!     .max_connections(4)
//!     .journal_mode(JournalMode::Wal)
//!     .build()?; // returns Result<CookieStoreConfig, CookieStoreConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `location`: database file path, or a private in-memory database (default).
//! - `page_size`: rows fetched per round trip while scanning (default: 1000).
//! - `busy_timeout_ms`: how long a connection waits on a locked database (default: 5000).
//! - `max_connections`: pool size for file databases (default: 8). In-memory
//!   databases always use exactly one connection.
//! - `journal_mode`: SQLite journal mode (default: WAL).

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Result;

const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Where the cookie database is kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseLocation {
    /// A database file on disk. Created if it does not exist.
    File(PathBuf),
    /// A private in-memory database that lives as long as the store.
    #[default]
    Memory,
}

/// SQLite journal mode applied to every pooled connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// Write-ahead log: concurrent readers with a single writer.
    #[default]
    Wal,
    /// Rollback journal that is deleted after each transaction.
    Delete,
}

impl JournalMode {
    pub fn pragma_value(self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CookieStoreConfig {
    pub location: DatabaseLocation,
    pub page_size: usize,
    pub busy_timeout_ms: u64,
    pub max_connections: u32,
    pub journal_mode: JournalMode,
}

impl Default for CookieStoreConfig {
    fn default() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            page_size: DEFAULT_PAGE_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            journal_mode: JournalMode::Wal,
        }
    }
}

impl CookieStoreConfig {
    pub fn builder() -> CookieStoreConfigBuilder {
        CookieStoreConfigBuilder::default()
    }

    /// Default configuration for a database file at `path`.
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// Default configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration document. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CookieStoreConfig = serde_json::from_str(json)?;
        validate(&config)?;
        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Validates the configuration as-is (useful for configs built by hand).
    pub fn validate(&self) -> std::result::Result<(), CookieStoreConfigError> {
        validate(self)
    }
}

/// Builder for [`CookieStoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct CookieStoreConfigBuilder {
    inner: CookieStoreConfig,
}

impl CookieStoreConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CookieStoreConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn location(self, location: DatabaseLocation) -> Self { self.map(|c| c.location = location) }
    pub fn file<P: Into<PathBuf>>(self, path: P) -> Self { self.map(|c| c.location = DatabaseLocation::File(path.into())) }
    pub fn in_memory(self) -> Self { self.map(|c| c.location = DatabaseLocation::Memory) }
    pub fn page_size(self, n: usize) -> Self { self.map(|c| c.page_size = n) }
    pub fn busy_timeout(self, timeout: Duration) -> Self {
        self.map(|c| c.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    }
    pub fn max_connections(self, n: u32) -> Self { self.map(|c| c.max_connections = n) }
    pub fn journal_mode(self, mode: JournalMode) -> Self { self.map(|c| c.journal_mode = mode) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut CookieStoreConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> std::result::Result<CookieStoreConfig, CookieStoreConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieStoreConfigError {
    #[error("page_size must be at least 1")]
    ZeroPageSize,
    #[error("max_connections must be at least 1")]
    ZeroConnections,
    #[error("database file path is empty")]
    EmptyPath,
}

fn validate(c: &CookieStoreConfig) -> std::result::Result<(), CookieStoreConfigError> {
    if c.page_size == 0 {
        return Err(CookieStoreConfigError::ZeroPageSize);
    }
    if c.max_connections == 0 {
        return Err(CookieStoreConfigError::ZeroConnections);
    }
    if let DatabaseLocation::File(path) = &c.location {
        if path.as_os_str().is_empty() {
            return Err(CookieStoreConfigError::EmptyPath);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = CookieStoreConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.page_size, 1000);
        assert_eq!(cfg.journal_mode, JournalMode::Wal);
        assert_eq!(cfg.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert_eq!(
            CookieStoreConfig::builder().page_size(0).build(),
            Err(CookieStoreConfigError::ZeroPageSize)
        );
        assert_eq!(
            CookieStoreConfig::builder().max_connections(0).build(),
            Err(CookieStoreConfigError::ZeroConnections)
        );
        assert_eq!(
            CookieStoreConfig::builder().file("").build(),
            Err(CookieStoreConfigError::EmptyPath)
        );
    }

    #[test]
    fn builder_applies_settings() {
        let cfg = CookieStoreConfig::builder()
            .file("/tmp/cookies.db")
            .page_size(10)
            .busy_timeout(Duration::from_millis(250))
            .journal_mode(JournalMode::Delete)
            .build()
            .unwrap();

        assert_eq!(cfg.location, DatabaseLocation::File("/tmp/cookies.db".into()));
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.busy_timeout_ms, 250);
        assert_eq!(cfg.journal_mode.pragma_value(), "DELETE");
    }

    #[test]
    fn json_fills_in_defaults() {
        let cfg = CookieStoreConfig::from_json(r#"{ "location": { "file": "jar.db" }, "page_size": 50 }"#).unwrap();
        assert_eq!(cfg.location, DatabaseLocation::File("jar.db".into()));
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.max_connections, 8);

        let cfg = CookieStoreConfig::from_json(r#"{ "location": "memory" }"#).unwrap();
        assert_eq!(cfg.location, DatabaseLocation::Memory);

        let err = CookieStoreConfig::from_json(r#"{ "page_size": 0 }"#).unwrap_err();
        assert!(err.is_validation());
    }
}
