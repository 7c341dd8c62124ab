//! SQLite-backed cookie store.
//!
//! `SqliteCookieStore` keeps every cookie as one row of a single `cookies`
//! table with a secondary index on `domain`. Nothing is cached in memory, so
//! the store scales to cookie populations far larger than a map-based jar
//! would comfortably hold.
//!
//! ## Design
//! - [`schema`]: table/index creation and per-connection pragmas.
//! - [`session`]: the unit of work. Every statement runs inside
//!   [`SqliteCookieStore::with_session`], which commits on success and rolls
//!   back on error.
//! - [`codec`]: row <-> [`Cookie`](crate::cookies::Cookie) conversion.
//! - [`mutation`], [`retrieval`], [`scan`]: the operation groups of
//!   [`CookieStore`].
//!
//! ## Concurrency
//! - Database access goes through an `r2d2` pool for safe multi-threaded use.
//!   File databases run in WAL mode so readers do not block the writer.
//! - In-memory databases are private to one connection, so their pool holds
//!   exactly one connection that is never recycled.
//! - The policy can be swapped at runtime with [`SqliteCookieStore::set_policy`].
//!
//! ## Example
//! ```rust
//! use gosub_cookie_store::config::CookieStoreConfig;
//! use gosub_cookie_store::cookies::{Cookie, CookieStore, SqliteCookieStore};
//!
//! # fn main() -> gosub_cookie_store::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let store = SqliteCookieStore::open(CookieStoreConfig::file(dir.path().join("cookies.sqlite3")))?;
//!
//! store.set_cookie(&Cookie::new("a", Some("b"), "example.com"))?;
//! assert_eq!(store.len()?, 1);
//! # Ok(()) }
//! ```

mod codec;
mod mutation;
mod retrieval;
mod scan;
mod schema;
mod session;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::{CookieStoreConfig, DatabaseLocation};
use crate::cookies::store::{CookieIter, CookieStore};
use crate::cookies::{
    Cookie, CookieId, CookiePolicyHandle, CookieRequest, DefaultCookiePolicy, PublicSuffixHandle,
    SuffixList,
};
use crate::errors::Result;

pub use scan::CookieScan;

/// A SQLite-based cookie store that persists cookies across sessions.
pub struct SqliteCookieStore {
    /// Connection pool for SQLite database (so it can run multithreaded)
    pool: Pool<SqliteConnectionManager>,
    /// Store configuration
    config: CookieStoreConfig,
    /// Policy consulted for every retrieval
    policy: RwLock<CookiePolicyHandle>,
    /// Public suffix lookups for request-wide retrieval
    suffixes: PublicSuffixHandle,
}

impl SqliteCookieStore {
    /// Opens (or creates) the database described by `config` with the
    /// [`DefaultCookiePolicy`] and the built-in [`SuffixList`].
    pub fn open(config: CookieStoreConfig) -> Result<Self> {
        Self::with_collaborators(
            config,
            Arc::new(DefaultCookiePolicy::default()),
            Arc::new(SuffixList::default()),
        )
    }

    /// Opens a private in-memory store with default settings.
    pub fn in_memory() -> Result<Self> {
        Self::open(CookieStoreConfig::in_memory())
    }

    /// Opens the database described by `config` using the given policy and
    /// public suffix list, and makes sure the schema exists.
    ///
    /// Schema creation failures are fatal: no store is returned.
    pub fn with_collaborators(
        config: CookieStoreConfig,
        policy: CookiePolicyHandle,
        suffixes: PublicSuffixHandle,
    ) -> Result<Self> {
        config.validate()?;

        let pool = build_pool(&config)?;
        let store = Self {
            pool,
            config,
            policy: RwLock::new(policy),
            suffixes,
        };

        store.with_session(schema::ensure_schema)?;
        log::info!("Opened cookie store at {}", store.location());

        Ok(store)
    }

    pub fn config(&self) -> &CookieStoreConfig {
        &self.config
    }

    /// Human readable database location.
    pub fn location(&self) -> String {
        match &self.config.location {
            DatabaseLocation::File(path) => path.display().to_string(),
            DatabaseLocation::Memory => ":memory:".to_string(),
        }
    }

    /// Current policy handle.
    pub fn policy(&self) -> CookiePolicyHandle {
        self.policy.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the policy used by subsequent retrievals.
    pub fn set_policy(&self, policy: CookiePolicyHandle) {
        *self.policy.write().unwrap_or_else(PoisonError::into_inner) = policy;
    }

    pub fn suffixes(&self) -> &PublicSuffixHandle {
        &self.suffixes
    }

    /// Closes the store, releasing every pooled connection.
    pub fn close(self) {
        log::debug!("Closing cookie store at {}", self.location());
        drop(self);
    }
}

fn build_pool(config: &CookieStoreConfig) -> Result<Pool<SqliteConnectionManager>> {
    let busy_timeout = config.busy_timeout();
    let journal_mode = config.journal_mode;

    let manager = match &config.location {
        DatabaseLocation::File(path) => SqliteConnectionManager::file(path),
        DatabaseLocation::Memory => SqliteConnectionManager::memory(),
    }
    .with_init(move |c| schema::configure_connection(c, busy_timeout, journal_mode));

    let builder = Pool::builder().connection_timeout(busy_timeout.max(Duration::from_secs(1)));
    let pool = match config.location {
        // Every in-memory connection is its own database: keep exactly one alive.
        DatabaseLocation::Memory => builder
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?,
        DatabaseLocation::File(_) => builder.max_size(config.max_connections).build(manager)?,
    };

    Ok(pool)
}

impl fmt::Debug for SqliteCookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCookieStore")
            .field("location", &self.location())
            .finish_non_exhaustive()
    }
}

impl CookieStore for SqliteCookieStore {
    fn insert_many(&self, cookies: &[Cookie]) -> Result<Vec<CookieId>> {
        SqliteCookieStore::insert_many(self, cookies)
    }

    fn delete_all(&self) -> Result<usize> {
        SqliteCookieStore::delete_all(self)
    }

    fn delete_by_domain(&self, domain: &str) -> Result<usize> {
        SqliteCookieStore::delete_by_domain(self, domain)
    }

    fn delete_by_domain_and_path(&self, domain: &str, path: &str) -> Result<usize> {
        SqliteCookieStore::delete_by_domain_and_path(self, domain, path)
    }

    fn delete_by_domain_path_and_name(&self, domain: &str, path: &str, name: &str) -> Result<usize> {
        SqliteCookieStore::delete_by_domain_path_and_name(self, domain, path, name)
    }

    fn delete_session_cookies(&self) -> Result<usize> {
        SqliteCookieStore::delete_session_cookies(self)
    }

    fn delete_expired_before(&self, cutoff: i64) -> Result<usize> {
        SqliteCookieStore::delete_expired_before(self, cutoff)
    }

    fn cookies_for_domain(&self, domain: &str, request: &CookieRequest) -> Result<Vec<Cookie>> {
        SqliteCookieStore::cookies_for_domain(self, domain, request)
    }

    fn cookies_for_request(&self, request: &CookieRequest) -> Result<Vec<Cookie>> {
        SqliteCookieStore::cookies_for_request(self, request)
    }

    fn scan(&self) -> Result<CookieIter<'_>> {
        Ok(Box::new(SqliteCookieStore::scan(self)?))
    }

    fn len(&self) -> Result<usize> {
        SqliteCookieStore::len(self)
    }
}
