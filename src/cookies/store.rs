//! Cookie store infrastructure.
//!
//! A **cookie store** is the durable home of cookie records. Instead of
//! keeping a map of maps in memory, a store persists every record and answers
//! the questions a cookie jar needs answered:
//!
//! - **mutate**: insert records, delete them by scope, drop session cookies,
//!   sweep expired cookies;
//! - **retrieve by domain**: cookies stored under one exact domain;
//! - **retrieve by request**: every cookie that may apply to a request,
//!   narrowed by private suffix and validated record by record;
//! - **scan**: walk the whole store in pages.
//!
//! Accept/return decisions are delegated to a [`CookiePolicy`](crate::cookies::CookiePolicy).
//!
//! This module exports one implementation:
//! - [`SqliteCookieStore`]: SQLite-backed store (good for concurrency and scale).
//!
//! ## Example
//! ```rust
//! use gosub_cookie_store::cookies::{Cookie, CookieRequest, CookieStore, SqliteCookieStore};
//!
//! # fn main() -> gosub_cookie_store::Result<()> {
//! let store = SqliteCookieStore::in_memory()?;
//! store.set_cookie(&Cookie::new("session", Some("abc"), "example.com"))?;
//!
//! let request = CookieRequest::parse("https://www.example.com/")?;
//! let cookies = store.cookies_for_request(&request)?;
//! assert_eq!(cookies.len(), 1);
//! # Ok(()) }
//! ```
mod sqlite;

use crate::cookies::{Cookie, CookieId, CookieRequest};
use crate::errors::{CookieStoreError, Result};

/// SQLite-backed cookie store.
pub use sqlite::{CookieScan, SqliteCookieStore};

/// A lazy sequence of cookies produced by [`CookieStore::scan`].
pub type CookieIter<'a> = Box<dyn Iterator<Item = Result<Cookie>> + 'a>;

/// Durable, queryable cookie storage.
///
/// Implementations must be `Send + Sync` and safe for concurrent use.
/// Deleting something that does not exist is not an error: every delete reports
/// the number of removed records, which may be zero.
pub trait CookieStore: Send + Sync {
    /// Stores all `cookies` atomically and returns their assigned ids, in order.
    ///
    /// Every record is validated first; a single invalid record rejects the
    /// whole batch before anything is written.
    fn insert_many(&self, cookies: &[Cookie]) -> Result<Vec<CookieId>>;

    /// Removes every record.
    fn delete_all(&self) -> Result<usize>;

    /// Removes records whose domain equals `domain` exactly. Subdomains are untouched.
    fn delete_by_domain(&self, domain: &str) -> Result<usize>;

    /// Removes records matching `domain` and `path` exactly.
    fn delete_by_domain_and_path(&self, domain: &str, path: &str) -> Result<usize>;

    /// Removes records matching `domain`, `path` and `name` exactly.
    fn delete_by_domain_path_and_name(&self, domain: &str, path: &str, name: &str) -> Result<usize>;

    /// Removes every cookie marked `discard`, whatever its expiry.
    fn delete_session_cookies(&self) -> Result<usize>;

    /// Removes every cookie with `expires <= cutoff`. Cookies without expiry are kept.
    fn delete_expired_before(&self, cutoff: i64) -> Result<usize>;

    /// Cookies stored under exactly `domain` that the policy allows for `request`,
    /// in insertion order.
    fn cookies_for_domain(&self, domain: &str, request: &CookieRequest) -> Result<Vec<Cookie>>;

    /// Every cookie the policy allows for `request`, in insertion order.
    fn cookies_for_request(&self, request: &CookieRequest) -> Result<Vec<Cookie>>;

    /// Walks all records in id order, one page at a time.
    fn scan(&self) -> Result<CookieIter<'_>>;

    /// Number of stored records.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Stores a single cookie.
    fn set_cookie(&self, cookie: &Cookie) -> Result<CookieId> {
        let ids = self.insert_many(std::slice::from_ref(cookie))?;
        ids.into_iter()
            .next()
            .ok_or_else(|| CookieStoreError::Validation("no id assigned to inserted cookie".into()))
    }

    /// Clears cookies by scope, the way a cookie jar's `clear` does:
    ///
    /// - no arguments: everything;
    /// - `domain`: that domain;
    /// - `domain` + `path`: that path within the domain;
    /// - `domain` + `path` + `name`: that single cookie.
    ///
    /// A `path` without `domain`, or a `name` without `path`, is a validation error.
    fn clear(&self, domain: Option<&str>, path: Option<&str>, name: Option<&str>) -> Result<usize> {
        match (domain, path, name) {
            (None, None, None) => self.delete_all(),
            (Some(domain), None, None) => self.delete_by_domain(domain),
            (Some(domain), Some(path), None) => self.delete_by_domain_and_path(domain, path),
            (Some(domain), Some(path), Some(name)) => {
                self.delete_by_domain_path_and_name(domain, path, name)
            }
            (_, None, Some(_)) => Err(CookieStoreError::Validation(
                "clearing by name requires a domain and a path".into(),
            )),
            (None, Some(_), _) => Err(CookieStoreError::Validation(
                "clearing by path requires a domain".into(),
            )),
        }
    }

    /// Removes cookies that have expired by the current wall clock time.
    fn clear_expired_cookies(&self) -> Result<usize> {
        self.delete_expired_before(crate::cookies::unix_now())
    }
}
