//! Inserts and deletes.
//!
//! Deletes report the number of rows removed. Removing something that is not
//! there is a normal outcome and reports zero.

use r2d2_sqlite::rusqlite::params;

use super::{codec, SqliteCookieStore};
use crate::cookies::{Cookie, CookieId};
use crate::errors::{CookieStoreError, Result};

const DELETE_ALL: &str = "DELETE FROM cookies";
const DELETE_BY_DOMAIN: &str = "DELETE FROM cookies WHERE domain = ?1";
const DELETE_BY_DOMAIN_AND_PATH: &str = "DELETE FROM cookies WHERE domain = ?1 AND path = ?2";
const DELETE_BY_DOMAIN_PATH_AND_NAME: &str =
    "DELETE FROM cookies WHERE domain = ?1 AND path = ?2 AND name = ?3";
const DELETE_SESSION_COOKIES: &str = "DELETE FROM cookies WHERE discard = 1";
const DELETE_EXPIRED_BEFORE: &str = "DELETE FROM cookies WHERE expires IS NOT NULL AND expires <= ?1";
const COUNT_ALL: &str = "SELECT COUNT(*) FROM cookies";

impl SqliteCookieStore {
    /// Inserts all `cookies` in one transaction and returns their ids in input order.
    ///
    /// All records are validated before any I/O; one bad record rejects the batch.
    pub fn insert_many(&self, cookies: &[Cookie]) -> Result<Vec<CookieId>> {
        for cookie in cookies {
            cookie.validate()?;
        }
        if cookies.is_empty() {
            return Ok(Vec::new());
        }

        self.with_session(|tx| {
            log::debug!("inserting {} cookies", cookies.len());
            let mut stmt = tx.prepare_cached(codec::INSERT_COOKIE)?;
            cookies.iter().map(|cookie| codec::insert(&mut stmt, cookie)).collect()
        })
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.delete("all", |tx| Ok(tx.execute(DELETE_ALL, [])?))
    }

    /// Removes cookies whose domain is exactly `domain`; `a.example.com` is not
    /// touched when deleting `example.com`.
    pub fn delete_by_domain(&self, domain: &str) -> Result<usize> {
        require("domain", domain)?;
        self.delete("by domain", |tx| Ok(tx.execute(DELETE_BY_DOMAIN, params![domain])?))
    }

    pub fn delete_by_domain_and_path(&self, domain: &str, path: &str) -> Result<usize> {
        require("domain", domain)?;
        require("path", path)?;
        self.delete("by domain and path", |tx| {
            Ok(tx.execute(DELETE_BY_DOMAIN_AND_PATH, params![domain, path])?)
        })
    }

    pub fn delete_by_domain_path_and_name(&self, domain: &str, path: &str, name: &str) -> Result<usize> {
        require("domain", domain)?;
        require("path", path)?;
        require("name", name)?;
        self.delete("by domain, path and name", |tx| {
            Ok(tx.execute(DELETE_BY_DOMAIN_PATH_AND_NAME, params![domain, path, name])?)
        })
    }

    /// Removes every cookie marked `discard`, whatever its expiry.
    pub fn delete_session_cookies(&self) -> Result<usize> {
        self.delete("session cookies", |tx| Ok(tx.execute(DELETE_SESSION_COOKIES, [])?))
    }

    /// Removes cookies with `expires <= cutoff`. The store never reads the clock
    /// itself; see [`clear_expired_cookies`](crate::cookies::CookieStore::clear_expired_cookies).
    pub fn delete_expired_before(&self, cutoff: i64) -> Result<usize> {
        self.delete("expired cookies", |tx| Ok(tx.execute(DELETE_EXPIRED_BEFORE, params![cutoff])?))
    }

    /// Number of stored cookies.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self.with_session(|tx| Ok(tx.query_row(COUNT_ALL, [], |row| row.get(0))?))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn delete<F>(&self, what: &str, statement: F) -> Result<usize>
    where
        F: FnOnce(&r2d2_sqlite::rusqlite::Transaction<'_>) -> Result<usize>,
    {
        let removed = self.with_session(statement)?;
        log::debug!("deleted {removed} cookies ({what})");
        Ok(removed)
    }
}

/// Scoped deletes need their scope: an empty argument is rejected, never
/// widened into "delete everything".
fn require(argument: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CookieStoreError::Validation(format!("{argument} must not be empty")));
    }
    Ok(())
}
