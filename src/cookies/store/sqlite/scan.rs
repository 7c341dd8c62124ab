//! Paged walk over the whole store.
//!
//! The row count is read once when the scan starts and pages are fetched with
//! `LIMIT/OFFSET` in id order. Rows written by others while a scan runs may be
//! skipped or seen twice; callers that need an exact snapshot must not mutate
//! the store during the scan.

use std::collections::VecDeque;

use r2d2_sqlite::rusqlite::params;

use super::{codec, SqliteCookieStore};
use crate::cookies::Cookie;
use crate::errors::{CookieStoreError, Result};

/// Lazy, forward-only iterator over every stored cookie. Not restartable:
/// call [`SqliteCookieStore::scan`] again for a fresh pass.
#[derive(Debug)]
pub struct CookieScan<'a> {
    store: &'a SqliteCookieStore,
    total: usize,
    offset: usize,
    page_size: usize,
    page: VecDeque<Cookie>,
    done: bool,
}

impl SqliteCookieStore {
    /// Starts a scan using the configured page size.
    pub fn scan(&self) -> Result<CookieScan<'_>> {
        self.scan_with_page_size(self.config.page_size)
    }

    pub fn scan_with_page_size(&self, page_size: usize) -> Result<CookieScan<'_>> {
        if page_size == 0 {
            return Err(CookieStoreError::Validation("scan page size must be positive".into()));
        }
        let total = self.len()?;
        log::debug!("scanning {total} cookies, {page_size} per page");

        Ok(CookieScan {
            store: self,
            total,
            offset: 0,
            page_size,
            page: VecDeque::new(),
            done: total == 0,
        })
    }
}

impl CookieScan<'_> {
    /// Row count captured when the scan started.
    pub fn total(&self) -> usize {
        self.total
    }

    fn fetch_page(&mut self) -> Result<()> {
        let sql = format!("SELECT {} FROM cookies ORDER BY id LIMIT ?1 OFFSET ?2", codec::SELECT_COLUMNS);
        let limit = i64::try_from(self.page_size).unwrap_or(i64::MAX);
        let offset = i64::try_from(self.offset).unwrap_or(i64::MAX);

        let rows = self.store.with_session(|tx| {
            let mut stmt = tx.prepare_cached(&sql)?;
            let rows = stmt.query_map(params![limit, offset], codec::decode_row)?;
            Ok(rows.collect::<r2d2_sqlite::rusqlite::Result<Vec<_>>>()?)
        })?;
        log::trace!("fetched {} cookies at offset {}", rows.len(), self.offset);

        self.offset += self.page_size;
        if rows.is_empty() || self.offset >= self.total {
            self.done = true;
        }
        self.page.extend(rows);
        Ok(())
    }
}

impl Iterator for CookieScan<'_> {
    type Item = Result<Cookie>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(cookie) = self.page.pop_front() {
            return Some(Ok(cookie));
        }
        if self.done {
            return None;
        }
        if let Err(err) = self.fetch_page() {
            self.done = true;
            return Some(Err(err));
        }
        self.page.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookieStoreConfig;

    fn populated(n: usize, page_size: usize) -> SqliteCookieStore {
        let config = CookieStoreConfig::builder().in_memory().page_size(page_size).build().unwrap();
        let store = SqliteCookieStore::open(config).unwrap();
        let cookies: Vec<Cookie> = (0..n)
            .map(|i| Cookie::new(format!("c{i}"), Some("v"), format!("d{}.example.com", i % 7)))
            .collect();
        store.insert_many(&cookies).unwrap();
        store
    }

    #[test]
    fn empty_store_scans_to_nothing() {
        let store = SqliteCookieStore::in_memory().unwrap();
        let mut scan = store.scan().unwrap();
        assert_eq!(scan.total(), 0);
        assert!(scan.next().is_none());
    }

    #[test]
    fn scan_crosses_page_boundaries_in_id_order() {
        let store = populated(25, 10);
        let cookies: Vec<Cookie> = store.scan().unwrap().map(|c| c.unwrap()).collect();

        assert_eq!(cookies.len(), 25);
        let ids: Vec<i64> = cookies.iter().map(|c| c.id().unwrap().as_i64()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(cookies[0].name, "c0");
        assert_eq!(cookies[24].name, "c24");
    }

    #[test]
    fn exact_multiple_of_page_size() {
        let store = populated(20, 5);
        assert_eq!(store.scan().unwrap().count(), 20);
        assert_eq!(store.scan_with_page_size(1).unwrap().count(), 20);
        assert_eq!(store.scan_with_page_size(1000).unwrap().count(), 20);
    }

    #[test]
    fn each_scan_is_independent() {
        let store = populated(3, 2);
        let mut first = store.scan().unwrap();
        first.next().unwrap().unwrap();
        assert_eq!(store.scan().unwrap().count(), 3);
        assert_eq!(first.count(), 2);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let store = SqliteCookieStore::in_memory().unwrap();
        assert!(store.scan_with_page_size(0).unwrap_err().is_validation());
    }

    #[test]
    fn scan_state_is_printable() {
        let store = populated(2, 1);
        let scan = store.scan().unwrap();
        let printed = format!("{scan:?}");
        assert!(printed.contains("total: 2"));
        assert!(printed.contains(":memory:"));
    }
}
