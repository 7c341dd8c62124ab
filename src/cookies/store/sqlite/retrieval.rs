//! Policy-gated reads.
//!
//! Both entry points narrow candidates with SQL and then run every candidate
//! through the policy. The SQL side only ever widens the candidate set; the
//! policy has the final say on each record.

use std::collections::HashMap;

use r2d2_sqlite::rusqlite::params;

use super::{codec, SqliteCookieStore};
use crate::cookies::{Cookie, CookiePolicy, CookieRequest};
use crate::errors::Result;

impl SqliteCookieStore {
    /// Cookies stored under exactly `domain` that the policy returns for `request`.
    ///
    /// The domain is compared verbatim: no case folding, no dot stripping. When
    /// the policy rejects the domain itself, storage is not touched.
    pub fn cookies_for_domain(&self, domain: &str, request: &CookieRequest) -> Result<Vec<Cookie>> {
        let policy = self.policy();
        if !policy.domain_return_ok(domain, request) {
            log::trace!("policy rejected domain {domain}");
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {} FROM cookies WHERE domain = ?1 ORDER BY id", codec::SELECT_COLUMNS);
        let candidates = self.select(&sql, params![domain])?;

        Ok(retain_returnable(candidates, policy.as_ref(), request))
    }

    /// Every cookie the policy returns for `request`.
    ///
    /// Candidates are the cookies stored under the request's private suffix or
    /// any subdomain of it. Requests whose host has no private suffix (IP
    /// addresses, bare public suffixes) get nothing.
    ///
    /// Like [`cookies_for_domain`](Self::cookies_for_domain), every candidate
    /// domain must pass [`CookiePolicy::domain_return_ok`] before its cookies
    /// reach `path_return_ok` and `return_ok`. The gate runs once per distinct
    /// domain, so block and allow lists apply here too.
    pub fn cookies_for_request(&self, request: &CookieRequest) -> Result<Vec<Cookie>> {
        let host = request.host();
        let Some(suffix) = self.suffixes.private_suffix(host) else {
            log::debug!("no private suffix for {host}, returning no cookies");
            return Ok(Vec::new());
        };
        if self.suffixes.is_public_suffix(&suffix) {
            log::debug!("{suffix} is a public suffix, returning no cookies");
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM cookies WHERE domain = ?1 OR domain LIKE ?2 ESCAPE '\\' ORDER BY id",
            codec::SELECT_COLUMNS
        );
        let pattern = format!("%.{}", escape_like(&suffix));
        let candidates = self.select(&sql, params![suffix, pattern])?;
        log::trace!("{} candidate cookies under {suffix}", candidates.len());

        let policy = self.policy();
        let mut domain_ok: HashMap<String, bool> = HashMap::new();
        let in_scope: Vec<Cookie> = candidates
            .into_iter()
            .filter(|cookie| {
                *domain_ok
                    .entry(cookie.domain.clone())
                    .or_insert_with(|| policy.domain_return_ok(&cookie.domain, request))
            })
            .collect();

        Ok(retain_returnable(in_scope, policy.as_ref(), request))
    }

    fn select<P: r2d2_sqlite::rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Cookie>> {
        self.with_session(|tx| {
            let mut stmt = tx.prepare_cached(sql)?;
            let rows = stmt.query_map(params, codec::decode_row)?;
            Ok(rows.collect::<r2d2_sqlite::rusqlite::Result<Vec<_>>>()?)
        })
    }
}

fn retain_returnable(
    mut cookies: Vec<Cookie>,
    policy: &(dyn CookiePolicy + Send + Sync),
    request: &CookieRequest,
) -> Vec<Cookie> {
    cookies.retain(|c| policy.path_return_ok(&c.path, request) && policy.return_ok(c, request));
    cookies
}

/// Escapes `LIKE` wildcards so `suffix` only matches literally.
fn escape_like(suffix: &str) -> String {
    let mut escaped = String::with_capacity(suffix.len());
    for ch in suffix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
