//! Cookie record type.
//!
//! A [`Cookie`] is one persisted state token. It carries every attribute a
//! fully parsed `Set-Cookie` / `Set-Cookie2` header can produce, plus an open
//! bag of non-standard attributes ([`Extensions`]) that is preserved verbatim.
//!
//! Records are created by callers, handed to a [`CookieStore`](crate::cookies::CookieStore)
//! and never updated in place afterwards. The store assigns each record a
//! [`CookieId`] at insert time.
//!
//! ```rust
//! use gosub_cookie_store::cookies::Cookie;
//!
//! let mut c = Cookie::new("session", Some("abc123"), "example.com");
//! c.secure = true;
//! c.expires = Some(1_900_000_000);
//! c.discard = false;
//! c.extensions.insert("HttpOnly".into(), None);
//!
//! assert!(c.validate().is_ok());
//! assert!(!c.is_expired(1_800_000_000));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CookieStoreError, Result};

/// Non-standard cookie attributes. A `None` value marks a flag-style attribute
/// (for instance `HttpOnly`) that was present without a value.
pub type Extensions = BTreeMap<String, Option<String>>;

/// Store-assigned identity of a cookie. Monotonic, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CookieId(pub(crate) i64);

impl CookieId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CookieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Identity assigned by the store. `None` until the cookie has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<CookieId>,

    /// Protocol version: 0 for netscape cookies, 1 for RFC 2965 cookies.
    pub version: u32,

    /// Cookie name (case-sensitive, never empty).
    pub name: String,

    /// Cookie value. `None` is a named cookie without a value, which is not the
    /// same as `Some("")`.
    pub value: Option<String>,

    /// Port or comma-separated list of ports.
    pub port: Option<String>,
    pub port_specified: bool,

    /// Domain the cookie belongs to. A leading dot means the cookie also
    /// applies to subdomains.
    pub domain: String,
    pub domain_specified: bool,
    pub domain_initial_dot: bool,

    pub path: String,
    pub path_specified: bool,

    /// Only send over secure transports.
    pub secure: bool,

    /// Expiry as Unix seconds. `None` is a session cookie.
    pub expires: Option<i64>,

    /// Drop at the end of the session, regardless of `expires`.
    pub discard: bool,

    pub comment: Option<String>,
    pub comment_url: Option<String>,

    /// Cookie was set through `Set-Cookie` with RFC 2109 attributes.
    pub rfc2109: bool,

    #[serde(default)]
    pub extensions: Extensions,
}

impl Cookie {
    /// Creates a version 0 cookie scoped to path `/` that is discarded at the end
    /// of the session.
    pub fn new(name: impl Into<String>, value: Option<&str>, domain: impl Into<String>) -> Self {
        Self {
            id: None,
            version: 0,
            name: name.into(),
            value: value.map(str::to_string),
            port: None,
            port_specified: false,
            domain: domain.into(),
            domain_specified: false,
            domain_initial_dot: false,
            path: "/".to_string(),
            path_specified: true,
            secure: false,
            expires: None,
            discard: true,
            comment: None,
            comment_url: None,
            rfc2109: false,
            extensions: Extensions::new(),
        }
    }

    /// Identity assigned by the store, if this record came out of one.
    pub fn id(&self) -> Option<CookieId> {
        self.id
    }

    /// A cookie is expired when it has an expiry at or before `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires, Some(expires) if expires <= now)
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Returns the value of extension `name`. Flag-style extensions yield `Some(None)`.
    pub fn extension(&self, name: &str) -> Option<Option<&str>> {
        self.extensions.get(name).map(|v| v.as_deref())
    }

    /// Checks the fields a stored record must always have.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CookieStoreError::Validation("cookie name is empty".into()));
        }
        if self.domain.is_empty() {
            return Err(CookieStoreError::Validation(format!(
                "cookie '{}' has an empty domain",
                self.name
            )));
        }
        if self.path.is_empty() {
            return Err(CookieStoreError::Validation(format!(
                "cookie '{}' for domain '{}' has an empty path",
                self.name, self.domain
            )));
        }
        Ok(())
    }

    pub(crate) fn with_id(mut self, id: CookieId) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cookie_defaults() {
        let c = Cookie::new("a", Some("b"), "example.com");
        assert_eq!(c.id(), None);
        assert_eq!(c.version, 0);
        assert_eq!(c.path, "/");
        assert!(c.path_specified);
        assert!(c.discard);
        assert!(c.expires.is_none());
        assert!(c.extensions.is_empty());
    }

    #[test]
    fn expiry_is_inclusive() {
        let mut c = Cookie::new("a", None, "example.com");
        assert!(!c.is_expired(i64::MAX));

        c.expires = Some(100);
        assert!(!c.is_expired(99));
        assert!(c.is_expired(100));
        assert!(c.is_expired(101));
    }

    #[test]
    fn validate_required_fields() {
        assert!(Cookie::new("a", None, "example.com").validate().is_ok());

        let err = Cookie::new("", Some("b"), "example.com").validate().unwrap_err();
        assert!(err.is_validation());

        let err = Cookie::new("a", Some("b"), "").validate().unwrap_err();
        assert!(err.is_validation());

        let mut c = Cookie::new("a", Some("b"), "example.com");
        c.path.clear();
        assert!(c.validate().unwrap_err().is_validation());
    }

    #[test]
    fn extension_accessors() {
        let mut c = Cookie::new("a", Some("b"), "example.com");
        c.extensions.insert("HttpOnly".into(), None);
        c.extensions.insert("SameSite".into(), Some("Lax".into()));

        assert!(c.has_extension("HttpOnly"));
        assert_eq!(c.extension("HttpOnly"), Some(None));
        assert_eq!(c.extension("SameSite"), Some(Some("Lax")));
        assert_eq!(c.extension("Priority"), None);
    }

    #[test]
    fn serde_skips_missing_id() {
        let c = Cookie::new("a", Some(""), "example.com");
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("\"id\""));

        let back: Cookie = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.value.as_deref(), Some(""));
    }
}
