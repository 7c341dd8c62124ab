//! Request context used when deciding which cookies to return.
//!
//! A [`CookieRequest`] wraps the URL being fetched together with the few bits
//! of browsing context a [`CookiePolicy`](crate::cookies::CookiePolicy) needs:
//! whether the request was triggered without user interaction
//! (`unverifiable`), the host of the document that caused it, and the current
//! time. The time is an explicit field so expiry decisions are reproducible.

use url::Url;

use crate::errors::Result;

/// Schemes that count as secure transports.
const SECURE_SCHEMES: [&str; 2] = ["https", "wss"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRequest {
    url: Url,
    host: String,
    origin_host: String,
    unverifiable: bool,
    now: i64,
}

impl CookieRequest {
    /// Creates a request for `url`, stamped with the current wall clock time.
    pub fn new(url: Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        Self {
            origin_host: host.clone(),
            host,
            url,
            unverifiable: false,
            now: unix_now(),
        }
    }

    /// Parses `url` and creates a request for it.
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Overrides the time used for expiry checks.
    pub fn at(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    /// Marks the request as not directly initiated by the user.
    pub fn unverifiable(mut self, unverifiable: bool) -> Self {
        self.unverifiable = unverifiable;
        self
    }

    /// Sets the host of the document that triggered this request.
    pub fn with_origin_host(mut self, host: &str) -> Self {
        self.origin_host = host.to_ascii_lowercase();
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Lowercased request host without port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Request host, with `.local` appended when the host has no dots.
    pub fn effective_host(&self) -> String {
        if !self.host.contains('.') {
            format!("{}.local", self.host)
        } else {
            self.host.clone()
        }
    }

    /// Request path; an empty path is reported as `/`.
    pub fn path(&self) -> &str {
        match self.url.path() {
            "" => "/",
            p => p,
        }
    }

    /// Explicit port, or the default port of the scheme.
    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    pub fn is_secure(&self) -> bool {
        SECURE_SCHEMES.contains(&self.url.scheme())
    }

    pub fn is_unverifiable(&self) -> bool {
        self.unverifiable
    }

    pub fn origin_host(&self) -> &str {
        &self.origin_host
    }

    /// Unix seconds this request is evaluated at.
    pub fn now(&self) -> i64 {
        self.now
    }
}

/// Current wall clock time in Unix seconds.
pub fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
