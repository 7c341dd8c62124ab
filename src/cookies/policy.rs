//! Cookie return policy.
//!
//! The store never decides on its own whether a cookie may be sent. It narrows
//! down candidates and then asks a [`CookiePolicy`] three questions:
//!
//! 1. [`domain_return_ok`](CookiePolicy::domain_return_ok): is this domain in scope at all?
//! 2. [`path_return_ok`](CookiePolicy::path_return_ok): does the cookie path cover the request path?
//! 3. [`return_ok`](CookiePolicy::return_ok): may this particular cookie be returned?
//!
//! [`DefaultCookiePolicy`] implements the usual netscape/RFC 2965 return rules.

use std::net::IpAddr;
use std::sync::Arc;

use crate::cookies::{Cookie, CookieRequest};

/// A handle to a cookie policy trait object.
pub type CookiePolicyHandle = Arc<dyn CookiePolicy + Send + Sync>;

/// Decides which stored cookies may be returned for a request.
///
/// Implementations must be pure: the store may call the predicates any number
/// of times, in any order.
pub trait CookiePolicy: Send + Sync {
    /// Cheap gate evaluated before any cookie of `domain` is looked at.
    fn domain_return_ok(&self, domain: &str, request: &CookieRequest) -> bool;

    /// Whether a cookie scoped to `path` applies to the request path.
    fn path_return_ok(&self, path: &str, request: &CookieRequest) -> bool;

    /// Whether `cookie` may be returned with `request`.
    fn return_ok(&self, cookie: &Cookie, request: &CookieRequest) -> bool;
}

/// Conventional cookie return rules.
///
/// - Domains can be blocked (`blocked_domains`) or restricted to an allow list
///   (`allowed_domains`). Entries starting with `.` also match subdomains.
/// - Version 0 cookies are accepted when `netscape` is on, later versions when
///   `rfc2965` is on.
/// - Secure cookies are only returned over `https`/`wss`.
/// - Cookies with `expires <= request.now()` are never returned.
#[derive(Debug, Clone)]
pub struct DefaultCookiePolicy {
    pub netscape: bool,
    pub rfc2965: bool,
    pub strict_ns_unverifiable: bool,
    pub strict_rfc2965_unverifiable: bool,
    blocked_domains: Vec<String>,
    allowed_domains: Option<Vec<String>>,
}

impl Default for DefaultCookiePolicy {
    fn default() -> Self {
        Self {
            netscape: true,
            rfc2965: false,
            strict_ns_unverifiable: false,
            strict_rfc2965_unverifiable: true,
            blocked_domains: Vec::new(),
            allowed_domains: None,
        }
    }
}

impl DefaultCookiePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocked_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Only return cookies for these domains. `None` lifts the restriction.
    pub fn with_allowed_domains<I, S>(mut self, domains: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.map(|d| d.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rfc2965(mut self, on: bool) -> Self {
        self.rfc2965 = on;
        self
    }

    pub fn blocked_domains(&self) -> &[String] {
        &self.blocked_domains
    }

    pub fn allowed_domains(&self) -> Option<&[String]> {
        self.allowed_domains.as_deref()
    }

    pub fn is_blocked(&self, domain: &str) -> bool {
        self.blocked_domains.iter().any(|b| user_domain_match(domain, b))
    }

    pub fn is_not_allowed(&self, domain: &str) -> bool {
        match &self.allowed_domains {
            Some(allowed) => !allowed.iter().any(|a| user_domain_match(domain, a)),
            None => false,
        }
    }

    fn return_ok_version(&self, cookie: &Cookie) -> bool {
        if cookie.version > 0 {
            self.rfc2965
        } else {
            self.netscape
        }
    }

    fn return_ok_verifiability(&self, cookie: &Cookie, request: &CookieRequest) -> bool {
        if request.is_unverifiable() && is_third_party(request) {
            if cookie.version > 0 && self.strict_rfc2965_unverifiable {
                return false;
            }
            if cookie.version == 0 && self.strict_ns_unverifiable {
                return false;
            }
        }
        true
    }

    fn return_ok_port(&self, cookie: &Cookie, request: &CookieRequest) -> bool {
        let Some(ports) = cookie.port.as_deref().filter(|p| !p.is_empty()) else {
            return true;
        };
        let req_port = request.port().unwrap_or(80).to_string();
        ports.split(',').any(|p| p.trim() == req_port)
    }

    fn return_ok_domain(&self, cookie: &Cookie, request: &CookieRequest) -> bool {
        let erhn = request.effective_host();
        if cookie.version > 0 {
            return domain_match(&erhn, &cookie.domain);
        }
        format!(".{erhn}").ends_with(&dotted(&cookie.domain))
    }
}

impl CookiePolicy for DefaultCookiePolicy {
    fn domain_return_ok(&self, domain: &str, request: &CookieRequest) -> bool {
        let req_host = dotted(request.host());
        let erhn = dotted(&request.effective_host());
        let dotdomain = dotted(domain);

        if !(req_host.ends_with(&dotdomain) || erhn.ends_with(&dotdomain)) {
            return false;
        }
        if self.is_blocked(domain) {
            log::debug!("domain {domain} is blocked");
            return false;
        }
        if self.is_not_allowed(domain) {
            log::debug!("domain {domain} is not in the allow list");
            return false;
        }
        true
    }

    fn path_return_ok(&self, path: &str, request: &CookieRequest) -> bool {
        path_match(path, request.path())
    }

    fn return_ok(&self, cookie: &Cookie, request: &CookieRequest) -> bool {
        if !self.return_ok_version(cookie) {
            return false;
        }
        if !self.return_ok_verifiability(cookie, request) {
            return false;
        }
        if cookie.secure && !request.is_secure() {
            return false;
        }
        if cookie.is_expired(request.now()) {
            return false;
        }
        self.return_ok_port(cookie, request) && self.return_ok_domain(cookie, request)
    }
}

/// `path` covers `request_path` when they are equal, or when `path` is a prefix
/// that ends on a `/` boundary.
pub fn path_match(path: &str, request_path: &str) -> bool {
    if request_path == path {
        return true;
    }
    request_path.starts_with(path)
        && (path.ends_with('/') || request_path.as_bytes().get(path.len()) == Some(&b'/'))
}

/// RFC 2965 domain match: `host` equals `domain`, or `domain` starts with a dot
/// and is a proper suffix of a non-IP `host`.
pub fn domain_match(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    if host == domain {
        return true;
    }
    if is_ip(&host) {
        return false;
    }
    domain.starts_with('.')
        && host.len() > domain.len()
        && host.ends_with(&domain)
        && !is_ip(&domain[1..])
}

/// Matches a domain against an allow/block list entry.
fn user_domain_match(domain: &str, entry: &str) -> bool {
    let domain = domain.to_ascii_lowercase();
    let entry = entry.to_ascii_lowercase();
    if entry.starts_with('.') && !is_ip(&domain) {
        domain.ends_with(&entry)
    } else {
        domain == entry
    }
}

/// The request is third party when its host is outside the reach of the
/// document that triggered it.
fn is_third_party(request: &CookieRequest) -> bool {
    !domain_match(request.host(), &reach(request.origin_host()))
}

/// Widens `host` to the domain that cookies set by it may cover:
/// `www.acme.com` becomes `.acme.com`, `foo.local` becomes `.local`.
fn reach(host: &str) -> String {
    if let Some((_, rest)) = host.split_once('.') {
        if !is_ip(host) && (rest.contains('.') || rest == "local") {
            return format!(".{rest}");
        }
    }
    host.to_string()
}

fn dotted(domain: &str) -> String {
    if domain.is_empty() || domain.starts_with('.') {
        domain.to_string()
    } else {
        format!(".{domain}")
    }
}

fn is_ip(host: &str) -> bool {
    host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>().is_ok()
}
