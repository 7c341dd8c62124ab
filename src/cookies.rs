//! Cookies: [`Cookie`] records, the [`CookiePolicy`] that decides what is
//! returned, public suffix lookups and the [`CookieStore`] backends.

mod cookie;
mod policy;
mod request;
mod store;
mod suffix;

pub use cookie::Cookie;
pub use cookie::CookieId;
pub use cookie::Extensions;

pub use request::unix_now;
pub use request::CookieRequest;

pub use policy::domain_match;
pub use policy::path_match;
pub use policy::CookiePolicy;
pub use policy::CookiePolicyHandle;
pub use policy::DefaultCookiePolicy;

pub use suffix::PublicSuffixHandle;
pub use suffix::PublicSuffixList;
pub use suffix::SuffixList;

pub use store::CookieIter;
pub use store::CookieScan;
pub use store::CookieStore;
pub use store::SqliteCookieStore;
