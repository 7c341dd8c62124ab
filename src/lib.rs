//! Disk-backed, domain-indexed HTTP cookie storage.
//!
//! Cookies live in a SQLite table instead of an in-memory map, so a jar can
//! hold far more cookies than it would comfortably keep in RAM. Retrieval
//! narrows candidates with the `domain` index and then hands every candidate
//! to a [`CookiePolicy`](cookies::CookiePolicy) for the final decision.
//!
//! ```rust
//! use gosub_cookie_store::cookies::{Cookie, CookieRequest, CookieStore, SqliteCookieStore};
//!
//! # fn main() -> gosub_cookie_store::Result<()> {
//! let store = SqliteCookieStore::in_memory()?;
//! let mut cookie = Cookie::new("theme", Some("dark"), "example.com");
//! cookie.path = "/app".into();
//! store.set_cookie(&cookie)?;
//!
//! let hits = store.cookies_for_request(&CookieRequest::parse("https://www.example.com/app/home")?)?;
//! assert_eq!(hits[0].value.as_deref(), Some("dark"));
//!
//! let misses = store.cookies_for_request(&CookieRequest::parse("https://www.example.com/")?)?;
//! assert!(misses.is_empty());
//! # Ok(()) }
//! ```

pub mod config;
pub mod cookies;
pub mod errors;

pub use errors::{CookieStoreError, Result};
