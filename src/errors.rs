use crate::config::CookieStoreConfigError;
use r2d2_sqlite::rusqlite;

#[derive(Debug, thiserror::Error)]
pub enum CookieStoreError {
    /// Input rejected before any I/O took place (bad record, bad delete scope).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] CookieStoreConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CookieStoreError {
    /// Returns `true` when the error was raised before touching storage.
    pub fn is_validation(&self) -> bool {
        matches!(self, CookieStoreError::Validation(_) | CookieStoreError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, CookieStoreError>;
