//! Unit of work against the pooled connection.

use r2d2_sqlite::rusqlite::Transaction;

use super::SqliteCookieStore;
use crate::errors::Result;

impl SqliteCookieStore {
    /// Runs `work` inside one transaction on a pooled connection.
    ///
    /// - `work` returns `Ok`: the transaction is committed.
    /// - `work` returns `Err`: the transaction is rolled back and the error is
    ///   returned unchanged.
    ///
    /// The connection goes back to the pool on every exit path. Sessions must
    /// not be nested: calling `with_session` from inside `work` waits for a
    /// second pooled connection, which an in-memory store never has.
    pub fn with_session<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        log::trace!("cookie store session started");

        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                log::debug!("cookie store session committed");
                Ok(value)
            }
            Err(err) => {
                log::error!("cookie store session failed, rolling back: {err}");
                if let Err(rollback_err) = tx.rollback() {
                    log::warn!("rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}
