//! Conversion between `cookies` rows and [`Cookie`] records.

use r2d2_sqlite::rusqlite::types::Type;
use r2d2_sqlite::rusqlite::{self, Row, ToSql};

use crate::cookies::{Cookie, CookieId, Extensions};
use crate::errors::Result;

/// Column list shared by every `SELECT`, in the order [`decode_row`] reads them.
pub(super) const SELECT_COLUMNS: &str = "id, version, name, value, port, port_specified, \
     domain, domain_specified, domain_initial_dot, path, path_specified, secure, expires, \
     discard, comment, comment_url, rfc2109, rest";

pub(super) const INSERT_COOKIE: &str = "INSERT INTO cookies (version, name, value, port, \
     port_specified, domain, domain_specified, domain_initial_dot, path, path_specified, \
     secure, expires, discard, comment, comment_url, rfc2109, rest) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

const REST_COLUMN: usize = 17;

/// Encodes the extensions bag for the `rest` column.
pub(super) fn encode_extensions(extensions: &Extensions) -> Result<String> {
    Ok(serde_json::to_string(extensions)?)
}

/// Decodes the `rest` column. `NULL` and empty strings decode to an empty bag.
pub(super) fn decode_extensions(raw: Option<&str>) -> serde_json::Result<Extensions> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Extensions::new()),
        Some(json) => serde_json::from_str(json),
    }
}

/// Executes the insert statement for one cookie and returns its new id.
pub(super) fn insert(stmt: &mut rusqlite::CachedStatement<'_>, cookie: &Cookie) -> Result<CookieId> {
    let rest = encode_extensions(&cookie.extensions)?;
    let params: [&dyn ToSql; 17] = [
        &cookie.version,
        &cookie.name,
        &cookie.value,
        &cookie.port,
        &(cookie.port_specified as i64),
        &cookie.domain,
        &(cookie.domain_specified as i64),
        &(cookie.domain_initial_dot as i64),
        &cookie.path,
        &(cookie.path_specified as i64),
        &(cookie.secure as i64),
        &cookie.expires,
        &(cookie.discard as i64),
        &cookie.comment,
        &cookie.comment_url,
        &(cookie.rfc2109 as i64),
        &rest,
    ];
    let id = stmt.insert(params.as_slice())?;
    Ok(CookieId(id))
}

/// Decodes one row selected with [`SELECT_COLUMNS`].
pub(super) fn decode_row(row: &Row<'_>) -> rusqlite::Result<Cookie> {
    let rest: Option<String> = row.get(REST_COLUMN)?;
    let extensions = decode_extensions(rest.as_deref())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(REST_COLUMN, Type::Text, Box::new(e)))?;

    let cookie = Cookie {
        id: None,
        version: row.get(1)?,
        name: row.get(2)?,
        value: row.get(3)?,
        port: row.get(4)?,
        port_specified: row.get::<_, i64>(5)? != 0,
        domain: row.get(6)?,
        domain_specified: row.get::<_, i64>(7)? != 0,
        domain_initial_dot: row.get::<_, i64>(8)? != 0,
        path: row.get(9)?,
        path_specified: row.get::<_, i64>(10)? != 0,
        secure: row.get::<_, i64>(11)? != 0,
        expires: row.get(12)?,
        discard: row.get::<_, i64>(13)? != 0,
        comment: row.get(14)?,
        comment_url: row.get(15)?,
        rfc2109: row.get::<_, i64>(16)? != 0,
        extensions,
    };

    Ok(cookie.with_id(CookieId(row.get(0)?)))
}
