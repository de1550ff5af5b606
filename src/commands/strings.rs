//! String command wrappers (GET, SET, GETSET, INCR, DECR, APPEND, ...).

use bytes::Bytes;

use crate::commands::{arg, exec};
use crate::connection::Connection;
use crate::error::Result;
use crate::types::{Reply, ToArg};

// ── SET with builder ────────────────────────────────────────────────────────

/// Builder for the SET command with optional EX, PX, NX, XX modifiers.
///
/// # Example
/// ```ignore
/// SetCommand::new(&mut conn, "key", "value")
///     .ex(3600)
///     .nx()
///     .execute()
///     .await?;
/// ```
pub struct SetCommand<'a> {
    conn: &'a mut Connection,
    args: Vec<Bytes>,
}

impl<'a> SetCommand<'a> {
    /// Create a new SET command.
    pub fn new(conn: &'a mut Connection, key: impl ToArg, value: impl ToArg) -> Self {
        Self {
            conn,
            args: vec![Bytes::from_static(b"SET"), arg(key), arg(value)],
        }
    }

    /// Set expiry in seconds (EX).
    pub fn ex(mut self, seconds: u64) -> Self {
        self.args.push(Bytes::from_static(b"EX"));
        self.args.push(arg(seconds));
        self
    }

    /// Set expiry in milliseconds (PX).
    pub fn px(mut self, milliseconds: u64) -> Self {
        self.args.push(Bytes::from_static(b"PX"));
        self.args.push(arg(milliseconds));
        self
    }

    /// Only set if the key does not already exist (NX).
    pub fn nx(mut self) -> Self {
        self.args.push(Bytes::from_static(b"NX"));
        self
    }

    /// Only set if the key already exists (XX).
    pub fn xx(mut self) -> Self {
        self.args.push(Bytes::from_static(b"XX"));
        self
    }

    /// Keep the existing TTL (KEEPTTL).
    pub fn keepttl(mut self) -> Self {
        self.args.push(Bytes::from_static(b"KEEPTTL"));
        self
    }

    /// Execute the SET command.
    pub async fn execute(self) -> Result<Reply> {
        exec(self.conn, self.args).await
    }
}

// ── Standalone string commands ──────────────────────────────────────────────

/// GET key — retrieve the value of a key; `None` when missing.
pub async fn get(conn: &mut Connection, key: impl ToArg) -> Result<Option<Bytes>> {
    exec(conn, vec![Bytes::from_static(b"GET"), arg(key)])
        .await?
        .into_bulk()
}

/// GETSET key value — set a key and return its previous value.
pub async fn getset(
    conn: &mut Connection,
    key: impl ToArg,
    value: impl ToArg,
) -> Result<Option<Bytes>> {
    exec(
        conn,
        vec![Bytes::from_static(b"GETSET"), arg(key), arg(value)],
    )
    .await?
    .into_bulk()
}

/// DEL key [key ...] — delete keys, returning how many existed.
pub async fn del(conn: &mut Connection, keys: &[impl ToArg]) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"DEL")];
    args.extend(keys.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_integer()
}

/// EXISTS key [key ...] — count how many of the given keys exist.
pub async fn exists(conn: &mut Connection, keys: &[impl ToArg]) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"EXISTS")];
    args.extend(keys.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_integer()
}

/// INCR key — increment the integer value by 1.
pub async fn incr(conn: &mut Connection, key: impl ToArg) -> Result<i64> {
    exec(conn, vec![Bytes::from_static(b"INCR"), arg(key)])
        .await?
        .into_integer()
}

/// DECR key — decrement the integer value by 1.
pub async fn decr(conn: &mut Connection, key: impl ToArg) -> Result<i64> {
    exec(conn, vec![Bytes::from_static(b"DECR"), arg(key)])
        .await?
        .into_integer()
}

/// APPEND key value — append to a string, returning the new length.
pub async fn append(conn: &mut Connection, key: impl ToArg, value: impl ToArg) -> Result<i64> {
    exec(
        conn,
        vec![Bytes::from_static(b"APPEND"), arg(key), arg(value)],
    )
    .await?
    .into_integer()
}

/// TTL key — remaining time to live in seconds (-1 no expiry, -2 missing).
pub async fn ttl(conn: &mut Connection, key: impl ToArg) -> Result<i64> {
    exec(conn, vec![Bytes::from_static(b"TTL"), arg(key)])
        .await?
        .into_integer()
}

/// EXPIRE key seconds — set a timeout; true when the timeout was set.
pub async fn expire(conn: &mut Connection, key: impl ToArg, seconds: u64) -> Result<bool> {
    let n = exec(
        conn,
        vec![Bytes::from_static(b"EXPIRE"), arg(key), arg(seconds)],
    )
    .await?
    .into_integer()?;
    Ok(n == 1)
}

/// TYPE key — the storage type of a key (`string`, `list`, `none`, ...).
pub async fn type_of(conn: &mut Connection, key: impl ToArg) -> Result<String> {
    let reply = exec(conn, vec![Bytes::from_static(b"TYPE"), arg(key)]).await?;
    match reply.as_str() {
        Some(s) => Ok(s.to_string()),
        None => Err(crate::error::Error::UnexpectedResponse {
            expected: "simple string",
            actual: reply.type_name().to_string(),
        }),
    }
}
