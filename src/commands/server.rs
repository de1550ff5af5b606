//! Server and connection command wrappers (PING, ECHO, DBSIZE, ...).

use bytes::Bytes;

use crate::commands::{arg, exec};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::types::{Reply, ToArg};

/// PING [message] — test connectivity, returning the raw payload.
pub async fn ping(conn: &mut Connection, message: Option<&[u8]>) -> Result<Bytes> {
    let args = match message {
        Some(payload) => vec![Bytes::from_static(b"PING"), arg(payload)],
        None => vec![Bytes::from_static(b"PING")],
    };
    let reply = exec(conn, args).await?;
    match reply {
        Reply::Simple(b) => Ok(b),
        Reply::Bulk(Some(b)) => Ok(b),
        other => Err(Error::UnexpectedResponse {
            expected: "string",
            actual: other.type_name().to_string(),
        }),
    }
}

/// ECHO message — the server echoes the payload back.
pub async fn echo(conn: &mut Connection, message: impl ToArg) -> Result<Option<Bytes>> {
    exec(conn, vec![Bytes::from_static(b"ECHO"), arg(message)])
        .await?
        .into_bulk()
}

/// DBSIZE — the number of keys in the selected database.
pub async fn dbsize(conn: &mut Connection) -> Result<i64> {
    exec(conn, vec![Bytes::from_static(b"DBSIZE")])
        .await?
        .into_integer()
}

/// FLUSHDB — remove all keys from the selected database.
pub async fn flushdb(conn: &mut Connection) -> Result<()> {
    let reply = exec(conn, vec![Bytes::from_static(b"FLUSHDB")]).await?;
    if reply.is_ok() {
        Ok(())
    } else {
        Err(Error::UnexpectedResponse {
            expected: "+OK",
            actual: reply.type_name().to_string(),
        })
    }
}

/// INFO [section] — server information as a bulk string.
pub async fn info(conn: &mut Connection, section: Option<&str>) -> Result<Option<Bytes>> {
    let args = match section {
        Some(section) => vec![Bytes::from_static(b"INFO"), arg(section)],
        None => vec![Bytes::from_static(b"INFO")],
    };
    exec(conn, args).await?.into_bulk()
}

/// KEYS pattern — all keys matching a glob pattern.
pub async fn keys(conn: &mut Connection, pattern: impl ToArg) -> Result<Vec<Reply>> {
    exec(conn, vec![Bytes::from_static(b"KEYS"), arg(pattern)])
        .await?
        .into_array()
}

/// SWAPDB index1 index2 — swap two databases in place.
pub async fn swapdb(conn: &mut Connection, first: u32, second: u32) -> Result<()> {
    let reply = exec(
        conn,
        vec![Bytes::from_static(b"SWAPDB"), arg(first), arg(second)],
    )
    .await?;
    if reply.is_ok() {
        Ok(())
    } else {
        Err(Error::UnexpectedResponse {
            expected: "+OK",
            actual: reply.type_name().to_string(),
        })
    }
}
