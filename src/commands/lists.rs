//! List command wrappers (LPUSH, RPUSH, LRANGE, ...).

use bytes::Bytes;

use crate::commands::{arg, exec};
use crate::connection::Connection;
use crate::error::Result;
use crate::types::{Reply, ToArg};

/// LPUSH key element [element ...] — prepend, returning the new length.
pub async fn lpush(conn: &mut Connection, key: impl ToArg, values: &[impl ToArg]) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"LPUSH"), arg(key)];
    args.extend(values.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_integer()
}

/// RPUSH key element [element ...] — append, returning the new length.
pub async fn rpush(conn: &mut Connection, key: impl ToArg, values: &[impl ToArg]) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"RPUSH"), arg(key)];
    args.extend(values.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_integer()
}

/// LPOP key — remove and return the first element; `None` on empty.
pub async fn lpop(conn: &mut Connection, key: impl ToArg) -> Result<Option<Bytes>> {
    exec(conn, vec![Bytes::from_static(b"LPOP"), arg(key)])
        .await?
        .into_bulk()
}

/// RPOP key — remove and return the last element; `None` on empty.
pub async fn rpop(conn: &mut Connection, key: impl ToArg) -> Result<Option<Bytes>> {
    exec(conn, vec![Bytes::from_static(b"RPOP"), arg(key)])
        .await?
        .into_bulk()
}

/// LRANGE key start stop — a range of elements, inclusive on both ends.
pub async fn lrange(
    conn: &mut Connection,
    key: impl ToArg,
    start: i64,
    stop: i64,
) -> Result<Vec<Reply>> {
    exec(
        conn,
        vec![
            Bytes::from_static(b"LRANGE"),
            arg(key),
            arg(start),
            arg(stop),
        ],
    )
    .await?
    .into_array()
}

/// LLEN key — the length of a list.
pub async fn llen(conn: &mut Connection, key: impl ToArg) -> Result<i64> {
    exec(conn, vec![Bytes::from_static(b"LLEN"), arg(key)])
        .await?
        .into_integer()
}
