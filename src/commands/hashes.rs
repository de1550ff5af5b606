//! Hash command wrappers (HSET, HGET, HMGET, HGETALL, ...).

use bytes::Bytes;

use crate::commands::{arg, exec};
use crate::connection::Connection;
use crate::error::Result;
use crate::types::{Reply, ToArg};

/// HSET key field value [field value ...] — returns how many fields were new.
pub async fn hset(
    conn: &mut Connection,
    key: impl ToArg,
    fields: &[(impl ToArg, impl ToArg)],
) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"HSET"), arg(key)];
    for (field, value) in fields {
        args.push(field.to_arg());
        args.push(value.to_arg());
    }
    exec(conn, args).await?.into_integer()
}

/// HGET key field — the value of a hash field; `None` when missing.
pub async fn hget(
    conn: &mut Connection,
    key: impl ToArg,
    field: impl ToArg,
) -> Result<Option<Bytes>> {
    exec(conn, vec![Bytes::from_static(b"HGET"), arg(key), arg(field)])
        .await?
        .into_bulk()
}

/// HMGET key field [field ...] — values for each requested field, in order.
pub async fn hmget(
    conn: &mut Connection,
    key: impl ToArg,
    fields: &[impl ToArg],
) -> Result<Vec<Reply>> {
    let mut args = vec![Bytes::from_static(b"HMGET"), arg(key)];
    args.extend(fields.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_array()
}

/// HDEL key field [field ...] — delete fields, returning how many existed.
pub async fn hdel(conn: &mut Connection, key: impl ToArg, fields: &[impl ToArg]) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"HDEL"), arg(key)];
    args.extend(fields.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_integer()
}

/// HKEYS key — all field names in a hash.
pub async fn hkeys(conn: &mut Connection, key: impl ToArg) -> Result<Vec<Reply>> {
    exec(conn, vec![Bytes::from_static(b"HKEYS"), arg(key)])
        .await?
        .into_array()
}

/// HVALS key — all values in a hash.
pub async fn hvals(conn: &mut Connection, key: impl ToArg) -> Result<Vec<Reply>> {
    exec(conn, vec![Bytes::from_static(b"HVALS"), arg(key)])
        .await?
        .into_array()
}

/// HLEN key — number of fields in a hash.
pub async fn hlen(conn: &mut Connection, key: impl ToArg) -> Result<i64> {
    exec(conn, vec![Bytes::from_static(b"HLEN"), arg(key)])
        .await?
        .into_integer()
}

/// HGETALL key — alternating field/value replies.
pub async fn hgetall(conn: &mut Connection, key: impl ToArg) -> Result<Vec<Reply>> {
    exec(conn, vec![Bytes::from_static(b"HGETALL"), arg(key)])
        .await?
        .into_array()
}

/// HEXISTS key field — whether a field exists in a hash.
pub async fn hexists(conn: &mut Connection, key: impl ToArg, field: impl ToArg) -> Result<bool> {
    let n = exec(
        conn,
        vec![Bytes::from_static(b"HEXISTS"), arg(key), arg(field)],
    )
    .await?
    .into_integer()?;
    Ok(n == 1)
}
