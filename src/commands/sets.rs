//! Set command wrappers (SADD, SREM, SMEMBERS, ...).

use bytes::Bytes;

use crate::commands::{arg, exec};
use crate::connection::Connection;
use crate::error::Result;
use crate::types::{Reply, ToArg};

/// SADD key member [member ...] — add members, returning how many were new.
pub async fn sadd(conn: &mut Connection, key: impl ToArg, members: &[impl ToArg]) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"SADD"), arg(key)];
    args.extend(members.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_integer()
}

/// SREM key member [member ...] — remove members, returning how many existed.
pub async fn srem(conn: &mut Connection, key: impl ToArg, members: &[impl ToArg]) -> Result<i64> {
    let mut args = vec![Bytes::from_static(b"SREM"), arg(key)];
    args.extend(members.iter().map(ToArg::to_arg));
    exec(conn, args).await?.into_integer()
}

/// SMEMBERS key — all members of a set.
pub async fn smembers(conn: &mut Connection, key: impl ToArg) -> Result<Vec<Reply>> {
    exec(conn, vec![Bytes::from_static(b"SMEMBERS"), arg(key)])
        .await?
        .into_array()
}

/// SISMEMBER key member — whether a value is in the set.
pub async fn sismember(
    conn: &mut Connection,
    key: impl ToArg,
    member: impl ToArg,
) -> Result<bool> {
    let n = exec(
        conn,
        vec![Bytes::from_static(b"SISMEMBER"), arg(key), arg(member)],
    )
    .await?
    .into_integer()?;
    Ok(n == 1)
}

/// SCARD key — the number of members in a set.
pub async fn scard(conn: &mut Connection, key: impl ToArg) -> Result<i64> {
    exec(conn, vec![Bytes::from_static(b"SCARD"), arg(key)])
        .await?
        .into_integer()
}
