//! Typed command wrappers.
//!
//! Each sub-module covers one command group (strings, hashes, lists, sets,
//! server) as free functions over a [`Connection`]. These are thin calls
//! into the protocol core; server error replies are raised here, so the
//! wrappers return typed values rather than raw replies.

pub mod hashes;
pub mod lists;
pub mod server;
pub mod sets;
pub mod strings;

use bytes::Bytes;

use crate::connection::Connection;
use crate::error::Result;
use crate::types::{Reply, ToArg};

/// Execute a command, raising server error replies as [`crate::Error::Server`].
pub(crate) async fn exec(conn: &mut Connection, args: Vec<Bytes>) -> Result<Reply> {
    conn.execute(&args).await?.into_result()
}

/// Helper to create a Bytes arg from anything that implements ToArg.
#[inline]
pub(crate) fn arg<T: ToArg>(val: T) -> Bytes {
    val.to_arg()
}
