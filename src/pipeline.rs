//! Command batching: pipelines and MULTI/EXEC transactions.
//!
//! A [`Pipeline`] accumulates commands without touching the socket, then
//! `execute` flushes the whole batch as one contiguous write and reads the
//! matching replies back in order. Reply i is the server's answer to
//! command i: RESP2 over a single stream is strictly ordered and the
//! decoder emits replies in arrival order.

use bytes::Bytes;
use tracing::trace;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::types::{Command, Reply, ToArg};

/// A batch of commands bound to one connection.
///
/// Created by [`Connection::pipeline`] or [`Connection::transaction`]. The
/// pipeline holds the connection's `&mut` borrow for its whole lifetime, so
/// only one can be outstanding. Dropping an unexecuted pipeline silently
/// discards its commands.
pub struct Pipeline<'a> {
    conn: &'a mut Connection,
    commands: Vec<Command>,
    transactional: bool,
    ignore_results: bool,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(conn: &'a mut Connection, transactional: bool) -> Self {
        Self {
            conn,
            commands: Vec::new(),
            transactional,
            ignore_results: false,
        }
    }

    /// Append a command to the batch. Performs no I/O.
    pub fn command(&mut self, args: &[impl ToArg]) -> Result<&mut Self> {
        if args.is_empty() {
            return Err(Error::Usage("a command needs at least one argument"));
        }
        self.commands.push(args.iter().map(ToArg::to_arg).collect());
        Ok(self)
    }

    /// Discard the replies after reading them, returning an empty result
    /// vector. The replies are still framed off the socket so the stream
    /// stays synchronized.
    pub fn ignore_results(mut self) -> Self {
        self.ignore_results = true;
        self
    }

    /// Number of buffered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Flush the batch and collect the replies in submission order.
    ///
    /// A zero-command pipeline returns an empty vector without touching the
    /// socket. In transactional mode the batch is wrapped in MULTI/EXEC and
    /// the inner EXEC array is returned; see [`Error::TransactionAborted`]
    /// for the watch-invalidation case.
    ///
    /// Cancelling this future after the write has started poisons the
    /// connection: the server may already be answering the written prefix.
    pub async fn execute(mut self) -> Result<Vec<Reply>> {
        let commands = std::mem::take(&mut self.commands);
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        if self.transactional {
            self.execute_transaction(commands).await
        } else {
            self.execute_plain(commands).await
        }
    }

    async fn execute_plain(&mut self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        let count = commands.len();
        self.conn.begin_io()?;
        self.conn.send_commands(&commands).await?;

        let replies = if self.ignore_results {
            self.conn.discard_replies(count).await?;
            Vec::new()
        } else {
            self.conn.read_replies(count).await?
        };
        self.conn.end_io();

        trace!(commands = count, "pipeline executed");
        Ok(replies)
    }

    async fn execute_transaction(&mut self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        let count = commands.len();

        let mut framed = Vec::with_capacity(count + 2);
        framed.push(vec![Bytes::from_static(b"MULTI")]);
        framed.extend(commands);
        framed.push(vec![Bytes::from_static(b"EXEC")]);

        self.conn.begin_io()?;
        self.conn.send_commands(&framed).await?;
        // N+2 replies are always consumed, even on a framing violation, so
        // the stream stays synchronized.
        let mut replies = self.conn.read_replies(count + 2).await?;
        self.conn.end_io();

        trace!(commands = count, "transaction executed");

        let exec = match replies.pop() {
            Some(reply) => reply,
            None => return Err(Error::Protocol("EXEC reply missing".into())),
        };
        if !replies[0].is_ok() {
            return Err(Error::Protocol(format!(
                "MULTI was not acknowledged: {}",
                replies[0]
            )));
        }
        for reply in &replies[1..] {
            if !reply.is_queued() {
                return Err(Error::Protocol(format!(
                    "command was not queued inside MULTI: {}",
                    reply
                )));
            }
        }

        match exec {
            Reply::Array(Some(results)) => {
                if results.len() != count {
                    return Err(Error::Protocol(format!(
                        "EXEC returned {} replies for {} commands",
                        results.len(),
                        count
                    )));
                }
                if self.ignore_results {
                    Ok(Vec::new())
                } else {
                    Ok(results)
                }
            }
            // a watched key changed before EXEC ran
            Reply::Array(None) => Err(Error::TransactionAborted),
            other => Err(Error::Protocol(format!(
                "unexpected EXEC reply: {}",
                other
            ))),
        }
    }
}
