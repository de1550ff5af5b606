//! Error types for the hematite client.

use crate::types::ErrorReply;

/// Result type alias for hematite operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a Ferrite/Redis-compatible server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport setup failed: unresolvable address, connection refused, or
    /// the AUTH/SELECT handshake was rejected.
    #[error("connect error: {0}")]
    Connect(String),

    /// An I/O error occurred on an established connection. The connection is
    /// poisoned and must not be reused.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection mid-operation.
    #[error("connection closed")]
    ConnectionClosed,

    /// The inbound byte stream (or transactional framing) was malformed.
    /// The connection is poisoned: RESP2 framing cannot be re-synchronized.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server returned an error reply and the caller opted into raising.
    #[error("server error: {0}")]
    Server(ErrorReply),

    /// EXEC returned a null array: a watched key changed before the
    /// transaction ran. The caller may retry the whole transaction.
    #[error("transaction aborted")]
    TransactionAborted,

    /// `acquire` was called on a drained pool.
    #[error("connection pool closed")]
    PoolClosed,

    /// The API was used incorrectly (empty command, poisoned connection
    /// reuse, ...). This indicates a bug in the caller.
    #[error("usage error: {0}")]
    Usage(&'static str),

    /// The reply type did not match what the typed command wrapper expected.
    #[error("unexpected response type: expected {expected}, got {actual}")]
    UnexpectedResponse {
        /// The expected type description.
        expected: &'static str,
        /// The actual type description.
        actual: String,
    },
}
