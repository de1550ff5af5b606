//! Reply values and command argument conversion.

use bytes::Bytes;
use std::fmt;

use crate::error::{Error, Result};

/// A single command: an ordered, non-empty sequence of byte-string arguments.
///
/// The first argument is the verb (`GET`, `SET`, ...); the rest are keys and
/// values. All components are opaque octet sequences on the wire.
pub type Command = Vec<Bytes>;

/// A reply decoded from the server, one of the five RESP2 types.
///
/// Null bulk strings and null arrays are kept distinct (`Bulk(None)` vs
/// `Array(None)`) so that replies round-trip through the codec unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A simple string (`+OK\r\n`). Never contains CR or LF.
    Simple(Bytes),

    /// An error reply (`-ERR unknown command\r\n`). Non-fatal: surfaced as
    /// data unless the caller raises it via [`Reply::into_result`].
    Error(ErrorReply),

    /// A signed 64-bit integer (`:42\r\n`).
    Integer(i64),

    /// A bulk string (`$5\r\nhello\r\n`), or `None` for the null bulk.
    Bulk(Option<Bytes>),

    /// An array of replies, or `None` for the null array.
    Array(Option<Vec<Reply>>),
}

/// A server error reply, split into its leading status word and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReply {
    /// The status word prefix: `ERR`, `WRONGTYPE`, `MOVED`, `NOSCRIPT`, ...
    pub kind: String,
    /// The rest of the error line.
    pub message: String,
}

impl ErrorReply {
    /// Split a raw `-` line payload into status word and message.
    pub(crate) fn from_line(line: &[u8]) -> Self {
        let text = String::from_utf8_lossy(line);
        match text.split_once(' ') {
            Some((kind, message)) => Self {
                kind: kind.to_string(),
                message: message.to_string(),
            },
            None => Self {
                kind: text.into_owned(),
                message: String::new(),
            },
        }
    }
}

impl fmt::Display for ErrorReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.kind, self.message)
        }
    }
}

impl Reply {
    /// Returns the value as a `&str`, if it is a simple or bulk string with
    /// valid UTF-8 content.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Simple(b) => std::str::from_utf8(b).ok(),
            Reply::Bulk(Some(b)) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Returns the value as bytes, if it is a simple or bulk string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::Simple(b) => Some(b),
            Reply::Bulk(Some(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as an array, if it is a non-null array.
    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(Some(items)) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` if the value is the null bulk or the null array.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Bulk(None) | Reply::Array(None))
    }

    /// Returns `true` for the `+OK` simple string.
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Simple(b) if b.as_ref() == b"OK")
    }

    /// Returns `true` for the `+QUEUED` simple string sent inside MULTI.
    pub fn is_queued(&self) -> bool {
        matches!(self, Reply::Simple(b) if b.as_ref() == b"QUEUED")
    }

    /// Raises an [`Error::Server`] if this reply is an error, passing every
    /// other variant through. This is the opt-in path for callers that want
    /// server errors as `Err` rather than data.
    pub fn into_result(self) -> Result<Reply> {
        match self {
            Reply::Error(err) => Err(Error::Server(err)),
            other => Ok(other),
        }
    }

    /// Converts the reply into the payload of a bulk string.
    ///
    /// The null bulk becomes `None`; simple strings are accepted as well
    /// since some servers answer reads with either form.
    pub fn into_bulk(self) -> Result<Option<Bytes>> {
        match self {
            Reply::Bulk(data) => Ok(data),
            Reply::Simple(b) => Ok(Some(b)),
            other => Err(Error::UnexpectedResponse {
                expected: "bulk string",
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Converts the reply into an `i64`.
    pub fn into_integer(self) -> Result<i64> {
        match self {
            Reply::Integer(n) => Ok(n),
            other => Err(Error::UnexpectedResponse {
                expected: "integer",
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Converts the reply into a `Vec<Reply>`. The null array becomes an
    /// empty vector.
    pub fn into_array(self) -> Result<Vec<Reply>> {
        match self {
            Reply::Array(Some(items)) => Ok(items),
            Reply::Array(None) => Ok(Vec::new()),
            other => Err(Error::UnexpectedResponse {
                expected: "array",
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Returns a human-readable type name for this reply.
    pub fn type_name(&self) -> &'static str {
        match self {
            Reply::Simple(_) => "simple string",
            Reply::Error(_) => "error",
            Reply::Integer(_) => "integer",
            Reply::Bulk(Some(_)) => "bulk string",
            Reply::Bulk(None) => "null bulk",
            Reply::Array(Some(_)) => "array",
            Reply::Array(None) => "null array",
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Simple(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "<binary {} bytes>", b.len()),
            },
            Reply::Error(err) => write!(f, "(error) {}", err),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Bulk(Some(b)) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "<binary {} bytes>", b.len()),
            },
            Reply::Bulk(None) | Reply::Array(None) => write!(f, "(nil)"),
            Reply::Array(Some(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {}", i + 1, item)?;
                }
                Ok(())
            }
        }
    }
}

/// Trait for types that can be converted into command arguments.
///
/// Text converts at UTF-8; numbers render to their decimal byte form.
pub trait ToArg {
    /// Encode this value as a RESP bulk string argument.
    fn to_arg(&self) -> Bytes;
}

impl ToArg for &str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for &String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl ToArg for &[u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for i64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(itoa::Buffer::new().format(*self).to_owned())
    }
}

impl ToArg for u64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(itoa::Buffer::new().format(*self).to_owned())
    }
}

impl ToArg for i32 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(itoa::Buffer::new().format(*self).to_owned())
    }
}

impl ToArg for u32 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(itoa::Buffer::new().format(*self).to_owned())
    }
}

impl ToArg for usize {
    fn to_arg(&self) -> Bytes {
        Bytes::from(itoa::Buffer::new().format(*self).to_owned())
    }
}
