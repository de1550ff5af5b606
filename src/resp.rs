//! RESP2 protocol encoder and decoder.
//!
//! Implements the Redis Serialization Protocol (RESP2) wire format. The
//! encoder batches an entire pipeline into one contiguous buffer so the
//! connection can issue a single write per direction; the decoder is a
//! resumable cursor-based parser that tolerates frames split at any byte
//! boundary, including inside a CRLF.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;

use crate::error::{Error, Result};
use crate::types::{Command, ErrorReply, Reply};

const CRLF: &[u8] = b"\r\n";

// ── Encoding ────────────────────────────────────────────────────────────────

/// Encode a command as a RESP2 array of bulk strings.
///
/// This is the only format used for sending commands; inline commands are
/// never emitted.
///
/// # Example wire format
/// ```text
/// *3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n
/// ```
pub fn encode_command(args: &[Bytes], buf: &mut BytesMut) {
    let mut scratch = itoa::Buffer::new();

    // *<count>\r\n
    buf.put_u8(b'*');
    buf.put_slice(scratch.format(args.len()).as_bytes());
    buf.put_slice(CRLF);

    for arg in args {
        // $<len>\r\n<data>\r\n
        buf.put_u8(b'$');
        buf.put_slice(scratch.format(arg.len()).as_bytes());
        buf.put_slice(CRLF);
        buf.put_slice(arg);
        buf.put_slice(CRLF);
    }
}

/// Encode a whole pipeline into one contiguous buffer.
///
/// All commands coalesce into `buf` so the caller can flush the batch with
/// a single write.
pub fn encode_pipeline(commands: &[Command], buf: &mut BytesMut) {
    let mut payload = 0;
    for command in commands {
        // header + per-arg prefix upper bound: tag + 20 digits + two CRLFs
        payload += 25 + command.iter().map(|arg| arg.len() + 27).sum::<usize>();
    }
    buf.reserve(payload);

    for command in commands {
        encode_command(command, buf);
    }
}

/// Encode a reply back to its wire form.
///
/// Inverse of [`decode_one`]; used by round-trip tests and by test servers
/// speaking the server side of the protocol.
pub fn encode_reply(reply: &Reply, buf: &mut BytesMut) {
    let mut scratch = itoa::Buffer::new();

    match reply {
        Reply::Simple(s) => {
            buf.put_u8(b'+');
            buf.put_slice(s);
            buf.put_slice(CRLF);
        }
        Reply::Error(err) => {
            buf.put_u8(b'-');
            buf.put_slice(err.kind.as_bytes());
            if !err.message.is_empty() {
                buf.put_u8(b' ');
                buf.put_slice(err.message.as_bytes());
            }
            buf.put_slice(CRLF);
        }
        Reply::Integer(n) => {
            buf.put_u8(b':');
            buf.put_slice(scratch.format(*n).as_bytes());
            buf.put_slice(CRLF);
        }
        Reply::Bulk(None) => {
            buf.put_slice(b"$-1\r\n");
        }
        Reply::Bulk(Some(data)) => {
            buf.put_u8(b'$');
            buf.put_slice(scratch.format(data.len()).as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(data);
            buf.put_slice(CRLF);
        }
        Reply::Array(None) => {
            buf.put_slice(b"*-1\r\n");
        }
        Reply::Array(Some(items)) => {
            buf.put_u8(b'*');
            buf.put_slice(scratch.format(items.len()).as_bytes());
            buf.put_slice(CRLF);
            for item in items {
                encode_reply(item, buf);
            }
        }
    }
}

// ── Decoding ────────────────────────────────────────────────────────────────

/// Internal decoder outcome. `Incomplete` is an expected runtime condition,
/// not a failure; `Malformed` poisons the connection.
enum DecodeError {
    Incomplete,
    Malformed(String),
}

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Attempt to decode one reply from the front of the buffer.
///
/// Returns `Ok(Some(reply))` and advances the buffer past the consumed
/// frame, `Ok(None)` if the buffer does not yet hold a complete frame (the
/// buffer is left untouched so the caller can read more bytes and retry),
/// or `Err(Error::Protocol)` if the stream is malformed.
pub fn decode_one(buf: &mut BytesMut) -> Result<Option<Reply>> {
    if buf.is_empty() {
        return Ok(None);
    }

    let mut cursor = Cursor::new(&buf[..]);

    // First pass only measures the frame; no allocation happens until a
    // complete frame is known to be buffered.
    match check_reply(&mut cursor) {
        Ok(()) => {
            let len = cursor.position() as usize;
            cursor.set_position(0);
            let reply = match parse_reply(&mut cursor) {
                Ok(reply) => reply,
                Err(DecodeError::Incomplete) => {
                    // check_reply measured a complete frame
                    return Err(Error::Protocol("decoder state diverged".into()));
                }
                Err(DecodeError::Malformed(msg)) => return Err(Error::Protocol(msg)),
            };
            buf.advance(len);
            Ok(Some(reply))
        }
        Err(DecodeError::Incomplete) => Ok(None),
        Err(DecodeError::Malformed(msg)) => Err(Error::Protocol(msg)),
    }
}

/// Verify that a complete, well-formed frame starts at the cursor, leaving
/// the cursor at the frame's end.
fn check_reply(cursor: &mut Cursor<&[u8]>) -> DecodeResult<()> {
    match get_byte(cursor)? {
        b'+' | b'-' => {
            skip_line(cursor)?;
            Ok(())
        }
        b':' => {
            read_decimal(cursor)?;
            Ok(())
        }
        b'$' => {
            let len = read_decimal(cursor)?;
            if len == -1 {
                return Ok(());
            }
            if len < -1 {
                return Err(DecodeError::Malformed(format!(
                    "negative bulk string length: {}",
                    len
                )));
            }
            skip_bulk_body(cursor, len as usize)
        }
        b'*' => {
            let count = read_decimal(cursor)?;
            if count == -1 {
                return Ok(());
            }
            if count < -1 {
                return Err(DecodeError::Malformed(format!(
                    "negative array length: {}",
                    count
                )));
            }
            for _ in 0..count {
                check_reply(cursor)?;
            }
            Ok(())
        }
        byte => Err(DecodeError::Malformed(format!(
            "unexpected tag byte: 0x{:02x}",
            byte
        ))),
    }
}

/// Parse one reply from the cursor. Only called after [`check_reply`]
/// measured a complete frame, so `Incomplete` cannot surface here.
fn parse_reply(cursor: &mut Cursor<&[u8]>) -> DecodeResult<Reply> {
    match get_byte(cursor)? {
        b'+' => {
            let line = read_line(cursor)?;
            Ok(Reply::Simple(Bytes::copy_from_slice(line)))
        }
        b'-' => {
            let line = read_line(cursor)?;
            Ok(Reply::Error(ErrorReply::from_line(line)))
        }
        b':' => Ok(Reply::Integer(read_decimal(cursor)?)),
        b'$' => {
            let len = read_decimal(cursor)?;
            if len == -1 {
                return Ok(Reply::Bulk(None));
            }
            let data = read_bytes(cursor, len as usize)?;
            let bulk = Bytes::copy_from_slice(data);
            expect_crlf(cursor)?;
            Ok(Reply::Bulk(Some(bulk)))
        }
        b'*' => {
            let count = read_decimal(cursor)?;
            if count == -1 {
                return Ok(Reply::Array(None));
            }
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(parse_reply(cursor)?);
            }
            Ok(Reply::Array(Some(items)))
        }
        byte => Err(DecodeError::Malformed(format!(
            "unexpected tag byte: 0x{:02x}",
            byte
        ))),
    }
}

// ── Cursor helpers ──────────────────────────────────────────────────────────

fn get_byte(cursor: &mut Cursor<&[u8]>) -> DecodeResult<u8> {
    let pos = cursor.position() as usize;
    if pos >= cursor.get_ref().len() {
        return Err(DecodeError::Incomplete);
    }
    let byte = cursor.get_ref()[pos];
    cursor.advance(1);
    Ok(byte)
}

/// Advance past the next CRLF-terminated line.
fn skip_line(cursor: &mut Cursor<&[u8]>) -> DecodeResult<()> {
    read_line(cursor).map(|_| ())
}

/// Read up to (but not including) the next CRLF, consuming the terminator.
fn read_line<'a>(cursor: &mut Cursor<&'a [u8]>) -> DecodeResult<&'a [u8]> {
    let start = cursor.position() as usize;
    let buf: &'a [u8] = cursor.get_ref();
    for i in start..buf.len().saturating_sub(1) {
        if buf[i] == b'\r' && buf[i + 1] == b'\n' {
            cursor.set_position((i + 2) as u64);
            return Ok(&buf[start..i]);
        }
    }
    Err(DecodeError::Incomplete)
}

/// Read a CRLF-terminated decimal, allowing a leading `-`.
fn read_decimal(cursor: &mut Cursor<&[u8]>) -> DecodeResult<i64> {
    let line = read_line(cursor)?;
    let text = std::str::from_utf8(line)
        .map_err(|_| DecodeError::Malformed("non-ASCII length line".into()))?;
    text.parse::<i64>()
        .map_err(|_| DecodeError::Malformed(format!("invalid decimal: {:?}", text)))
}

/// Skip a bulk body of declared length and require its trailing CRLF, so a
/// length lying about the payload is caught before parsing.
fn skip_bulk_body(cursor: &mut Cursor<&[u8]>, len: usize) -> DecodeResult<()> {
    let start = cursor.position() as usize;
    let buf = cursor.get_ref();
    let end = start + len;
    if end + 2 > buf.len() {
        return Err(DecodeError::Incomplete);
    }
    if &buf[end..end + 2] != CRLF {
        return Err(DecodeError::Malformed(
            "bulk string length does not match its payload".into(),
        ));
    }
    cursor.set_position((end + 2) as u64);
    Ok(())
}

fn read_bytes<'a>(cursor: &mut Cursor<&'a [u8]>, len: usize) -> DecodeResult<&'a [u8]> {
    let start = cursor.position() as usize;
    let buf: &'a [u8] = cursor.get_ref();
    if start + len > buf.len() {
        return Err(DecodeError::Incomplete);
    }
    cursor.set_position((start + len) as u64);
    Ok(&buf[start..start + len])
}

fn expect_crlf(cursor: &mut Cursor<&[u8]>) -> DecodeResult<()> {
    let pos = cursor.position() as usize;
    let buf = cursor.get_ref();
    if pos + 2 > buf.len() {
        return Err(DecodeError::Incomplete);
    }
    if &buf[pos..pos + 2] != CRLF {
        return Err(DecodeError::Malformed(
            "bulk string length does not match its payload".into(),
        ));
    }
    cursor.advance(2);
    Ok(())
}
