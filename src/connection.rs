//! Connection management over TCP and Unix sockets.
//!
//! A [`Connection`] owns one transport endpoint and its two buffers, and
//! enforces the single-pipeline-at-a-time discipline through the `&mut`
//! borrow handed to [`Pipeline`]. All writes are batched: one syscall out,
//! one read loop back, which is where the pipelined throughput comes from.

use std::path::PathBuf;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::resp;
use crate::types::{Command, Reply};

/// Default initial read buffer size.
pub const DEFAULT_READ_BUFFER_INITIAL: usize = 4096;

/// Default read buffer ceiling (1 MiB).
pub const DEFAULT_READ_BUFFER_MAX: usize = 1024 * 1024;

/// Configuration for connecting to a server.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Unix socket path; when set, the TCP parameters are ignored.
    pub unix_path: Option<PathBuf>,
    /// Optional password for AUTH during connect.
    pub password: Option<String>,
    /// Database index; zero means no SELECT is issued.
    pub database: u32,
    /// Optional connection name, set via CLIENT SETNAME during connect.
    pub client_name: Option<String>,
    /// Initial read buffer size in bytes.
    pub read_buffer_initial: usize,
    /// Read buffer growth ceiling in bytes.
    pub read_buffer_max: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 6379,
            unix_path: None,
            password: None,
            database: 0,
            client_name: None,
            read_buffer_initial: DEFAULT_READ_BUFFER_INITIAL,
            read_buffer_max: DEFAULT_READ_BUFFER_MAX,
        }
    }
}

impl ConnectionConfig {
    /// Create a config from a host and port.
    pub fn from_addr(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Create a config for a Unix socket endpoint.
    #[cfg(unix)]
    pub fn from_unix_path(path: impl Into<PathBuf>) -> Self {
        Self {
            unix_path: Some(path.into()),
            ..Default::default()
        }
    }
}

/// Abstraction over plain TCP and Unix-socket streams.
enum Stream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

/// A connection to a single server endpoint with buffered RESP I/O.
///
/// At most one pipeline can be in flight: [`Connection::pipeline`] borrows
/// the connection mutably for the pipeline's lifetime, so a second one is a
/// compile error rather than a runtime race.
pub struct Connection {
    stream: Stream,
    read_buf: BytesMut,
    write_buf: BytesMut,
    read_buffer_max: usize,
    database: u32,
    closed: bool,
    /// Set while a batch is on the wire with replies still owed. If an
    /// `execute` future is dropped at that point, the flag stays set and the
    /// connection is treated as poisoned: the server may still answer the
    /// already-written prefix, so framing can no longer be trusted.
    in_flight: bool,
}

impl Connection {
    /// Open a new connection and run the handshake.
    ///
    /// Establishes the transport (disabling Nagle on TCP), then issues
    /// `AUTH`, `SELECT` and `CLIENT SETNAME` as configured, verifying each
    /// reply is `+OK`. Any failure surfaces [`Error::Connect`] and drops the
    /// transport.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let stream = match &config.unix_path {
            Some(path) => {
                #[cfg(unix)]
                {
                    let unix = UnixStream::connect(path)
                        .await
                        .map_err(|e| Error::Connect(format!("{}: {}", path.display(), e)))?;
                    Stream::Unix(unix)
                }
                #[cfg(not(unix))]
                {
                    let _ = path;
                    return Err(Error::Connect(
                        "unix sockets are not supported on this platform".into(),
                    ));
                }
            }
            None => {
                let addr = format!("{}:{}", config.host, config.port);
                let tcp = TcpStream::connect(&addr)
                    .await
                    .map_err(|e| Error::Connect(format!("{}: {}", addr, e)))?;
                tcp.set_nodelay(true)
                    .map_err(|e| Error::Connect(format!("set_nodelay: {}", e)))?;
                Stream::Tcp(tcp)
            }
        };

        let mut conn = Self {
            stream,
            read_buf: BytesMut::with_capacity(config.read_buffer_initial),
            write_buf: BytesMut::with_capacity(config.read_buffer_initial),
            read_buffer_max: config.read_buffer_max,
            database: config.database,
            closed: false,
            in_flight: false,
        };

        if let Some(ref password) = config.password {
            conn.handshake(
                &[
                    Bytes::from_static(b"AUTH"),
                    Bytes::copy_from_slice(password.as_bytes()),
                ],
                "AUTH",
            )
            .await?;
        }

        if config.database != 0 {
            conn.handshake(
                &[
                    Bytes::from_static(b"SELECT"),
                    Bytes::from(config.database.to_string()),
                ],
                "SELECT",
            )
            .await?;
        }

        if let Some(ref name) = config.client_name {
            conn.handshake(
                &[
                    Bytes::from_static(b"CLIENT"),
                    Bytes::from_static(b"SETNAME"),
                    Bytes::copy_from_slice(name.as_bytes()),
                ],
                "CLIENT SETNAME",
            )
            .await?;
        }

        debug!(database = config.database, "connection established");
        Ok(conn)
    }

    /// Run one handshake command, requiring a `+OK` reply.
    async fn handshake(&mut self, args: &[Bytes], what: &str) -> Result<()> {
        let reply = self
            .execute(args)
            .await
            .map_err(|e| Error::Connect(format!("{}: {}", what, e)))?;
        if !reply.is_ok() {
            return Err(Error::Connect(format!("{} rejected: {}", what, reply)));
        }
        Ok(())
    }

    /// Send a single command and read its reply.
    ///
    /// Equivalent to a one-command pipeline. Server error replies come back
    /// as [`Reply::Error`] data; use [`Reply::into_result`] to raise them.
    pub async fn execute(&mut self, args: &[Bytes]) -> Result<Reply> {
        self.begin_io()?;
        self.write_command(args).await?;
        let reply = self.read_reply().await?;
        self.end_io();
        Ok(reply)
    }

    /// Encode all commands into the write buffer and flush them with a
    /// single write. Partial writes are looped until complete.
    pub async fn send_commands(&mut self, commands: &[Command]) -> Result<()> {
        self.write_buf.clear();
        resp::encode_pipeline(commands, &mut self.write_buf);
        self.flush_write_buf().await
    }

    /// Read until exactly `count` replies have been decoded, in arrival
    /// order.
    pub async fn read_replies(&mut self, count: usize) -> Result<Vec<Reply>> {
        let mut replies = Vec::with_capacity(count);
        while replies.len() < count {
            if let Some(reply) = self.try_decode()? {
                replies.push(reply);
                continue;
            }
            self.fill_read_buf().await?;
        }
        Ok(replies)
    }

    /// Read and drop `count` replies, keeping the stream synchronized
    /// without retaining results.
    pub async fn discard_replies(&mut self, count: usize) -> Result<()> {
        let mut remaining = count;
        while remaining > 0 {
            if self.try_decode()?.is_some() {
                remaining -= 1;
                continue;
            }
            self.fill_read_buf().await?;
        }
        Ok(())
    }

    /// Start a plain pipeline on this connection.
    ///
    /// The returned [`Pipeline`] borrows the connection exclusively, which
    /// is the busy flag: a second outstanding pipeline cannot be expressed.
    pub fn pipeline(&mut self) -> Pipeline<'_> {
        Pipeline::new(self, false)
    }

    /// Start a transactional (MULTI/EXEC) pipeline on this connection.
    pub fn transaction(&mut self) -> Pipeline<'_> {
        Pipeline::new(self, true)
    }

    /// Switch the connection to another database.
    pub async fn select(&mut self, database: u32) -> Result<()> {
        let reply = self
            .execute(&[
                Bytes::from_static(b"SELECT"),
                Bytes::from(database.to_string()),
            ])
            .await?
            .into_result()?;
        if !reply.is_ok() {
            return Err(Error::UnexpectedResponse {
                expected: "+OK",
                actual: reply.type_name().to_string(),
            });
        }
        self.database = database;
        Ok(())
    }

    /// Close the connection. Idempotent: later calls are no-ops, and every
    /// other operation fails with [`Error::ConnectionClosed`] afterwards.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let res = match &mut self.stream {
            Stream::Tcp(s) => s.shutdown().await,
            #[cfg(unix)]
            Stream::Unix(s) => s.shutdown().await,
        };
        debug!("connection closed");
        res.map_err(Error::Io)
    }

    /// Whether the connection has been closed or poisoned.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The currently selected database.
    pub fn database(&self) -> u32 {
        self.database
    }

    /// Whether the connection can be returned to a pool for reuse.
    pub(crate) fn is_healthy(&self) -> bool {
        !self.closed && !self.in_flight
    }

    /// Mark the start of a write/read exchange. Rejects closed connections
    /// and connections whose previous exchange never finished (a cancelled
    /// `execute` left replies on the wire).
    pub(crate) fn begin_io(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        if self.in_flight {
            self.closed = true;
            return Err(Error::Protocol(
                "connection poisoned by a cancelled operation".into(),
            ));
        }
        self.in_flight = true;
        Ok(())
    }

    /// Mark the exchange complete: all owed replies were consumed.
    pub(crate) fn end_io(&mut self) {
        self.in_flight = false;
    }

    // ── Internal I/O ────────────────────────────────────────────────────

    async fn write_command(&mut self, args: &[Bytes]) -> Result<()> {
        self.write_buf.clear();
        resp::encode_command(args, &mut self.write_buf);
        self.flush_write_buf().await
    }

    async fn flush_write_buf(&mut self) -> Result<()> {
        let res = match &mut self.stream {
            Stream::Tcp(s) => s.write_all(&self.write_buf).await,
            #[cfg(unix)]
            Stream::Unix(s) => s.write_all(&self.write_buf).await,
        };
        if let Err(e) = res {
            self.closed = true;
            return Err(e.into());
        }
        // capacity is retained for the next pipeline
        self.write_buf.clear();
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        loop {
            if let Some(reply) = self.try_decode()? {
                return Ok(reply);
            }
            self.fill_read_buf().await?;
        }
    }

    fn try_decode(&mut self) -> Result<Option<Reply>> {
        match resp::decode_one(&mut self.read_buf) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                self.closed = true;
                Err(e)
            }
        }
    }

    /// Pull more bytes from the socket into the read buffer.
    ///
    /// The buffer doubles when full, up to the configured ceiling;
    /// `BytesMut::reserve` reclaims the already-decoded prefix in place
    /// before falling back to a larger allocation.
    async fn fill_read_buf(&mut self) -> Result<()> {
        if self.read_buf.len() == self.read_buf.capacity() {
            let cap = self.read_buf.capacity();
            if cap >= self.read_buffer_max {
                self.closed = true;
                return Err(Error::Protocol(
                    "reply exceeds the read buffer ceiling".into(),
                ));
            }
            let target = (cap * 2).min(self.read_buffer_max);
            self.read_buf.reserve(target - self.read_buf.len());
        }

        let res = match &mut self.stream {
            Stream::Tcp(s) => s.read_buf(&mut self.read_buf).await,
            #[cfg(unix)]
            Stream::Unix(s) => s.read_buf(&mut self.read_buf).await,
        };
        match res {
            Ok(0) => {
                self.closed = true;
                Err(Error::ConnectionClosed)
            }
            Ok(_) => Ok(()),
            Err(e) => {
                self.closed = true;
                Err(e.into())
            }
        }
    }
}
