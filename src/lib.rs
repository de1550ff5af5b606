//! # hematite — pipelined RESP2 client for Ferrite and Redis-compatible servers
//!
//! A throughput-oriented client for Redis-compatible key-value stores. The
//! whole library is built around batching: a pipeline of N commands costs
//! one write and one read loop, not N round trips.
//!
//! ## Features
//!
//! - **Batched RESP2 codec** — a pipeline serializes into one contiguous
//!   buffer; replies decode incrementally from a fragmented stream
//! - **Pipelines and transactions** — `MULTI`/`EXEC` batching with queued
//!   reply verification and watch-abort detection
//! - **Fair connection pooling** — bounded pool with strict FIFO waiting
//!   and orderly drain
//! - **TCP and Unix sockets** — Nagle disabled, AUTH/SELECT handshake
//! - **Typed command wrappers** — strings, hashes, lists, sets, server
//!
//! ## Quick start
//!
//! ```ignore
//! use hematite::AsyncClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> hematite::Result<()> {
//!     let client = AsyncClient::connect("127.0.0.1", 6379).await?;
//!
//!     client.set("greeting", "hello").await?.execute().await?;
//!     let val = client.get("greeting").await?;
//!     println!("greeting = {:?}", val);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipelining
//!
//! ```ignore
//! let mut conn = client.acquire().await?;
//! let mut pipe = conn.pipeline();
//! for i in 0..10_000 {
//!     pipe.command(&["SET".to_string(), format!("k{i}"), format!("v{i}")])?;
//! }
//! let replies = pipe.execute().await?;
//! assert_eq!(replies.len(), 10_000);
//! ```

pub mod client;
pub mod commands;
pub mod connection;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod resp;
pub mod types;

// ── Re-exports for ergonomic top-level usage ────────────────────────────────

pub use client::AsyncClient;
pub use connection::{Connection, ConnectionConfig};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use pool::{Pool, PoolConfig, PooledConnection};
pub use types::{Command, ErrorReply, Reply, ToArg};
