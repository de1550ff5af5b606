//! Connection pooling with fair FIFO acquisition.
//!
//! The pool lazily opens connections up to a fixed size and hands them out
//! through a semaphore-guarded checkout. Tokio's semaphore queues waiters
//! in FIFO order and removes a waiter whose acquire future is dropped, which
//! gives the fairness and cancellation guarantees for free.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};
use tracing::{debug, warn};

use crate::connection::{Connection, ConnectionConfig};
use crate::error::{Error, Result};

/// Configuration for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Connection settings for each pooled connection.
    pub connection: ConnectionConfig,
    /// Maximum number of connections in the pool.
    pub size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            size: 8,
        }
    }
}

/// A bounded pool of reusable connections.
///
/// At any instant the connections handed out plus the idle ones never
/// exceed `size`. A connection returned in a poisoned state is discarded
/// rather than pooled; the freed slot lets a fresh one be opened on the
/// next acquire.
pub struct Pool {
    config: ConnectionConfig,
    idle: parking_lot::Mutex<Vec<Connection>>,
    semaphore: Arc<Semaphore>,
    size: usize,
    closed: AtomicBool,
    outstanding: AtomicUsize,
    returned: Notify,
}

impl Pool {
    /// Create a new pool. Connections are opened lazily on demand.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config: config.connection,
            idle: parking_lot::Mutex::new(Vec::with_capacity(config.size)),
            semaphore: Arc::new(Semaphore::new(config.size)),
            size: config.size,
            closed: AtomicBool::new(false),
            outstanding: AtomicUsize::new(0),
            returned: Notify::new(),
        }
    }

    /// Acquire a connection, waiting FIFO behind earlier callers when the
    /// pool is saturated.
    ///
    /// An idle connection is reused when available; otherwise a new one is
    /// opened. Dropping this future while queued removes the waiter without
    /// leaking a slot. Fails with [`Error::PoolClosed`] once the pool has
    /// been drained.
    pub async fn acquire(&self) -> Result<PooledConnection<'_>> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::PoolClosed)?;
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::PoolClosed);
        }

        let conn = { self.idle.lock().pop() };
        let conn = match conn {
            Some(conn) => conn,
            None => Connection::connect(&self.config).await?,
        };

        self.outstanding.fetch_add(1, Ordering::AcqRel);
        Ok(PooledConnection {
            conn: Some(conn),
            pool: self,
            _permit: permit,
        })
    }

    /// Drain the pool: wake all waiters with [`Error::PoolClosed`], wait for
    /// every outstanding connection to come back, then close the idle ones.
    /// Idempotent.
    pub async fn drain(&self) {
        self.closed.store(true, Ordering::Release);
        self.semaphore.close();

        while self.outstanding.load(Ordering::Acquire) > 0 {
            self.returned.notified().await;
        }

        let idle: Vec<Connection> = {
            let mut guard = self.idle.lock();
            guard.drain(..).collect()
        };
        for mut conn in idle {
            let _ = conn.close().await;
        }
        debug!("pool drained");
    }

    /// Number of idle connections sitting in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Number of connections currently handed out to callers.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// The pool's capacity.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the pool has been drained.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Take back a connection from a finished checkout.
    fn release(&self, conn: Connection) {
        if self.closed.load(Ordering::Acquire) {
            // drain will close whatever is idle; a late return is dropped
        } else if conn.is_healthy() {
            self.idle.lock().push(conn);
        } else {
            warn!("discarding poisoned connection instead of pooling it");
        }
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        self.returned.notify_one();
    }
}

/// A connection checked out from the pool.
///
/// Dereferences to [`Connection`]. When dropped, the connection goes back
/// to the idle set (or is discarded if poisoned) and the next FIFO waiter
/// is admitted.
pub struct PooledConnection<'a> {
    conn: Option<Connection>,
    pool: &'a Pool,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl PooledConnection<'_> {
    /// Access the underlying connection.
    pub fn conn(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection taken")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

impl std::ops::Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection taken")
    }
}

impl std::ops::DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection taken")
    }
}
