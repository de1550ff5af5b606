//! Pool-backed async client.
//!
//! [`AsyncClient`] wraps a connection pool and exposes ergonomic async
//! methods for the supported command groups. Each call checks a connection
//! out of the pool, runs one command, and returns the connection on scope
//! exit. Callers that need ordering across commands (or pipelining) should
//! hold one connection via [`AsyncClient::acquire`] instead.

use bytes::Bytes;

use crate::commands;
use crate::connection::ConnectionConfig;
use crate::error::Result;
use crate::pool::{Pool, PoolConfig, PooledConnection};
use crate::types::{Reply, ToArg};

/// An asynchronous client over a bounded connection pool.
///
/// # Examples
///
/// ```ignore
/// use hematite::AsyncClient;
///
/// let client = AsyncClient::connect("127.0.0.1", 6379).await?;
/// client.set("key", "value").await?.execute().await?;
/// let val = client.get("key").await?;
/// ```
pub struct AsyncClient {
    pool: Pool,
}

impl AsyncClient {
    /// Connect to a server with default settings.
    pub async fn connect(host: impl Into<String>, port: u16) -> Result<Self> {
        let config = PoolConfig {
            connection: ConnectionConfig::from_addr(host, port),
            ..Default::default()
        };
        Ok(Self {
            pool: Pool::new(config),
        })
    }

    /// Connect using a full [`ConnectionConfig`].
    pub async fn connect_with(config: ConnectionConfig) -> Result<Self> {
        let pool_config = PoolConfig {
            connection: config,
            ..Default::default()
        };
        Ok(Self {
            pool: Pool::new(pool_config),
        })
    }

    /// Connect using a full [`PoolConfig`] with custom pool settings.
    pub async fn connect_pooled(config: PoolConfig) -> Result<Self> {
        Ok(Self {
            pool: Pool::new(config),
        })
    }

    /// Check a connection out of the pool.
    ///
    /// Use this for pipelines and transactions, or for any sequence that
    /// must stay on one connection:
    ///
    /// ```ignore
    /// let mut conn = client.acquire().await?;
    /// let mut pipe = conn.pipeline();
    /// pipe.command(&["SET", "a", "1"])?;
    /// pipe.command(&["GET", "a"])?;
    /// let replies = pipe.execute().await?;
    /// ```
    pub async fn acquire(&self) -> Result<PooledConnection<'_>> {
        self.pool.acquire().await
    }

    /// Drain the underlying pool, closing every connection.
    pub async fn drain(&self) {
        self.pool.drain().await;
    }

    /// The underlying pool, for inspection.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    // ── String commands ─────────────────────────────────────────────────

    /// SET key value — returns a builder for optional modifiers (EX, NX, ...).
    pub async fn set(&self, key: impl ToArg, value: impl ToArg) -> Result<SetCommandHandle<'_>> {
        let pooled = self.pool.acquire().await?;
        Ok(SetCommandHandle {
            conn: pooled,
            key: key.to_arg(),
            value: value.to_arg(),
            args: Vec::new(),
        })
    }

    /// GET key — the value of a key, `None` when missing.
    pub async fn get(&self, key: impl ToArg) -> Result<Option<Bytes>> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::get(conn.conn(), key).await
    }

    /// GETSET key value — set a key and return its previous value.
    pub async fn getset(&self, key: impl ToArg, value: impl ToArg) -> Result<Option<Bytes>> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::getset(conn.conn(), key, value).await
    }

    /// DEL key [key ...] — delete one or more keys.
    pub async fn del(&self, keys: &[impl ToArg]) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::del(conn.conn(), keys).await
    }

    /// EXISTS key [key ...] — check how many of the given keys exist.
    pub async fn exists(&self, keys: &[impl ToArg]) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::exists(conn.conn(), keys).await
    }

    /// INCR key — increment integer value by 1.
    pub async fn incr(&self, key: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::incr(conn.conn(), key).await
    }

    /// DECR key — decrement integer value by 1.
    pub async fn decr(&self, key: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::decr(conn.conn(), key).await
    }

    /// APPEND key value — append to a string value.
    pub async fn append(&self, key: impl ToArg, value: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::append(conn.conn(), key, value).await
    }

    /// TTL key — the time-to-live of a key in seconds.
    pub async fn ttl(&self, key: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::ttl(conn.conn(), key).await
    }

    /// EXPIRE key seconds — set a timeout on a key.
    pub async fn expire(&self, key: impl ToArg, seconds: u64) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::expire(conn.conn(), key, seconds).await
    }

    /// TYPE key — the storage type of a key.
    pub async fn type_of(&self, key: impl ToArg) -> Result<String> {
        let mut conn = self.pool.acquire().await?;
        commands::strings::type_of(conn.conn(), key).await
    }

    // ── Hash commands ───────────────────────────────────────────────────

    /// HSET key field value [field value ...] — set fields in a hash.
    pub async fn hset(
        &self,
        key: impl ToArg,
        fields: &[(impl ToArg, impl ToArg)],
    ) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hset(conn.conn(), key, fields).await
    }

    /// HGET key field — the value of a hash field.
    pub async fn hget(&self, key: impl ToArg, field: impl ToArg) -> Result<Option<Bytes>> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hget(conn.conn(), key, field).await
    }

    /// HMGET key field [field ...] — values of multiple hash fields.
    pub async fn hmget(&self, key: impl ToArg, fields: &[impl ToArg]) -> Result<Vec<Reply>> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hmget(conn.conn(), key, fields).await
    }

    /// HDEL key field [field ...] — delete hash fields.
    pub async fn hdel(&self, key: impl ToArg, fields: &[impl ToArg]) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hdel(conn.conn(), key, fields).await
    }

    /// HKEYS key — all field names in a hash.
    pub async fn hkeys(&self, key: impl ToArg) -> Result<Vec<Reply>> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hkeys(conn.conn(), key).await
    }

    /// HVALS key — all values in a hash.
    pub async fn hvals(&self, key: impl ToArg) -> Result<Vec<Reply>> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hvals(conn.conn(), key).await
    }

    /// HLEN key — the number of fields in a hash.
    pub async fn hlen(&self, key: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hlen(conn.conn(), key).await
    }

    /// HGETALL key — all fields and values in a hash.
    pub async fn hgetall(&self, key: impl ToArg) -> Result<Vec<Reply>> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hgetall(conn.conn(), key).await
    }

    /// HEXISTS key field — whether a field exists in a hash.
    pub async fn hexists(&self, key: impl ToArg, field: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        commands::hashes::hexists(conn.conn(), key, field).await
    }

    // ── List commands ───────────────────────────────────────────────────

    /// LPUSH key element [element ...] — prepend elements to a list.
    pub async fn lpush(&self, key: impl ToArg, values: &[impl ToArg]) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::lists::lpush(conn.conn(), key, values).await
    }

    /// RPUSH key element [element ...] — append elements to a list.
    pub async fn rpush(&self, key: impl ToArg, values: &[impl ToArg]) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::lists::rpush(conn.conn(), key, values).await
    }

    /// LPOP key — remove and get the first element.
    pub async fn lpop(&self, key: impl ToArg) -> Result<Option<Bytes>> {
        let mut conn = self.pool.acquire().await?;
        commands::lists::lpop(conn.conn(), key).await
    }

    /// RPOP key — remove and get the last element.
    pub async fn rpop(&self, key: impl ToArg) -> Result<Option<Bytes>> {
        let mut conn = self.pool.acquire().await?;
        commands::lists::rpop(conn.conn(), key).await
    }

    /// LRANGE key start stop — a range of elements from a list.
    pub async fn lrange(&self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<Reply>> {
        let mut conn = self.pool.acquire().await?;
        commands::lists::lrange(conn.conn(), key, start, stop).await
    }

    /// LLEN key — the length of a list.
    pub async fn llen(&self, key: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::lists::llen(conn.conn(), key).await
    }

    // ── Set commands ────────────────────────────────────────────────────

    /// SADD key member [member ...] — add members to a set.
    pub async fn sadd(&self, key: impl ToArg, members: &[impl ToArg]) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::sets::sadd(conn.conn(), key, members).await
    }

    /// SREM key member [member ...] — remove members from a set.
    pub async fn srem(&self, key: impl ToArg, members: &[impl ToArg]) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::sets::srem(conn.conn(), key, members).await
    }

    /// SMEMBERS key — all members of a set.
    pub async fn smembers(&self, key: impl ToArg) -> Result<Vec<Reply>> {
        let mut conn = self.pool.acquire().await?;
        commands::sets::smembers(conn.conn(), key).await
    }

    /// SISMEMBER key member — whether a value is in a set.
    pub async fn sismember(&self, key: impl ToArg, member: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        commands::sets::sismember(conn.conn(), key, member).await
    }

    /// SCARD key — the number of members in a set.
    pub async fn scard(&self, key: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::sets::scard(conn.conn(), key).await
    }

    // ── Server commands ─────────────────────────────────────────────────

    /// PING — test server connectivity.
    pub async fn ping(&self) -> Result<Bytes> {
        let mut conn = self.pool.acquire().await?;
        commands::server::ping(conn.conn(), None).await
    }

    /// ECHO message — round-trip a payload through the server.
    pub async fn echo(&self, message: impl ToArg) -> Result<Option<Bytes>> {
        let mut conn = self.pool.acquire().await?;
        commands::server::echo(conn.conn(), message).await
    }

    /// DBSIZE — the number of keys in the selected database.
    pub async fn dbsize(&self) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        commands::server::dbsize(conn.conn()).await
    }

    /// FLUSHDB — remove all keys from the selected database.
    pub async fn flushdb(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        commands::server::flushdb(conn.conn()).await
    }

    /// INFO [section] — server information.
    pub async fn info(&self, section: Option<&str>) -> Result<Option<Bytes>> {
        let mut conn = self.pool.acquire().await?;
        commands::server::info(conn.conn(), section).await
    }

    /// KEYS pattern — all keys matching a glob pattern.
    pub async fn keys(&self, pattern: impl ToArg) -> Result<Vec<Reply>> {
        let mut conn = self.pool.acquire().await?;
        commands::server::keys(conn.conn(), pattern).await
    }

    /// SWAPDB index1 index2 — swap two databases in place.
    pub async fn swapdb(&self, first: u32, second: u32) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        commands::server::swapdb(conn.conn(), first, second).await
    }

    // ── Raw command execution ───────────────────────────────────────────

    /// Execute an arbitrary command with raw arguments.
    ///
    /// Useful for commands not covered by the typed API. The server's error
    /// replies come back as [`Reply::Error`] data.
    pub async fn execute(&self, args: &[impl ToArg]) -> Result<Reply> {
        let raw: Vec<Bytes> = args.iter().map(ToArg::to_arg).collect();
        let mut conn = self.pool.acquire().await?;
        conn.conn().execute(&raw).await
    }
}

// ── SetCommandHandle (builder returned by AsyncClient::set) ─────────────────

/// Builder for SET with options, returned by [`AsyncClient::set`].
pub struct SetCommandHandle<'a> {
    conn: PooledConnection<'a>,
    key: Bytes,
    value: Bytes,
    args: Vec<Bytes>,
}

impl SetCommandHandle<'_> {
    /// Set expiry in seconds (EX).
    pub fn ex(mut self, seconds: u64) -> Self {
        self.args.push(Bytes::from_static(b"EX"));
        self.args.push(seconds.to_arg());
        self
    }

    /// Set expiry in milliseconds (PX).
    pub fn px(mut self, milliseconds: u64) -> Self {
        self.args.push(Bytes::from_static(b"PX"));
        self.args.push(milliseconds.to_arg());
        self
    }

    /// Only set if the key does not exist (NX).
    pub fn nx(mut self) -> Self {
        self.args.push(Bytes::from_static(b"NX"));
        self
    }

    /// Only set if the key already exists (XX).
    pub fn xx(mut self) -> Self {
        self.args.push(Bytes::from_static(b"XX"));
        self
    }

    /// Keep the existing TTL (KEEPTTL).
    pub fn keepttl(mut self) -> Self {
        self.args.push(Bytes::from_static(b"KEEPTTL"));
        self
    }

    /// Execute the SET command.
    pub async fn execute(mut self) -> Result<Reply> {
        let mut cmd = vec![Bytes::from_static(b"SET"), self.key, self.value];
        cmd.append(&mut self.args);
        self.conn.conn().execute(&cmd).await?.into_result()
    }
}
