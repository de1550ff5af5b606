//! In-process RESP2 server used by the integration tests.
//!
//! Implements enough of the command surface (strings, hashes, lists, sets,
//! MULTI/EXEC/WATCH, AUTH/SELECT) to exercise the client end to end without
//! an external Redis. The server side of the wire reuses the crate's own
//! codec, so both directions of the protocol get covered.

#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use hematite::resp;
use hematite::{ConnectionConfig, ErrorReply, Reply};

/// Options for the test server.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// When set, clients must AUTH with this password first.
    pub password: Option<String>,
    /// When set, each connection is dropped after answering this many
    /// commands. Used to simulate a server-side reset mid-conversation.
    pub die_after: Option<usize>,
    /// When set, replies are held back this long before being flushed.
    /// Used to cancel client futures mid-exchange.
    pub delay: Option<std::time::Duration>,
}

/// Handle to a spawned test server.
pub struct TestServer {
    addr: SocketAddr,
    shared: Arc<Mutex<Shared>>,
}

impl TestServer {
    /// Spawn a server with default options on an ephemeral port.
    pub async fn spawn() -> Self {
        Self::spawn_with(ServerOptions::default()).await
    }

    /// Spawn a server with the given options.
    pub async fn spawn_with(options: ServerOptions) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let addr = listener.local_addr().expect("local addr");
        let shared = Arc::new(Mutex::new(Shared::default()));

        let state = shared.clone();
        let options = Arc::new(options);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let state = state.clone();
                let options = options.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(socket, state, options).await;
                });
            }
        });

        Self { addr, shared }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// A client config pointed at this server.
    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::from_addr("127.0.0.1", self.addr.port())
    }

    /// Bump a key's version from outside any connection, as if another
    /// client had written it. Used to trigger WATCH aborts.
    pub fn touch(&self, db: u32, key: &[u8]) {
        let mut shared = self.shared.lock();
        let db = shared.dbs.entry(db).or_default();
        *db.versions.entry(key.to_vec()).or_insert(0) += 1;
    }
}

// ── Storage ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Shared {
    dbs: HashMap<u32, Db>,
}

#[derive(Default)]
struct Db {
    entries: HashMap<Vec<u8>, Entry>,
    /// Bumped on every write to a key; WATCH pins these.
    versions: HashMap<Vec<u8>, u64>,
}

impl Db {
    fn bump(&mut self, key: &[u8]) {
        *self.versions.entry(key.to_vec()).or_insert(0) += 1;
    }

    fn version(&self, key: &[u8]) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }
}

enum Entry {
    Str(Vec<u8>),
    List(VecDeque<Vec<u8>>),
    Hash(Vec<(Vec<u8>, Vec<u8>)>),
    Set(Vec<Vec<u8>>),
}

// ── Session ─────────────────────────────────────────────────────────────────

struct Session {
    db: u32,
    authed: bool,
    name: Vec<u8>,
    /// `Some` once MULTI was issued; commands queue here until EXEC.
    queued: Option<Vec<Vec<Vec<u8>>>>,
    queue_error: bool,
    watched: Vec<(u32, Vec<u8>, u64)>,
}

async fn serve_connection(
    mut socket: TcpStream,
    state: Arc<Mutex<Shared>>,
    options: Arc<ServerOptions>,
) -> std::io::Result<()> {
    let mut read_buf = BytesMut::with_capacity(4096);
    let mut write_buf = BytesMut::new();
    let mut session = Session {
        db: 0,
        authed: false,
        name: Vec::new(),
        queued: None,
        queue_error: false,
        watched: Vec::new(),
    };
    let mut served = 0usize;

    loop {
        // Answer every fully buffered command before flushing once, so a
        // pipelined batch gets a batched response.
        let mut die = false;
        loop {
            let frame = match resp::decode_one(&mut read_buf) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(_) => return Ok(()),
            };
            let Some(args) = command_args(frame) else {
                return Ok(());
            };
            let reply = dispatch(&mut session, &state, &options, args);
            resp::encode_reply(&reply, &mut write_buf);
            served += 1;
            if options.die_after.is_some_and(|limit| served >= limit) {
                die = true;
                break;
            }
        }

        if !write_buf.is_empty() {
            if let Some(delay) = options.delay {
                tokio::time::sleep(delay).await;
            }
            socket.write_all(&write_buf).await?;
            write_buf.clear();
        }
        if die {
            return Ok(());
        }

        if socket.read_buf(&mut read_buf).await? == 0 {
            return Ok(());
        }
    }
}

/// Commands arrive as arrays of bulk strings; anything else ends the
/// connection.
fn command_args(frame: Reply) -> Option<Vec<Vec<u8>>> {
    let Reply::Array(Some(items)) = frame else {
        return None;
    };
    let mut args = Vec::with_capacity(items.len());
    for item in items {
        let Reply::Bulk(Some(data)) = item else {
            return None;
        };
        args.push(data.to_vec());
    }
    if args.is_empty() {
        None
    } else {
        Some(args)
    }
}

// ── Reply constructors ──────────────────────────────────────────────────────

fn ok() -> Reply {
    Reply::Simple(Bytes::from_static(b"OK"))
}

fn queued() -> Reply {
    Reply::Simple(Bytes::from_static(b"QUEUED"))
}

fn err(kind: &str, message: &str) -> Reply {
    Reply::Error(ErrorReply {
        kind: kind.to_string(),
        message: message.to_string(),
    })
}

fn bulk(data: &[u8]) -> Reply {
    Reply::Bulk(Some(Bytes::copy_from_slice(data)))
}

fn nil() -> Reply {
    Reply::Bulk(None)
}

fn int(n: i64) -> Reply {
    Reply::Integer(n)
}

// ── Dispatch ────────────────────────────────────────────────────────────────

const KNOWN_COMMANDS: &[&[u8]] = &[
    b"PING", b"ECHO", b"AUTH", b"SELECT", b"CLIENT", b"SET", b"GET", b"GETSET", b"DEL", b"EXISTS",
    b"INCR", b"DECR", b"APPEND", b"TTL", b"EXPIRE", b"TYPE", b"KEYS", b"DBSIZE", b"FLUSHDB",
    b"INFO", b"SWAPDB", b"LPUSH", b"RPUSH", b"LPOP", b"RPOP", b"LRANGE", b"LLEN", b"HSET",
    b"HGET", b"HMGET", b"HDEL", b"HKEYS", b"HVALS", b"HLEN", b"HGETALL", b"HEXISTS", b"SADD",
    b"SREM", b"SMEMBERS", b"SISMEMBER", b"SCARD", b"MULTI", b"EXEC", b"DISCARD", b"WATCH",
    b"UNWATCH",
];

fn dispatch(
    session: &mut Session,
    state: &Arc<Mutex<Shared>>,
    options: &ServerOptions,
    args: Vec<Vec<u8>>,
) -> Reply {
    let verb = args[0].to_ascii_uppercase();

    if verb == b"AUTH" {
        return match (&options.password, args.get(1)) {
            (None, _) => err("ERR", "Client sent AUTH, but no password is set"),
            (Some(_), None) => err("ERR", "wrong number of arguments for 'auth' command"),
            (Some(expected), Some(given)) => {
                if expected.as_bytes() == given.as_slice() {
                    session.authed = true;
                    ok()
                } else {
                    err("WRONGPASS", "invalid username-password pair or user is disabled.")
                }
            }
        };
    }

    if options.password.is_some() && !session.authed {
        return err("NOAUTH", "Authentication required.");
    }

    match verb.as_slice() {
        b"MULTI" => {
            if session.queued.is_some() {
                return err("ERR", "MULTI calls can not be nested");
            }
            session.queued = Some(Vec::new());
            session.queue_error = false;
            ok()
        }
        b"DISCARD" => {
            if session.queued.take().is_none() {
                return err("ERR", "DISCARD without MULTI");
            }
            session.watched.clear();
            ok()
        }
        b"WATCH" => {
            if session.queued.is_some() {
                return err("ERR", "WATCH inside MULTI is not allowed");
            }
            let shared = state.lock();
            for key in &args[1..] {
                let version = shared
                    .dbs
                    .get(&session.db)
                    .map(|db| db.version(key))
                    .unwrap_or(0);
                session.watched.push((session.db, key.clone(), version));
            }
            ok()
        }
        b"UNWATCH" => {
            session.watched.clear();
            ok()
        }
        b"EXEC" => {
            let Some(batch) = session.queued.take() else {
                return err("ERR", "EXEC without MULTI");
            };
            let watched = std::mem::take(&mut session.watched);
            if session.queue_error {
                session.queue_error = false;
                return err("EXECABORT", "Transaction discarded because of previous errors.");
            }

            let mut shared = state.lock();
            let dirty = watched.iter().any(|(db, key, version)| {
                shared
                    .dbs
                    .get(db)
                    .map(|d| d.version(key))
                    .unwrap_or(0)
                    != *version
            });
            if dirty {
                return Reply::Array(None);
            }
            let results = batch
                .into_iter()
                .map(|cmd| run_command(&mut shared, session, cmd))
                .collect();
            Reply::Array(Some(results))
        }
        _ => {
            if session.queued.is_some() {
                if !KNOWN_COMMANDS.contains(&verb.as_slice()) {
                    session.queue_error = true;
                    return err(
                        "ERR",
                        &format!("unknown command '{}'", String::from_utf8_lossy(&args[0])),
                    );
                }
                if let Some(batch) = session.queued.as_mut() {
                    batch.push(args);
                }
                return queued();
            }
            let mut shared = state.lock();
            run_command(&mut shared, session, args)
        }
    }
}

// ── Command execution ───────────────────────────────────────────────────────

fn run_command(shared: &mut Shared, session: &mut Session, args: Vec<Vec<u8>>) -> Reply {
    let verb = args[0].to_ascii_uppercase();

    if verb == b"SWAPDB" {
        let (Some(first), Some(second)) = (parse_int(args.get(1)), parse_int(args.get(2)))
        else {
            return err("ERR", "invalid first DB index");
        };
        if first < 0 || second < 0 {
            return err("ERR", "invalid DB index");
        }
        let (first, second) = (first as u32, second as u32);
        let db_first = shared.dbs.remove(&first).unwrap_or_default();
        let db_second = shared.dbs.remove(&second).unwrap_or_default();
        shared.dbs.insert(first, db_second);
        shared.dbs.insert(second, db_first);
        return ok();
    }

    let db = shared.dbs.entry(session.db).or_default();

    match verb.as_slice() {
        b"PING" => match args.get(1) {
            Some(payload) => bulk(payload),
            None => Reply::Simple(Bytes::from_static(b"PONG")),
        },
        b"ECHO" => match args.get(1) {
            Some(payload) => bulk(payload),
            None => err("ERR", "wrong number of arguments for 'echo' command"),
        },
        b"SELECT" => match parse_int(args.get(1)) {
            Some(index) if index >= 0 => {
                session.db = index as u32;
                ok()
            }
            _ => err("ERR", "invalid DB index"),
        },
        b"CLIENT" => {
            let sub = args
                .get(1)
                .map(|s| s.to_ascii_uppercase())
                .unwrap_or_default();
            match sub.as_slice() {
                b"SETNAME" => match args.get(2) {
                    Some(name) => {
                        session.name = name.clone();
                        ok()
                    }
                    None => err("ERR", "wrong number of arguments for 'client|setname'"),
                },
                b"GETNAME" => bulk(&session.name),
                _ => err("ERR", "unknown CLIENT subcommand"),
            }
        }
        b"SET" => {
            let (Some(key), Some(value)) = (args.get(1), args.get(2)) else {
                return err("ERR", "wrong number of arguments for 'set' command");
            };
            let mut nx = false;
            let mut xx = false;
            let mut i = 3;
            while i < args.len() {
                match args[i].to_ascii_uppercase().as_slice() {
                    b"NX" => nx = true,
                    b"XX" => xx = true,
                    b"KEEPTTL" => {}
                    b"EX" | b"PX" => i += 1,
                    _ => return err("ERR", "syntax error"),
                }
                i += 1;
            }
            let exists = db.entries.contains_key(key);
            if (nx && exists) || (xx && !exists) {
                return nil();
            }
            db.entries.insert(key.clone(), Entry::Str(value.clone()));
            db.bump(key);
            ok()
        }
        b"GET" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Str(value)) => bulk(value),
            Some(_) => wrongtype(),
            None => nil(),
        },
        b"GETSET" => {
            let (Some(key), Some(value)) = (args.get(1), args.get(2)) else {
                return err("ERR", "wrong number of arguments for 'getset' command");
            };
            let previous = match db.entries.insert(key.clone(), Entry::Str(value.clone())) {
                Some(Entry::Str(old)) => bulk(&old),
                Some(_) => return wrongtype(),
                None => nil(),
            };
            db.bump(key);
            previous
        }
        b"DEL" => {
            let mut removed = 0;
            for key in &args[1..] {
                if db.entries.remove(key).is_some() {
                    db.bump(key);
                    removed += 1;
                }
            }
            int(removed)
        }
        b"EXISTS" => {
            let found = args[1..]
                .iter()
                .filter(|key| db.entries.contains_key(*key))
                .count();
            int(found as i64)
        }
        b"INCR" => incr_by(db, arg_or_empty(&args, 1), 1),
        b"DECR" => incr_by(db, arg_or_empty(&args, 1), -1),
        b"APPEND" => {
            let (Some(key), Some(value)) = (args.get(1), args.get(2)) else {
                return err("ERR", "wrong number of arguments for 'append' command");
            };
            let entry = db
                .entries
                .entry(key.clone())
                .or_insert_with(|| Entry::Str(Vec::new()));
            let Entry::Str(existing) = entry else {
                return wrongtype();
            };
            existing.extend_from_slice(value);
            let len = existing.len();
            db.bump(key);
            int(len as i64)
        }
        b"TTL" => {
            if db.entries.contains_key(arg_or_empty(&args, 1)) {
                int(-1)
            } else {
                int(-2)
            }
        }
        b"EXPIRE" => {
            if db.entries.contains_key(arg_or_empty(&args, 1)) {
                int(1)
            } else {
                int(0)
            }
        }
        b"TYPE" => {
            let name: &[u8] = match db.entries.get(arg_or_empty(&args, 1)) {
                Some(Entry::Str(_)) => b"string",
                Some(Entry::List(_)) => b"list",
                Some(Entry::Hash(_)) => b"hash",
                Some(Entry::Set(_)) => b"set",
                None => b"none",
            };
            Reply::Simple(Bytes::copy_from_slice(name))
        }
        b"KEYS" => {
            let pattern = arg_or_empty(&args, 1);
            let mut matched: Vec<&Vec<u8>> = db
                .entries
                .keys()
                .filter(|key| glob_match(pattern, key))
                .collect();
            matched.sort();
            Reply::Array(Some(matched.into_iter().map(|k| bulk(k)).collect()))
        }
        b"DBSIZE" => int(db.entries.len() as i64),
        b"FLUSHDB" => {
            for key in db.entries.keys().cloned().collect::<Vec<_>>() {
                db.bump(&key);
            }
            db.entries.clear();
            ok()
        }
        b"INFO" => bulk(b"# Server\r\nrole:master\r\n"),
        b"LPUSH" | b"RPUSH" => {
            let Some(key) = args.get(1) else {
                return err("ERR", "wrong number of arguments");
            };
            let entry = db
                .entries
                .entry(key.clone())
                .or_insert_with(|| Entry::List(VecDeque::new()));
            let Entry::List(list) = entry else {
                return wrongtype();
            };
            for value in &args[2..] {
                if verb == b"LPUSH" {
                    list.push_front(value.clone());
                } else {
                    list.push_back(value.clone());
                }
            }
            let len = list.len();
            db.bump(key);
            int(len as i64)
        }
        b"LPOP" | b"RPOP" => {
            let Some(key) = args.get(1) else {
                return err("ERR", "wrong number of arguments");
            };
            let Some(entry) = db.entries.get_mut(key) else {
                return nil();
            };
            let Entry::List(list) = entry else {
                return wrongtype();
            };
            let popped = if verb == b"LPOP" {
                list.pop_front()
            } else {
                list.pop_back()
            };
            let emptied = list.is_empty();
            let reply = match popped {
                Some(value) => bulk(&value),
                None => nil(),
            };
            if emptied {
                db.entries.remove(key);
            }
            db.bump(key);
            reply
        }
        b"LRANGE" => {
            let Some(key) = args.get(1) else {
                return err("ERR", "wrong number of arguments");
            };
            let (Some(start), Some(stop)) = (parse_int(args.get(2)), parse_int(args.get(3)))
            else {
                return err("ERR", "value is not an integer or out of range");
            };
            let list = match db.entries.get(key) {
                Some(Entry::List(list)) => list,
                Some(_) => return wrongtype(),
                None => return Reply::Array(Some(Vec::new())),
            };
            let len = list.len() as i64;
            let start = (if start < 0 { start + len } else { start }).max(0);
            let stop = (if stop < 0 { stop + len } else { stop }).min(len - 1);
            if start > stop {
                return Reply::Array(Some(Vec::new()));
            }
            let items = list
                .iter()
                .skip(start as usize)
                .take((stop - start + 1) as usize)
                .map(|v| bulk(v))
                .collect();
            Reply::Array(Some(items))
        }
        b"LLEN" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::List(list)) => int(list.len() as i64),
            Some(_) => wrongtype(),
            None => int(0),
        },
        b"HSET" => {
            let Some(key) = args.get(1) else {
                return err("ERR", "wrong number of arguments");
            };
            if args.len() < 4 || args.len() % 2 != 0 {
                return err("ERR", "wrong number of arguments for 'hset' command");
            }
            let entry = db
                .entries
                .entry(key.clone())
                .or_insert_with(|| Entry::Hash(Vec::new()));
            let Entry::Hash(hash) = entry else {
                return wrongtype();
            };
            let mut added = 0;
            for pair in args[2..].chunks(2) {
                match hash.iter_mut().find(|(field, _)| field == &pair[0]) {
                    Some((_, value)) => *value = pair[1].clone(),
                    None => {
                        hash.push((pair[0].clone(), pair[1].clone()));
                        added += 1;
                    }
                }
            }
            db.bump(key);
            int(added)
        }
        b"HGET" => {
            let hash = match db.entries.get(arg_or_empty(&args, 1)) {
                Some(Entry::Hash(hash)) => hash,
                Some(_) => return wrongtype(),
                None => return nil(),
            };
            match hash.iter().find(|(field, _)| field == arg_or_empty(&args, 2)) {
                Some((_, value)) => bulk(value),
                None => nil(),
            }
        }
        b"HMGET" => {
            let hash = match db.entries.get(arg_or_empty(&args, 1)) {
                Some(Entry::Hash(hash)) => Some(hash),
                Some(_) => return wrongtype(),
                None => None,
            };
            let items = args[2..]
                .iter()
                .map(|field| {
                    hash.and_then(|h| h.iter().find(|(f, _)| f == field))
                        .map(|(_, value)| bulk(value))
                        .unwrap_or_else(nil)
                })
                .collect();
            Reply::Array(Some(items))
        }
        b"HDEL" => {
            let Some(key) = args.get(1) else {
                return err("ERR", "wrong number of arguments");
            };
            let Some(Entry::Hash(hash)) = db.entries.get_mut(key) else {
                return int(0);
            };
            let before = hash.len();
            hash.retain(|(field, _)| !args[2..].contains(field));
            let removed = before - hash.len();
            if hash.is_empty() {
                db.entries.remove(key);
            }
            db.bump(key);
            int(removed as i64)
        }
        b"HKEYS" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Hash(hash)) => {
                Reply::Array(Some(hash.iter().map(|(field, _)| bulk(field)).collect()))
            }
            Some(_) => wrongtype(),
            None => Reply::Array(Some(Vec::new())),
        },
        b"HVALS" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Hash(hash)) => {
                Reply::Array(Some(hash.iter().map(|(_, value)| bulk(value)).collect()))
            }
            Some(_) => wrongtype(),
            None => Reply::Array(Some(Vec::new())),
        },
        b"HLEN" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Hash(hash)) => int(hash.len() as i64),
            Some(_) => wrongtype(),
            None => int(0),
        },
        b"HGETALL" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Hash(hash)) => {
                let mut items = Vec::with_capacity(hash.len() * 2);
                for (field, value) in hash {
                    items.push(bulk(field));
                    items.push(bulk(value));
                }
                Reply::Array(Some(items))
            }
            Some(_) => wrongtype(),
            None => Reply::Array(Some(Vec::new())),
        },
        b"HEXISTS" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Hash(hash)) => {
                let found = hash.iter().any(|(field, _)| field == arg_or_empty(&args, 2));
                int(found as i64)
            }
            Some(_) => wrongtype(),
            None => int(0),
        },
        b"SADD" => {
            let Some(key) = args.get(1) else {
                return err("ERR", "wrong number of arguments");
            };
            let entry = db
                .entries
                .entry(key.clone())
                .or_insert_with(|| Entry::Set(Vec::new()));
            let Entry::Set(set) = entry else {
                return wrongtype();
            };
            let mut added = 0;
            for member in &args[2..] {
                if !set.contains(member) {
                    set.push(member.clone());
                    added += 1;
                }
            }
            db.bump(key);
            int(added)
        }
        b"SREM" => {
            let Some(key) = args.get(1) else {
                return err("ERR", "wrong number of arguments");
            };
            let Some(Entry::Set(set)) = db.entries.get_mut(key) else {
                return int(0);
            };
            let before = set.len();
            set.retain(|member| !args[2..].contains(member));
            let removed = before - set.len();
            if set.is_empty() {
                db.entries.remove(key);
            }
            db.bump(key);
            int(removed as i64)
        }
        b"SMEMBERS" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Set(set)) => {
                Reply::Array(Some(set.iter().map(|member| bulk(member)).collect()))
            }
            Some(_) => wrongtype(),
            None => Reply::Array(Some(Vec::new())),
        },
        b"SISMEMBER" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Set(set)) => int(set.contains(&arg_or_empty(&args, 2).to_vec()) as i64),
            Some(_) => wrongtype(),
            None => int(0),
        },
        b"SCARD" => match db.entries.get(arg_or_empty(&args, 1)) {
            Some(Entry::Set(set)) => int(set.len() as i64),
            Some(_) => wrongtype(),
            None => int(0),
        },
        _ => err(
            "ERR",
            &format!("unknown command '{}'", String::from_utf8_lossy(&args[0])),
        ),
    }
}

fn incr_by(db: &mut Db, key: &[u8], delta: i64) -> Reply {
    let entry = db
        .entries
        .entry(key.to_vec())
        .or_insert_with(|| Entry::Str(b"0".to_vec()));
    let Entry::Str(value) = entry else {
        return wrongtype();
    };
    let Ok(current) = std::str::from_utf8(value)
        .map_err(|_| ())
        .and_then(|s| s.parse::<i64>().map_err(|_| ()))
    else {
        return err("ERR", "value is not an integer or out of range");
    };
    let next = current + delta;
    *value = next.to_string().into_bytes();
    db.bump(key);
    int(next)
}

fn wrongtype() -> Reply {
    err(
        "WRONGTYPE",
        "Operation against a key holding the wrong kind of value",
    )
}

fn arg_or_empty<'a>(args: &'a [Vec<u8>], index: usize) -> &'a [u8] {
    args.get(index).map(Vec::as_slice).unwrap_or(b"")
}

fn parse_int(arg: Option<&Vec<u8>>) -> Option<i64> {
    std::str::from_utf8(arg?).ok()?.parse().ok()
}

/// Minimal glob: `*` alone matches everything, a trailing `*` matches a
/// prefix, anything else is an exact match.
fn glob_match(pattern: &[u8], key: &[u8]) -> bool {
    if pattern == b"*" {
        return true;
    }
    match pattern.strip_suffix(b"*") {
        Some(prefix) => key.starts_with(prefix),
        None => pattern == key,
    }
}
