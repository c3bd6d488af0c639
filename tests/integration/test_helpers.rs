// tests/integration/test_helpers.rs

//! Test helpers: a small RESP server backed by a `MemoryStore`, so the wire
//! client can be exercised end-to-end without an external SpinelDB instance.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use spinelqr::core::protocol::{ListCommand, ListEnd, RespFrame, RespFrameCodec};
use spinelqr::{
    CappedCollection, ConnectionConfig, Deque, ListStore, MemoryStore, Queue, RespStore, Stack,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_util::codec::Framed;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Knobs for the behaviour of the test server.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// When set, every list command requires a prior successful `AUTH`.
    pub password: Option<String>,
    /// When set, `AUTH` must name this user.
    pub username: Option<String>,
}

/// Shared state of a running test server.
#[derive(Debug)]
struct ServerShared {
    store: Arc<MemoryStore>,
    options: ServerOptions,
    connections: AtomicUsize,
    /// Connections whose serving task is still running.
    live: AtomicUsize,
    /// Makes the next `EXEC` answer with a null array, as after a failed `WATCH`.
    abort_next_exec: AtomicBool,
    selected_db: AtomicUsize,
}

/// TestContext owns a running server and hands out clients connected to it.
pub struct TestContext {
    shared: Arc<ServerShared>,
    kick: watch::Sender<u64>,
    pub config: ConnectionConfig,
}

impl TestContext {
    /// Starts a server with default options (no password).
    pub async fn new() -> Self {
        Self::with_options(ServerOptions::default()).await
    }

    pub async fn with_options(options: ServerOptions) -> Self {
        // Initialize tracing (ignore error if already initialized)
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("warn"))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().expect("no local addr").port();

        let shared = Arc::new(ServerShared {
            store: Arc::new(MemoryStore::new()),
            options: options.clone(),
            connections: AtomicUsize::new(0),
            live: AtomicUsize::new(0),
            abort_next_exec: AtomicBool::new(false),
            selected_db: AtomicUsize::new(0),
        });
        let (kick, _) = watch::channel(0u64);

        let accept_shared = shared.clone();
        let accept_kick = kick.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                accept_shared.connections.fetch_add(1, Ordering::SeqCst);
                accept_shared.live.fetch_add(1, Ordering::SeqCst);
                let kicked = accept_kick.subscribe();
                tokio::spawn(serve_connection(socket, accept_shared.clone(), kicked));
            }
        });

        let config = ConnectionConfig {
            port,
            username: options.username,
            password: options.password,
            read_timeout: Duration::from_secs(2),
            ..ConnectionConfig::default()
        };

        Self {
            shared,
            kick,
            config,
        }
    }

    /// A fresh client store with its own connection.
    pub fn client(&self) -> Arc<dyn ListStore> {
        Arc::new(RespStore::new(self.config.clone()))
    }

    /// The in-memory lists behind the server, for inspecting state without going over the wire.
    pub fn backing(&self) -> &Arc<MemoryStore> {
        &self.shared.store
    }

    pub fn deque(&self, key: &str) -> Deque {
        Deque::new(key, self.client())
    }

    pub fn queue(&self, key: &str) -> Queue {
        Queue::new(key, self.client())
    }

    pub fn stack(&self, key: &str) -> Stack {
        Stack::new(key, self.client())
    }

    pub fn capped(&self, key: &str, size: usize) -> CappedCollection {
        CappedCollection::new(key, size, self.client())
    }

    /// Number of connections accepted so far.
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn selected_db(&self) -> usize {
        self.shared.selected_db.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn abort_next_exec(&self) {
        self.shared.abort_next_exec.store(true, Ordering::SeqCst);
    }

    /// Closes every open connection from the server side and waits until they are gone.
    #[allow(dead_code)]
    pub async fn disconnect_all(&self) {
        self.kick.send_modify(|generation| *generation += 1);
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.shared.live.load(Ordering::SeqCst) > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("connections did not close");
    }

    /// Reads the backing list directly, index 0 first.
    pub fn snapshot(&self, key: &str) -> Vec<String> {
        match self.shared.store.apply(&ListCommand::range(key.to_owned(), 0, -1)) {
            spinelqr::core::RespValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    spinelqr::core::RespValue::BulkString(b) => {
                        String::from_utf8_lossy(&b).into_owned()
                    }
                    other => panic!("unexpected element {other:?}"),
                })
                .collect(),
            other => panic!("unexpected LRANGE reply {other:?}"),
        }
    }
}

/// Per-connection session state.
#[derive(Default)]
struct Session {
    authenticated: bool,
    in_multi: bool,
    queue_error: bool,
    queued: Vec<ListCommand>,
}

async fn serve_connection(
    socket: TcpStream,
    shared: Arc<ServerShared>,
    kicked: watch::Receiver<u64>,
) {
    serve_session(socket, &shared, kicked).await;
    shared.live.fetch_sub(1, Ordering::SeqCst);
}

async fn serve_session(
    socket: TcpStream,
    shared: &ServerShared,
    mut kicked: watch::Receiver<u64>,
) {
    let mut framed = Framed::new(socket, RespFrameCodec::default());
    let mut session = Session {
        authenticated: shared.options.password.is_none(),
        ..Session::default()
    };

    loop {
        let frame = tokio::select! {
            frame = framed.next() => frame,
            _ = kicked.changed() => return,
        };
        let Some(Ok(frame)) = frame else {
            return;
        };
        let reply = handle_frame(frame, shared, &mut session);
        if framed.send(reply).await.is_err() {
            return;
        }
    }
}

fn handle_frame(frame: RespFrame, shared: &ServerShared, session: &mut Session) -> RespFrame {
    let RespFrame::Array(parts) = frame else {
        return RespFrame::Error("ERR Protocol error: expected array".into());
    };
    let mut args = parts.into_iter().map(|part| match part {
        RespFrame::BulkString(b) => b,
        _ => Bytes::new(),
    });
    let Some(name) = args.next() else {
        return RespFrame::Error("ERR empty command".into());
    };
    let name = String::from_utf8_lossy(&name).to_ascii_uppercase();
    let args: Vec<Bytes> = args.collect();

    match name.as_str() {
        "PING" => return RespFrame::SimpleString("PONG".into()),
        "AUTH" => return handle_auth(&args, shared, session),
        _ => {}
    }
    if !session.authenticated {
        return RespFrame::Error("NOAUTH Authentication required.".into());
    }

    match name.as_str() {
        "SELECT" => {
            let db = std::str::from_utf8(args.first().map(|b| &b[..]).unwrap_or(b""))
                .ok()
                .and_then(|s| s.parse::<usize>().ok());
            match db {
                Some(db) if db < 16 => {
                    shared.selected_db.store(db, Ordering::SeqCst);
                    RespFrame::SimpleString("OK".into())
                }
                _ => RespFrame::Error("ERR DB index is out of range".into()),
            }
        }
        "MULTI" => {
            if session.in_multi {
                return RespFrame::Error("ERR MULTI calls can not be nested".into());
            }
            session.in_multi = true;
            session.queue_error = false;
            session.queued.clear();
            RespFrame::SimpleString("OK".into())
        }
        "DISCARD" => {
            session.in_multi = false;
            session.queued.clear();
            RespFrame::SimpleString("OK".into())
        }
        "EXEC" => {
            if !session.in_multi {
                return RespFrame::Error("ERR EXEC without MULTI".into());
            }
            session.in_multi = false;
            let queued = std::mem::take(&mut session.queued);
            if session.queue_error {
                return RespFrame::Error(
                    "EXECABORT Transaction discarded because of previous errors.".into(),
                );
            }
            if shared.abort_next_exec.swap(false, Ordering::SeqCst) {
                return RespFrame::NullArray;
            }
            let replies = shared.store.apply_atomic(&queued);
            RespFrame::Array(replies.into_iter().map(Into::into).collect())
        }
        _ => match parse_list_command(&name, &args) {
            Ok(command) if session.in_multi => {
                session.queued.push(command);
                RespFrame::SimpleString("QUEUED".into())
            }
            Ok(command) => shared.store.apply(&command).into(),
            Err(msg) => {
                if session.in_multi {
                    session.queue_error = true;
                }
                RespFrame::Error(msg)
            }
        },
    }
}

fn handle_auth(args: &[Bytes], shared: &ServerShared, session: &mut Session) -> RespFrame {
    let Some(expected) = &shared.options.password else {
        return RespFrame::Error(
            "ERR AUTH <password> called without any password configured".into(),
        );
    };
    let (user, password) = match args {
        [password] => (None, password),
        [user, password] => (Some(user), password),
        _ => return RespFrame::Error("ERR wrong number of arguments for 'auth' command".into()),
    };
    let user_ok = match (&shared.options.username, user) {
        (Some(want), Some(got)) => want.as_bytes() == got.as_ref(),
        (None, None) => true,
        (None, Some(got)) => got.as_ref() == b"default",
        (Some(_), None) => false,
    };
    if user_ok && expected.as_bytes() == password.as_ref() {
        session.authenticated = true;
        RespFrame::SimpleString("OK".into())
    } else {
        RespFrame::Error("WRONGPASS invalid username-password pair".into())
    }
}

fn parse_list_command(name: &str, args: &[Bytes]) -> Result<ListCommand, String> {
    let index = |b: &Bytes| -> Result<i64, String> {
        std::str::from_utf8(b)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| "ERR value is not an integer or out of range".to_string())
    };
    let arity = || format!("ERR wrong number of arguments for '{}' command", name.to_lowercase());

    match (name, args) {
        ("LPUSH", [key, value]) => Ok(ListCommand::push(key.clone(), value.clone(), ListEnd::Left)),
        ("RPUSH", [key, value]) => Ok(ListCommand::push(key.clone(), value.clone(), ListEnd::Right)),
        ("LPOP", [key]) => Ok(ListCommand::pop(key.clone(), ListEnd::Left)),
        ("RPOP", [key]) => Ok(ListCommand::pop(key.clone(), ListEnd::Right)),
        ("LRANGE", [key, start, stop]) => {
            Ok(ListCommand::range(key.clone(), index(start)?, index(stop)?))
        }
        ("LTRIM", [key, start, stop]) => {
            Ok(ListCommand::trim(key.clone(), index(start)?, index(stop)?))
        }
        ("LPUSH" | "RPUSH" | "LPOP" | "RPOP" | "LRANGE" | "LTRIM", _) => Err(arity()),
        _ => Err(format!("ERR unknown command '{name}'")),
    }
}
