// src/core/store/resp.rs

//! A `ListStore` that talks RESP over TCP to SpinelDB or any Redis-compatible server.

use super::ListStore;
use crate::config::ConnectionConfig;
use crate::core::QrError;
use crate::core::protocol::{ListCommand, RespFrame, RespFrameCodec, RespValue};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

/// A single lazily-opened connection, shared by every handle holding this store.
///
/// Requests are serialized on the connection mutex. An atomic batch keeps the
/// mutex for its whole `MULTI` .. `EXEC` exchange, so commands from other tasks
/// using the same store can never end up queued inside the transaction.
#[derive(Debug)]
pub struct RespStore {
    config: ConnectionConfig,
    conn: Mutex<Option<Connection>>,
}

impl RespStore {
    /// Creates a store for `config`. No connection is made until the first command.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    /// Connects eagerly, surfacing connection and authentication errors up front.
    pub async fn connect(config: ConnectionConfig) -> Result<Self, QrError> {
        let store = Self::new(config);
        let mut guard = store.conn.lock().await;
        *guard = Some(Connection::open(&store.config).await?);
        drop(guard);
        Ok(store)
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Sends `frames` in one write and waits for exactly one reply per frame.
    ///
    /// The connection is taken out of the slot for the whole exchange and put
    /// back only once every reply has been read. If the calling future is
    /// dropped part way, the half-read connection is dropped with it and the
    /// next call opens a fresh one.
    async fn round_trip(&self, frames: Vec<RespFrame>) -> Result<Vec<RespFrame>, QrError> {
        let mut guard = self.conn.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => Connection::open(&self.config).await?,
        };

        let result = conn.pipeline(frames, &self.config).await;
        match &result {
            Err(e) if e.is_transport() => {
                warn!(
                    "Dropping connection to {} after error: {}",
                    self.config.addr(),
                    e
                );
            }
            _ => *guard = Some(conn),
        }
        result
    }
}

#[async_trait]
impl ListStore for RespStore {
    async fn execute(&self, command: ListCommand) -> Result<RespValue, QrError> {
        let mut replies = self.round_trip(vec![command.to_frame()]).await?;
        let reply = replies.pop().ok_or(QrError::ConnectionClosed)?;
        RespValue::from(reply).into_result()
    }

    async fn exec_atomic(&self, commands: Vec<ListCommand>) -> Result<Vec<RespValue>, QrError> {
        let mut frames = Vec::with_capacity(commands.len() + 2);
        frames.push(RespFrame::request("MULTI", []));
        frames.extend(commands.iter().map(ListCommand::to_frame));
        frames.push(RespFrame::request("EXEC", []));

        let mut replies = self.round_trip(frames).await?.into_iter();

        if let Some(multi) = replies.next() {
            RespValue::from(multi).expect_ok()?;
        }
        let exec = replies.next_back().ok_or(QrError::ConnectionClosed)?;
        // A queuing error makes the server answer EXEC with EXECABORT, which carries
        // less detail than the queuing rejection itself, so report the first one instead.
        for queued in replies {
            if let RespFrame::Error(msg) = queued {
                return Err(QrError::Server(msg));
            }
        }

        match RespValue::from(exec) {
            RespValue::Array(results) => Ok(results),
            RespValue::NullArray | RespValue::Null => Err(QrError::TransactionAborted),
            RespValue::Error(msg) => Err(QrError::Server(msg)),
            other => Err(QrError::UnexpectedReply(format!(
                "expected EXEC array, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug)]
struct Connection {
    stream: TcpStream,
    codec: RespFrameCodec,
    read_buf: BytesMut,
}

impl Connection {
    async fn open(config: &ConnectionConfig) -> Result<Self, QrError> {
        let addr = config.addr();
        let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&addr)).await??;
        stream.set_nodelay(true)?;
        debug!("Connected to {}", addr);

        let mut conn = Self {
            stream,
            codec: RespFrameCodec::default(),
            read_buf: BytesMut::with_capacity(4096),
        };
        conn.handshake(config).await?;
        Ok(conn)
    }

    /// Sends `AUTH` and `SELECT` as configured. Both must answer `+OK`.
    async fn handshake(&mut self, config: &ConnectionConfig) -> Result<(), QrError> {
        let mut frames = Vec::new();
        if let Some(password) = &config.password {
            let mut args = Vec::with_capacity(2);
            if let Some(username) = &config.username {
                args.push(Bytes::from(username.clone()));
            }
            args.push(Bytes::from(password.clone()));
            frames.push(RespFrame::request("AUTH", args));
        }
        if config.database != 0 {
            frames.push(RespFrame::request(
                "SELECT",
                [Bytes::from(config.database.to_string())],
            ));
        }
        if frames.is_empty() {
            return Ok(());
        }

        for reply in self.pipeline(frames, config).await? {
            RespValue::from(reply).expect_ok()?;
        }
        debug!("Handshake with {} complete", config.addr());
        Ok(())
    }

    async fn pipeline(
        &mut self,
        frames: Vec<RespFrame>,
        config: &ConnectionConfig,
    ) -> Result<Vec<RespFrame>, QrError> {
        let expected = frames.len();
        let mut write_buf = BytesMut::new();
        for frame in frames {
            self.codec.encode(frame, &mut write_buf)?;
        }
        self.stream.write_all(&write_buf).await?;

        let mut replies = Vec::with_capacity(expected);
        while replies.len() < expected {
            replies.push(self.read_reply(config).await?);
        }
        Ok(replies)
    }

    async fn read_reply(&mut self, config: &ConnectionConfig) -> Result<RespFrame, QrError> {
        loop {
            // Replies to a pipeline can arrive in one read, so drain the buffer first.
            if let Some(frame) = self.codec.decode(&mut self.read_buf)? {
                return Ok(frame);
            }
            let read = self.stream.read_buf(&mut self.read_buf);
            match tokio::time::timeout(config.read_timeout, read).await? {
                Ok(0) => return Err(QrError::ConnectionClosed),
                Ok(_) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}
