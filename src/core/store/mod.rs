// src/core/store/mod.rs

//! The connection seam between collection handles and the server holding the lists.

use crate::core::QrError;
use crate::core::protocol::{ListCommand, ListEnd, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

pub mod memory;
pub mod resp;

pub use memory::MemoryStore;
pub use resp::RespStore;

/// The list primitives every backing store must provide.
///
/// Indices for `lrange` and `ltrim` follow the server convention: zero-based,
/// inclusive on both ends, negative values count from the tail (`-1` is the last element).
///
/// The default method bodies route every primitive through `execute`, so an
/// implementation only has to know how to run one command and one atomic batch.
#[async_trait]
pub trait ListStore: Send + Sync + std::fmt::Debug {
    /// Runs a single command and returns the raw reply.
    async fn execute(&self, command: ListCommand) -> Result<RespValue, QrError>;

    /// Runs `commands` as one indivisible unit: no other client's command on any key
    /// may be applied between the first and the last. Returns one reply per command.
    async fn exec_atomic(&self, commands: Vec<ListCommand>) -> Result<Vec<RespValue>, QrError>;

    async fn lpush(&self, key: &str, value: Bytes) -> Result<i64, QrError> {
        self.execute(ListCommand::push(key.to_owned(), value, ListEnd::Left))
            .await?
            .into_integer()
    }

    async fn rpush(&self, key: &str, value: Bytes) -> Result<i64, QrError> {
        self.execute(ListCommand::push(key.to_owned(), value, ListEnd::Right))
            .await?
            .into_integer()
    }

    async fn lpop(&self, key: &str) -> Result<Option<Bytes>, QrError> {
        self.execute(ListCommand::pop(key.to_owned(), ListEnd::Left))
            .await?
            .into_optional_bytes()
    }

    async fn rpop(&self, key: &str) -> Result<Option<Bytes>, QrError> {
        self.execute(ListCommand::pop(key.to_owned(), ListEnd::Right))
            .await?
            .into_optional_bytes()
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, QrError> {
        self.execute(ListCommand::range(key.to_owned(), start, stop))
            .await?
            .into_bytes_list()
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), QrError> {
        self.execute(ListCommand::trim(key.to_owned(), start, stop))
            .await?
            .expect_ok()
    }
}
