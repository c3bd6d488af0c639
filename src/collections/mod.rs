// src/collections/mod.rs

//! Key-scoped collection handles built on the list primitives of a `ListStore`.
//!
//! A handle owns no data. It names one remote list and turns each method call
//! into a single command (or, for `CappedCollection::push`, one atomic batch).
//! All state lives on the server and may be shared with any number of other
//! handles, in this process or elsewhere.
//!
//! Every push and pop is logged with `tracing` at `debug` level. Without an
//! installed subscriber those records are discarded.

use crate::core::QrError;
use crate::core::protocol::ListEnd;
use crate::core::store::ListStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

pub mod capped;
pub mod deque;
pub mod queue;
pub mod stack;

pub use capped::CappedCollection;
pub use deque::Deque;
pub use queue::Queue;
pub use stack::Stack;

/// The key and store shared by every handle type.
#[derive(Debug, Clone)]
pub(crate) struct KeyedList {
    key: String,
    store: Arc<dyn ListStore>,
}

impl KeyedList {
    pub(crate) fn new(key: String, store: Arc<dyn ListStore>) -> Self {
        Self { key, store }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn store(&self) -> &Arc<dyn ListStore> {
        &self.store
    }

    pub(crate) async fn push(&self, end: ListEnd, element: String) -> Result<usize, QrError> {
        let value = Bytes::from(element.clone());
        let len = match end {
            ListEnd::Left => self.store.lpush(&self.key, value).await?,
            ListEnd::Right => self.store.rpush(&self.key, value).await?,
        };
        log_push(&element, &self.key);
        reply_len(len)
    }

    pub(crate) async fn pop(&self, end: ListEnd) -> Result<Option<String>, QrError> {
        let popped = match end {
            ListEnd::Left => self.store.lpop(&self.key).await?,
            ListEnd::Right => self.store.rpop(&self.key).await?,
        }
        .map(decode_element);
        log_pop(popped.as_deref(), &self.key);
        Ok(popped)
    }

    /// Snapshot of the whole list, index 0 first. An absent key reads as empty.
    pub(crate) async fn elements(&self) -> Result<Vec<String>, QrError> {
        let values = self.store.lrange(&self.key, 0, -1).await?;
        Ok(values.into_iter().map(decode_element).collect())
    }

    pub(crate) async fn elements_as_json(&self) -> Result<String, QrError> {
        let elements = self.elements().await?;
        Ok(serde_json::to_string(&elements)?)
    }
}

/// Elements are text. Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub(crate) fn decode_element(value: Bytes) -> String {
    String::from_utf8_lossy(&value).into_owned()
}

pub(crate) fn reply_len(len: i64) -> Result<usize, QrError> {
    usize::try_from(len)
        .map_err(|_| QrError::UnexpectedReply(format!("negative list length {len}")))
}

pub(crate) fn log_push(element: &str, key: &str) {
    debug!("Pushed ** {} ** for key ** {} **", element, key);
}

pub(crate) fn log_pop(element: Option<&str>, key: &str) {
    debug!("Popped ** {} ** from key ** {} **", element.unwrap_or("nil"), key);
}
