// src/collections/capped.rs

//! A size-capped collection: newest elements on the left, oldest evicted from the right.

use super::{KeyedList, log_push, reply_len};
use crate::config::ConnectionConfig;
use crate::core::QrError;
use crate::core::protocol::{ListCommand, ListEnd};
use crate::core::store::{ListStore, RespStore};
use std::sync::Arc;

/// A collection that never holds more than `capacity` elements.
///
/// Each push is sent as one atomic batch of `LPUSH` and `LTRIM`, so no reader,
/// in this process or any other, can observe the list above capacity.
#[derive(Debug, Clone)]
pub struct CappedCollection {
    list: KeyedList,
    capacity: usize,
}

impl CappedCollection {
    pub fn new(key: impl Into<String>, size: usize, store: Arc<dyn ListStore>) -> Self {
        Self {
            list: KeyedList::new(key.into(), store),
            capacity: size,
        }
    }

    pub fn with_config(key: impl Into<String>, size: usize, config: ConnectionConfig) -> Self {
        Self::new(key, size, Arc::new(RespStore::new(config)))
    }

    pub fn key(&self) -> &str {
        self.list.key()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The inclusive range `LTRIM` must keep. A zero capacity maps to `1..=0`,
    /// which the server treats as empty and so deletes the list.
    fn trim_range(&self) -> (i64, i64) {
        match self.capacity {
            0 => (1, 0),
            n => (0, i64::try_from(n).unwrap_or(i64::MAX) - 1),
        }
    }

    /// Pushes an element, evicting the oldest ones beyond capacity.
    /// Returns the length after trimming.
    pub async fn push(&self, element: impl Into<String>) -> Result<usize, QrError> {
        let element = element.into();
        let key = self.list.key();
        let (start, stop) = self.trim_range();

        let mut replies = self
            .list
            .store()
            .exec_atomic(vec![
                ListCommand::push(key.to_owned(), element.clone(), ListEnd::Left),
                ListCommand::trim(key.to_owned(), start, stop),
            ])
            .await?
            .into_iter();

        let pushed_len = replies
            .next()
            .ok_or_else(|| QrError::UnexpectedReply("missing LPUSH reply".into()))?
            .into_integer()?;
        replies
            .next()
            .ok_or_else(|| QrError::UnexpectedReply("missing LTRIM reply".into()))?
            .expect_ok()?;

        log_push(&element, key);
        Ok(reply_len(pushed_len)?.min(self.capacity))
    }

    /// Removes and returns the oldest element, or `None`.
    pub async fn pop(&self) -> Result<Option<String>, QrError> {
        self.list.pop(ListEnd::Right).await
    }

    /// All elements, most recent first.
    pub async fn elements(&self) -> Result<Vec<String>, QrError> {
        self.list.elements().await
    }

    pub async fn elements_as_json(&self) -> Result<String, QrError> {
        self.list.elements_as_json().await
    }
}
