// src/collections/deque.rs

//! A double-ended queue over one remote list.
//!
//! The back of the deque is the list's left end (index 0) and the front is its
//! right end. So `pushback` is `LPUSH`, `pushfront` is `RPUSH`, `popfront` is
//! `RPOP` and `popback` is `LPOP`. Existing data written by other clients of
//! the same key relies on this mapping, so it must not be flipped.

use super::KeyedList;
use crate::config::ConnectionConfig;
use crate::core::QrError;
use crate::core::protocol::ListEnd;
use crate::core::store::{ListStore, RespStore};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Deque {
    list: KeyedList,
}

impl Deque {
    pub fn new(key: impl Into<String>, store: Arc<dyn ListStore>) -> Self {
        Self {
            list: KeyedList::new(key.into(), store),
        }
    }

    /// Builds a deque with its own connection to the server described by `config`.
    pub fn with_config(key: impl Into<String>, config: ConnectionConfig) -> Self {
        Self::new(key, Arc::new(RespStore::new(config)))
    }

    pub fn key(&self) -> &str {
        self.list.key()
    }

    /// Pushes an element to the back. Returns the new length.
    pub async fn pushback(&self, element: impl Into<String>) -> Result<usize, QrError> {
        self.list.push(ListEnd::Left, element.into()).await
    }

    /// Pushes an element to the front. Returns the new length.
    pub async fn pushfront(&self, element: impl Into<String>) -> Result<usize, QrError> {
        self.list.push(ListEnd::Right, element.into()).await
    }

    /// Pops the front element, or `None` if the deque is empty.
    pub async fn popfront(&self) -> Result<Option<String>, QrError> {
        self.list.pop(ListEnd::Right).await
    }

    /// Pops the back element, or `None` if the deque is empty.
    pub async fn popback(&self) -> Result<Option<String>, QrError> {
        self.list.pop(ListEnd::Left).await
    }

    /// All elements, back first.
    pub async fn elements(&self) -> Result<Vec<String>, QrError> {
        self.list.elements().await
    }

    pub async fn elements_as_json(&self) -> Result<String, QrError> {
        self.list.elements_as_json().await
    }
}
