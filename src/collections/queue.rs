// src/collections/queue.rs

//! A FIFO queue: push on the left, pop from the right.

use super::KeyedList;
use crate::config::ConnectionConfig;
use crate::core::QrError;
use crate::core::protocol::ListEnd;
use crate::core::store::{ListStore, RespStore};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Queue {
    list: KeyedList,
}

impl Queue {
    pub fn new(key: impl Into<String>, store: Arc<dyn ListStore>) -> Self {
        Self {
            list: KeyedList::new(key.into(), store),
        }
    }

    pub fn with_config(key: impl Into<String>, config: ConnectionConfig) -> Self {
        Self::new(key, Arc::new(RespStore::new(config)))
    }

    pub fn key(&self) -> &str {
        self.list.key()
    }

    pub async fn push(&self, element: impl Into<String>) -> Result<usize, QrError> {
        self.list.push(ListEnd::Left, element.into()).await
    }

    /// Removes and returns the oldest element, or `None` if the queue is empty.
    pub async fn pop(&self) -> Result<Option<String>, QrError> {
        self.list.pop(ListEnd::Right).await
    }

    /// All elements, newest first. A queue that was never written reads as empty.
    pub async fn elements(&self) -> Result<Vec<String>, QrError> {
        self.list.elements().await
    }

    pub async fn elements_as_json(&self) -> Result<String, QrError> {
        self.list.elements_as_json().await
    }
}
