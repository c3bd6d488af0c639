// src/collections/stack.rs

//! A LIFO stack: push and pop both on the left end.

use super::KeyedList;
use crate::config::ConnectionConfig;
use crate::core::QrError;
use crate::core::protocol::ListEnd;
use crate::core::store::{ListStore, RespStore};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Stack {
    list: KeyedList,
}

impl Stack {
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

    /// Removes and returns the most recently pushed element, or `None`.
    pub async fn pop(&self) -> Result<Option<String>, QrError> {
        self.list.pop(ListEnd::Left).await
    }

    /// All elements, top of the stack first.
    pub async fn elements(&self) -> Result<Vec<String>, QrError> {
        self.list.elements().await
    }

    pub async fn elements_as_json(&self) -> Result<String, QrError> {
        self.list.elements_as_json().await
    }
}
