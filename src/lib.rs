// src/lib.rs

pub mod collections;
pub mod config;
pub mod core;

// Re-export
pub use crate::collections::{CappedCollection, Deque, Queue, Stack};
pub use crate::config::ConnectionConfig;
pub use crate::core::store::{ListStore, MemoryStore, RespStore};
pub use crate::core::QrError;
