// src/core/store/memory.rs

//! An in-process `ListStore` with server-compatible list semantics.
//!
//! Lists live in a single map behind one lock, which makes every atomic batch
//! trivially indivisible. A key whose list becomes empty is removed, just as the
//! server removes it, so "never written" and "drained" look the same to readers.

use super::ListStore;
use crate::core::QrError;
use crate::core::protocol::{ListCommand, ListEnd, RespValue};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

type Lists = HashMap<Bytes, VecDeque<Bytes>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: Mutex<Lists>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a non-empty list.
    pub fn key_count(&self) -> usize {
        self.lists.lock().len()
    }

    /// Runs one command against this store synchronously. Exposed so that
    /// request handlers can serve RESP traffic from a `MemoryStore`.
    pub fn apply(&self, command: &ListCommand) -> RespValue {
        apply_command(&mut self.lists.lock(), command)
    }

    /// Runs a batch under a single lock acquisition.
    pub fn apply_atomic(&self, commands: &[ListCommand]) -> Vec<RespValue> {
        let mut lists = self.lists.lock();
        commands
            .iter()
            .map(|command| apply_command(&mut lists, command))
            .collect()
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn execute(&self, command: ListCommand) -> Result<RespValue, QrError> {
        self.apply(&command).into_result()
    }

    async fn exec_atomic(&self, commands: Vec<ListCommand>) -> Result<Vec<RespValue>, QrError> {
        debug!("Executing atomic batch of {} commands", commands.len());
        Ok(self.apply_atomic(&commands))
    }
}

fn apply_command(lists: &mut Lists, command: &ListCommand) -> RespValue {
    match command {
        ListCommand::Push { key, value, end } => {
            let list = lists.entry(key.clone()).or_default();
            match end {
                ListEnd::Left => list.push_front(value.clone()),
                ListEnd::Right => list.push_back(value.clone()),
            }
            RespValue::Integer(list.len() as i64)
        }
        ListCommand::Pop { key, end } => {
            let Some(list) = lists.get_mut(key) else {
                return RespValue::Null;
            };
            let popped = match end {
                ListEnd::Left => list.pop_front(),
                ListEnd::Right => list.pop_back(),
            };
            if list.is_empty() {
                lists.remove(key);
            }
            popped.map_or(RespValue::Null, RespValue::BulkString)
        }
        ListCommand::Range { key, start, stop } => {
            let Some(list) = lists.get(key) else {
                return RespValue::Array(vec![]);
            };
            let values = match resolve_range(list.len(), *start, *stop) {
                Some((first, last)) => list
                    .range(first..=last)
                    .cloned()
                    .map(RespValue::BulkString)
                    .collect(),
                None => vec![],
            };
            RespValue::Array(values)
        }
        ListCommand::Trim { key, start, stop } => {
            let Some(list) = lists.get_mut(key) else {
                return RespValue::SimpleString("OK".into());
            };
            match resolve_range(list.len(), *start, *stop) {
                Some((first, last)) => {
                    list.truncate(last + 1);
                    list.drain(..first);
                }
                None => list.clear(),
            }
            if list.is_empty() {
                lists.remove(key);
            }
            RespValue::SimpleString("OK".into())
        }
    }
}

/// Maps signed, inclusive `start`/`stop` indices onto `0..len`.
/// Returns `None` when the resulting range is empty.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    if len == 0 {
        return None;
    }
    let start = if start < 0 { len + start } else { start }.max(0);
    let stop = if stop < 0 { len + stop } else { stop }.min(len - 1);
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}
