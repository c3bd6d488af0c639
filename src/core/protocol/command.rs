// src/core/protocol/command.rs

//! Typed descriptions of the list primitives a collection handle can issue.

use super::RespFrame;
use bytes::Bytes;

/// Which end of a remote list an operation touches. `Left` is index 0.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ListEnd {
    Left,
    Right,
}

/// One list primitive, ready to be encoded as a request or applied to a `MemoryStore`.
///
/// Atomic batches are plain `Vec<ListCommand>`s.
#[derive(Debug, Clone, PartialEq)]
pub enum ListCommand {
    Push { key: Bytes, value: Bytes, end: ListEnd },
    Pop { key: Bytes, end: ListEnd },
    Range { key: Bytes, start: i64, stop: i64 },
    Trim { key: Bytes, start: i64, stop: i64 },
}

impl ListCommand {
    pub fn push(key: impl Into<Bytes>, value: impl Into<Bytes>, end: ListEnd) -> Self {
        ListCommand::Push {
            key: key.into(),
            value: value.into(),
            end,
        }
    }

    pub fn pop(key: impl Into<Bytes>, end: ListEnd) -> Self {
        ListCommand::Pop {
            key: key.into(),
            end,
        }
    }

    pub fn range(key: impl Into<Bytes>, start: i64, stop: i64) -> Self {
        ListCommand::Range {
            key: key.into(),
            start,
            stop,
        }
    }

    pub fn trim(key: impl Into<Bytes>, start: i64, stop: i64) -> Self {
        ListCommand::Trim {
            key: key.into(),
            start,
            stop,
        }
    }

    /// The wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            ListCommand::Push { end: ListEnd::Left, .. } => "LPUSH",
            ListCommand::Push { end: ListEnd::Right, .. } => "RPUSH",
            ListCommand::Pop { end: ListEnd::Left, .. } => "LPOP",
            ListCommand::Pop { end: ListEnd::Right, .. } => "RPOP",
            ListCommand::Range { .. } => "LRANGE",
            ListCommand::Trim { .. } => "LTRIM",
        }
    }

    pub fn key(&self) -> &Bytes {
        match self {
            ListCommand::Push { key, .. }
            | ListCommand::Pop { key, .. }
            | ListCommand::Range { key, .. }
            | ListCommand::Trim { key, .. } => key,
        }
    }

    /// The arguments following the command name, in wire order.
    pub fn to_resp_args(&self) -> Vec<Bytes> {
        match self {
            ListCommand::Push { key, value, .. } => vec![key.clone(), value.clone()],
            ListCommand::Pop { key, .. } => vec![key.clone()],
            ListCommand::Range { key, start, stop } | ListCommand::Trim { key, start, stop } => {
                vec![
                    key.clone(),
                    start.to_string().into(),
                    stop.to_string().into(),
                ]
            }
        }
    }

    pub fn to_frame(&self) -> RespFrame {
        RespFrame::request(self.name(), self.to_resp_args())
    }
}
