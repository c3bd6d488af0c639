// src/core/protocol/resp_value.rs

//! Defines the decoded reply type handed back by a `ListStore`.

use crate::core::QrError;
use bytes::Bytes;

/// `RespValue` is a reply as the collection layer sees it.
///
/// It mirrors `RespFrame`, but is what both the wire store and the in-memory store
/// produce, so handles can decode replies without caring where they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    BulkString(Bytes),
    Integer(i64),
    Array(Vec<RespValue>),
    Null,
    NullArray,
    Error(String),
}

impl From<super::RespFrame> for RespValue {
    fn from(frame: super::RespFrame) -> Self {
        match frame {
            super::RespFrame::SimpleString(s) => RespValue::SimpleString(s),
            super::RespFrame::Error(s) => RespValue::Error(s),
            super::RespFrame::Integer(i) => RespValue::Integer(i),
            super::RespFrame::BulkString(b) => RespValue::BulkString(b),
            super::RespFrame::Null => RespValue::Null,
            super::RespFrame::NullArray => RespValue::NullArray,
            super::RespFrame::Array(arr) => {
                RespValue::Array(arr.into_iter().map(Into::into).collect())
            }
        }
    }
}

/// The reverse direction, used by servers that answer with values produced by a `MemoryStore`.
impl From<RespValue> for super::RespFrame {
    fn from(val: RespValue) -> Self {
        match val {
            RespValue::SimpleString(s) => super::RespFrame::SimpleString(s),
            RespValue::BulkString(b) => super::RespFrame::BulkString(b),
            RespValue::Integer(i) => super::RespFrame::Integer(i),
            RespValue::Array(arr) => {
                super::RespFrame::Array(arr.into_iter().map(Into::into).collect())
            }
            RespValue::Null => super::RespFrame::Null,
            RespValue::NullArray => super::RespFrame::NullArray,
            RespValue::Error(s) => super::RespFrame::Error(s),
        }
    }
}

impl RespValue {
    /// Turns an error reply into `Err(QrError::Server)` and passes everything else through.
    pub fn into_result(self) -> Result<RespValue, QrError> {
        match self {
            RespValue::Error(msg) => Err(QrError::Server(msg)),
            other => Ok(other),
        }
    }

    /// Decodes an integer reply, such as the list length returned by `LPUSH`.
    pub fn into_integer(self) -> Result<i64, QrError> {
        match self.into_result()? {
            RespValue::Integer(i) => Ok(i),
            other => Err(QrError::UnexpectedReply(format!(
                "expected integer, got {other:?}"
            ))),
        }
    }

    /// Decodes a single optional element, such as the reply to `LPOP`.
    /// Both null forms are the "no element" case.
    pub fn into_optional_bytes(self) -> Result<Option<Bytes>, QrError> {
        match self.into_result()? {
            RespValue::BulkString(b) => Ok(Some(b)),
            RespValue::SimpleString(s) => Ok(Some(Bytes::from(s))),
            RespValue::Null | RespValue::NullArray => Ok(None),
            other => Err(QrError::UnexpectedReply(format!(
                "expected bulk string or nil, got {other:?}"
            ))),
        }
    }

    /// Decodes a multi-element reply, such as the reply to `LRANGE`.
    /// A null array is read as an empty list.
    pub fn into_bytes_list(self) -> Result<Vec<Bytes>, QrError> {
        match self.into_result()? {
            RespValue::Array(items) => items
                .into_iter()
                .map(|item| {
                    item.into_optional_bytes()?.ok_or_else(|| {
                        QrError::UnexpectedReply("nil element inside list reply".into())
                    })
                })
                .collect(),
            RespValue::NullArray | RespValue::Null => Ok(Vec::new()),
            other => Err(QrError::UnexpectedReply(format!(
                "expected array, got {other:?}"
            ))),
        }
    }

    /// Checks for a `+OK` status reply.
    pub fn expect_ok(self) -> Result<(), QrError> {
        match self.into_result()? {
            RespValue::SimpleString(s) if s.eq_ignore_ascii_case("OK") => Ok(()),
            other => Err(QrError::UnexpectedReply(format!(
                "expected OK, got {other:?}"
            ))),
        }
    }
}
