// src/core/errors.rs

//! Defines the primary error type for the client library.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing every failure a collection handle can surface.
///
/// Transport failures are passed through as-is; an empty pop is *not* an error and
/// never appears here.
#[derive(Error, Debug)]
pub enum QrError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Incomplete data in stream")]
    IncompleteData,

    #[error("Syntax error")]
    SyntaxError,

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Timed out while waiting for the server")]
    Timeout,

    /// An error reply (`-ERR ...`) sent back by the server.
    #[error("{0}")]
    Server(String),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Transaction aborted (EXEC returned nil)")]
    TransactionAborted,

    #[error("JSON serialization error: {0}")]
    Json(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
impl Clone for QrError {
    fn clone(&self) -> Self {
        match self {
            QrError::Io(e) => QrError::Io(Arc::clone(e)),
            QrError::IncompleteData => QrError::IncompleteData,
            QrError::SyntaxError => QrError::SyntaxError,
            QrError::ConnectionClosed => QrError::ConnectionClosed,
            QrError::Timeout => QrError::Timeout,
            QrError::Server(s) => QrError::Server(s.clone()),
            QrError::UnexpectedReply(s) => QrError::UnexpectedReply(s.clone()),
            QrError::TransactionAborted => QrError::TransactionAborted,
            QrError::Json(s) => QrError::Json(s.clone()),
            QrError::InvalidConfig(s) => QrError::InvalidConfig(s.clone()),
        }
    }
}

impl PartialEq for QrError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (QrError::Io(e1), QrError::Io(e2)) => e1.kind() == e2.kind(),
            (QrError::Server(s1), QrError::Server(s2)) => s1 == s2,
            (QrError::UnexpectedReply(s1), QrError::UnexpectedReply(s2)) => s1 == s2,
            (QrError::Json(s1), QrError::Json(s2)) => s1 == s2,
            (QrError::InvalidConfig(s1), QrError::InvalidConfig(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl QrError {
    /// Returns true for failures that leave the connection in an unknown state.
    /// The wire store drops its connection when it sees one of these.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QrError::Io(_)
                | QrError::ConnectionClosed
                | QrError::Timeout
                | QrError::SyntaxError
                | QrError::UnexpectedReply(_)
        )
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for QrError {
    fn from(e: std::io::Error) -> Self {
        QrError::Io(Arc::new(e))
    }
}

impl From<tokio::time::error::Elapsed> for QrError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        QrError::Timeout
    }
}

impl From<serde_json::Error> for QrError {
    fn from(e: serde_json::Error) -> Self {
        QrError::Json(e.to_string())
    }
}

impl From<url::ParseError> for QrError {
    fn from(e: url::ParseError) -> Self {
        QrError::InvalidConfig(format!("invalid connection URL: {e}"))
    }
}
