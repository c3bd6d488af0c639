// src/core/mod.rs

//! Protocol, error and store plumbing shared by the collection handles.

pub mod errors;
pub mod protocol;
pub mod store;

pub use errors::QrError;
pub use protocol::RespValue;
