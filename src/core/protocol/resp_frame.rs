// src/core/protocol/resp_frame.rs

//! Implements the RESP (REdis Serialization Protocol) frame structure and the
//! corresponding `Encoder` and `Decoder` used on the client connection.

use crate::core::QrError;
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The CRLF (Carriage Return, Line Feed) sequence used to terminate lines in RESP.
const CRLF: &[u8] = b"\r\n";
const CRLF_LEN: usize = 2;

// Limits on what a reply may claim to contain, so a bad length prefix cannot
// make the client allocate without bound.
const MAX_FRAME_ELEMENTS: usize = 1_024 * 1_024;
const MAX_BULK_STRING_SIZE: usize = 512 * 1024 * 1024;
const MAX_RECURSION_DEPTH: usize = 256;

/// A single frame in the RESP protocol, as written to or read from the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    Null,
    NullArray,
    Array(Vec<RespFrame>),
}

impl RespFrame {
    /// Builds a request frame (an array of bulk strings) from a command name and its arguments.
    pub fn request<I>(name: &'static str, args: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut parts = vec![RespFrame::BulkString(Bytes::from_static(name.as_bytes()))];
        parts.extend(args.into_iter().map(RespFrame::BulkString));
        RespFrame::Array(parts)
    }

    /// Encodes the frame into a fresh `Vec<u8>`.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, QrError> {
        let mut buf = BytesMut::new();
        RespFrameCodec::default().encode(self.clone(), &mut buf)?;
        Ok(buf.to_vec())
    }
}

/// A `tokio_util::codec` implementation for encoding and decoding `RespFrame`s.
#[derive(Debug, Default, Clone, Copy)]
pub struct RespFrameCodec {
    /// Buffer length below which the pending frame cannot be complete yet.
    /// Set when a bulk payload is cut short, so a large reply arriving in many
    /// reads is not re-parsed from the start after every read.
    min_len: usize,
}

impl Encoder<RespFrame> for RespFrameCodec {
    type Error = QrError;

    fn encode(&mut self, item: RespFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            RespFrame::SimpleString(s) => write_line(dst, b'+', s.as_bytes()),
            RespFrame::Error(s) => write_line(dst, b'-', s.as_bytes()),
            RespFrame::Integer(i) => write_line(dst, b':', i.to_string().as_bytes()),
            RespFrame::BulkString(b) => {
                write_line(dst, b'$', b.len().to_string().as_bytes());
                dst.extend_from_slice(&b);
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Null => dst.extend_from_slice(b"$-1\r\n"),
            RespFrame::NullArray => dst.extend_from_slice(b"*-1\r\n"),
            RespFrame::Array(arr) => {
                write_line(dst, b'*', arr.len().to_string().as_bytes());
                for frame in arr {
                    self.encode(frame, dst)?;
                }
            }
        }
        Ok(())
    }
}

fn write_line(dst: &mut BytesMut, prefix: u8, body: &[u8]) {
    dst.reserve(body.len() + 1 + CRLF_LEN);
    dst.extend_from_slice(&[prefix]);
    dst.extend_from_slice(body);
    dst.extend_from_slice(CRLF);
}

impl Decoder for RespFrameCodec {
    type Item = RespFrame;
    type Error = QrError;

    /// Decodes one complete frame, or returns `Ok(None)` if the buffer holds only part of one.
    /// Nothing is consumed from `src` until a whole frame is available.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() || src.len() < self.min_len {
            return Ok(None);
        }

        let mut cursor = &src[..];
        let mut short_by = 0;
        match decode_frame(&mut cursor, 0, &mut short_by) {
            Ok(frame) => {
                let consumed = src.len() - cursor.len();
                src.advance(consumed);
                self.min_len = 0;
                Ok(Some(frame))
            }
            Err(QrError::IncompleteData) => {
                self.min_len = src.len() + short_by;
                Ok(None)
            }
            Err(e) => {
                self.min_len = 0;
                Err(e)
            }
        }
    }
}

/// Parses one frame from the front of `bytes`. On `IncompleteData`, `short_by` holds
/// how many more bytes are known to be missing (0 when unknown).
fn decode_frame(
    bytes: &mut &[u8],
    depth: usize,
    short_by: &mut usize,
) -> Result<RespFrame, QrError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(QrError::SyntaxError);
    }
    let Some((&prefix, rest)) = bytes.split_first() else {
        return Err(QrError::IncompleteData);
    };
    *bytes = rest;

    match prefix {
        b'+' => Ok(RespFrame::SimpleString(lossy(take_line(bytes)?))),
        b'-' => Ok(RespFrame::Error(lossy(take_line(bytes)?))),
        b':' => Ok(RespFrame::Integer(parse_number(take_line(bytes)?)?)),
        b'$' => decode_bulk(bytes, short_by),
        b'*' => decode_array(bytes, depth, short_by),
        _ => Err(QrError::SyntaxError),
    }
}

/// Splits off the next CRLF-terminated line, advancing past the terminator.
fn take_line<'a>(bytes: &mut &'a [u8]) -> Result<&'a [u8], QrError> {
    let pos = bytes
        .windows(CRLF_LEN)
        .position(|window| window == CRLF)
        .ok_or(QrError::IncompleteData)?;
    let line = &bytes[..pos];
    *bytes = &bytes[pos + CRLF_LEN..];
    Ok(line)
}

fn lossy(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}

fn parse_number(line: &[u8]) -> Result<i64, QrError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(QrError::SyntaxError)
}

fn decode_bulk(bytes: &mut &[u8], short_by: &mut usize) -> Result<RespFrame, QrError> {
    let len = parse_number(take_line(bytes)?)?;
    if len == -1 {
        return Ok(RespFrame::Null);
    }
    let len = usize::try_from(len).map_err(|_| QrError::SyntaxError)?;
    if len > MAX_BULK_STRING_SIZE {
        return Err(QrError::SyntaxError);
    }
    if bytes.len() < len + CRLF_LEN {
        // `bytes` is always a suffix of the codec's buffer.
        *short_by = len + CRLF_LEN - bytes.len();
        return Err(QrError::IncompleteData);
    }
    if &bytes[len..len + CRLF_LEN] != CRLF {
        return Err(QrError::SyntaxError);
    }

    let data = Bytes::copy_from_slice(&bytes[..len]);
    *bytes = &bytes[len + CRLF_LEN..];
    Ok(RespFrame::BulkString(data))
}

fn decode_array(
    bytes: &mut &[u8],
    depth: usize,
    short_by: &mut usize,
) -> Result<RespFrame, QrError> {
    let len = parse_number(take_line(bytes)?)?;
    if len == -1 {
        return Ok(RespFrame::NullArray);
    }
    let len = usize::try_from(len).map_err(|_| QrError::SyntaxError)?;
    if len > MAX_FRAME_ELEMENTS {
        return Err(QrError::SyntaxError);
    }

    let mut frames = Vec::with_capacity(len);
    for _ in 0..len {
        frames.push(decode_frame(bytes, depth + 1, short_by)?);
    }
    Ok(RespFrame::Array(frames))
}
