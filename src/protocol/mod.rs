//! Subunit v1 result-stream protocol
//!
//! [`ProtocolServer`] parses a captured stream and forwards its events to a
//! sink. [`ProtocolClient`] is a sink that serializes events back onto the
//! wire. Outcomes may carry details, either as a bracketed text block or as
//! multipart content with chunked bodies.

#![allow(dead_code)]

mod chunked;
mod client;
mod server;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

pub use client::ProtocolClient;
pub use server::ProtocolServer;

/// Timestamp layout used by `time:` lines
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.fZ";

/// Errors raised while decoding a stream
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Stream ended unexpectedly")]
    UnexpectedEof,

    #[error("Invalid chunk header: {0:?}")]
    InvalidChunkHeader(String),

    #[error("Invalid content type: {0:?}")]
    InvalidContentType(String),

    #[error("Invalid timestamp {0:?}: {1}")]
    InvalidTime(String, #[source] chrono::ParseError),

    #[error("Invalid progress value: {0:?}")]
    InvalidProgress(String),
}

/// Format a timestamp the way `time:` lines carry it
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S%.6fZ").to_string()
}

/// Parse the argument of a `time:` line
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, ProtocolError> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ProtocolError::InvalidTime(value.to_string(), e))
}

/// Byte cursor over a fully buffered stream
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Next line including its trailing newline, if any remains
    pub fn read_line(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let rest = &self.buf[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    /// Exactly `len` bytes, or `None` if the stream is shorter
    pub fn read_exact(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        if end > self.buf.len() {
            return None;
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Some(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }
}
