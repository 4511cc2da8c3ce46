// File:    error.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Error kinds shared by the framer, the cipher, the client and the daemon.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Error types for otpnet.
//!
//! Validation failures (`InvalidCharset`, `KeyTooShort`, `LengthOutOfRange`)
//! are raised before any byte touches the network. Everything that goes wrong
//! on a live connection ends up as `Transport`, `MalformedHeader`,
//! `OriginMismatch` or `PayloadTooLarge` and only affects that connection.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::frame::Origin;

/// Which part of a request a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// The text being encoded or decoded.
    Text,
    /// The one-time pad key.
    Key,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Key => f.write_str("key"),
        }
    }
}

/// Errors raised anywhere in the exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// A byte outside `A-Z` and space was found.
    #[error("bad character {byte:#04x} in {segment} at position {position}")]
    InvalidCharset {
        /// Segment containing the byte.
        segment: Segment,
        /// Zero-based offset inside the segment.
        position: usize,
        /// The offending byte.
        byte: u8,
    },

    /// The key does not cover the whole text.
    #[error("key is too short: text has {text_len} symbols, key has {key_len}")]
    KeyTooShort {
        /// Declared or actual text length.
        text_len: u64,
        /// Declared or actual key length.
        key_len: u64,
    },

    /// A length does not fit in a 10-digit header field.
    #[error("length {0} does not fit in a 10-digit header field")]
    LengthOutOfRange(u64),

    /// The 21-byte header could not be parsed.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The request came from a client of the other direction.
    #[error("origin mismatch: expected {expected}, got {actual}")]
    OriginMismatch {
        /// Origin accepted by this server.
        expected: Origin,
        /// Origin found in the header.
        actual: Origin,
    },

    /// The declared payload exceeds the server's limit.
    #[error("declared payload of {declared} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// `textLength + keyLength` from the header.
        declared: u64,
        /// Configured maximum.
        limit: u64,
    },

    /// A key of length zero was requested.
    #[error("key length must be at least 1")]
    EmptyKey,

    /// The server answered with a diagnostic instead of text.
    #[error("server rejected the request: {0}")]
    Rejected(String),

    /// The server answered with something that is not a valid response.
    #[error("unexpected response: expected {expected} symbols, received {received} bytes")]
    UnexpectedResponse {
        /// Number of symbols that should have come back.
        expected: usize,
        /// Number of bytes that actually came back.
        received: usize,
    },

    /// The exchange did not finish in time.
    #[error("exchange timed out after {0:?}")]
    Timeout(Duration),

    /// Connect, read, write or close failed.
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
