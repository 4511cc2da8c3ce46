// File:    client.rs
// Author:  apezoo
// Date:    2025-08-04
//
// Description: Sends one framed request to a daemon and returns its response.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The transport client.
//!
//! Input is validated and framed before a connection is opened, so a bad text
//! or a short key never reaches the network.

use std::time::Duration;

use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::alphabet;
use crate::cipher::Direction;
use crate::error::{Error, Result, Segment};
use crate::frame::{self, Origin};

// Room for a diagnostic when the expected response is shorter than it.
const MIN_READ_LIMIT: usize = 256;

// Every daemon diagnostic starts with this.
const DIAGNOSTIC_PREFIX: &[u8] = b"ERROR";

/// A client for one daemon address.
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    port: u16,
    timeout: Option<Duration>,
}

impl Client {
    /// Creates a client for `host:port` with no timeout.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: None,
        }
    }

    /// Limits the whole exchange, connect included, to `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Encodes `text` with `key` on the daemon.
    ///
    /// # Errors
    ///
    /// See [`Client::exchange`].
    pub async fn encode(&self, text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        self.exchange(Direction::Encode, text, key).await
    }

    /// Decodes `text` with `key` on the daemon.
    ///
    /// # Errors
    ///
    /// See [`Client::exchange`].
    pub async fn decode(&self, text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        self.exchange(Direction::Decode, text, key).await
    }

    /// Validates and frames the request, sends it, and returns the transformed
    /// text.
    ///
    /// # Errors
    ///
    /// Validation errors ([`Error::InvalidCharset`], [`Error::KeyTooShort`],
    /// [`Error::LengthOutOfRange`]) are returned before connecting.
    /// [`Error::Rejected`] is returned when the daemon answers with a
    /// diagnostic, [`Error::UnexpectedResponse`] when the answer is not
    /// `text.len()` alphabet symbols, [`Error::Timeout`] when the configured
    /// timeout elapses and [`Error::Transport`] on any I/O failure.
    pub async fn exchange(&self, direction: Direction, text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        let message = frame::encode_message(Origin::for_direction(direction), text, key)?;
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.send_raw(&message, text.len()))
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => self.send_raw(&message, text.len()).await?,
        };
        check_response(response, text.len())
    }

    /// Sends already framed bytes and reads the reply until the daemon closes
    /// the connection.
    ///
    /// Reading runs alongside writing, so a diagnostic the daemon sends before
    /// giving up on the request is kept even when the rest of the write fails.
    /// At most `expected_len` bytes (or enough for a diagnostic) are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if connecting, writing or reading fails
    /// and no diagnostic was received.
    pub async fn send_raw(&self, message: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        debug!(
            "Connected to {}:{}, sending {} bytes",
            self.host,
            self.port,
            message.len()
        );
        let (reader, mut writer) = stream.into_split();

        let send = async {
            writer.write_all(message).await?;
            writer.shutdown().await
        };
        let limit = expected_len.max(MIN_READ_LIMIT) + 1;
        let mut response = Vec::with_capacity(expected_len.min(message.len()));
        let mut incoming = reader.take(limit as u64);
        let receive = incoming.read_to_end(&mut response);
        let (sent, received) = tokio::join!(send, receive);

        if response.starts_with(DIAGNOSTIC_PREFIX) {
            if let Err(e) = sent.and(received.map(|_| ())) {
                debug!("Connection closed while sending: {e}");
            }
            return Ok(response);
        }
        sent?;
        received?;
        debug!("Received {} bytes", response.len());
        Ok(response)
    }
}

fn check_response(response: Vec<u8>, expected: usize) -> Result<Vec<u8>> {
    let well_formed = response.len() == expected
        && alphabet::validate(&response, Segment::Text).is_ok();
    if well_formed {
        return Ok(response);
    }
    if response.starts_with(DIAGNOSTIC_PREFIX) {
        return Err(Error::Rejected(
            String::from_utf8_lossy(&response).trim_end().to_string(),
        ));
    }
    Err(Error::UnexpectedResponse {
        expected,
        received: response.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_symbols_are_accepted() {
        assert_eq!(check_response(b"ABC".to_vec(), 3).unwrap(), b"ABC");
        assert!(check_response(Vec::new(), 0).unwrap().is_empty());
    }

    #[test]
    fn diagnostics_become_rejections() {
        let err = check_response(b"ERROR: connection not from an encode client.".to_vec(), 5)
            .unwrap_err();
        assert!(matches!(err, Error::Rejected(msg) if msg.contains("encode client")));
    }

    #[test]
    fn truncated_responses_are_unexpected() {
        let err = check_response(b"AB".to_vec(), 3).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedResponse {
                expected: 3,
                received: 2
            }
        ));
    }

    #[tokio::test]
    async fn invalid_input_never_connects() {
        // Port 9 is never dialled: validation fails first.
        let client = Client::new("127.0.0.1", 9);
        let err = client.encode(b"hello", b"ABCDE").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCharset { .. }));
        let err = client.encode(b"HELLO", b"ABC").await.unwrap_err();
        assert!(matches!(err, Error::KeyTooShort { .. }));
    }
}
