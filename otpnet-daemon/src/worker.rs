// File:    worker.rs
// Author:  apezoo
// Date:    2025-08-06
//
// Description: Handles the single request/response exchange of one connection.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The per-connection worker.
//!
//! The request is read completely before any response byte is written. Every
//! read uses the lengths from the header; nothing scans for a terminator.

use log::{debug, warn};
use otpnet_core::frame::{HEADER_LEN, Header, Request};
use otpnet_core::{Error, Result, cipher};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Role;

/// Serves one exchange on `stream` and returns the number of symbols written.
///
/// # Errors
///
/// Returns [`Error::Transport`] on any I/O failure or premature close,
/// [`Error::MalformedHeader`] for an unparseable header,
/// [`Error::OriginMismatch`] after sending the role's diagnostic to a client
/// of the other direction, [`Error::KeyTooShort`] or
/// [`Error::PayloadTooLarge`] when the declared lengths are unacceptable, and
/// [`Error::InvalidCharset`] when the payload holds a byte outside the
/// alphabet.
pub async fn serve<S>(stream: &mut S, role: Role, max_payload: u64) -> Result<usize>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut header_buf = [0u8; HEADER_LEN];
    stream.read_exact(&mut header_buf).await?;
    let header = Header::parse(&header_buf)?;
    debug!(
        "Header from {}: text {} bytes, key {} bytes",
        header.origin(),
        header.text_len(),
        header.key_len()
    );

    let expected = role.accepted_origin();
    if header.origin() != expected {
        warn!("Refusing {} on {expected} daemon", header.origin());
        stream.write_all(role.mismatch_diagnostic()).await?;
        stream.shutdown().await?;
        discard(stream, header.payload_len().min(max_payload)).await;
        return Err(Error::OriginMismatch {
            expected,
            actual: header.origin(),
        });
    }

    if header.key_len() < header.text_len() {
        return Err(Error::KeyTooShort {
            text_len: header.text_len(),
            key_len: header.key_len(),
        });
    }
    let declared = header.payload_len();
    let too_large = Error::PayloadTooLarge {
        declared,
        limit: max_payload,
    };
    if declared > max_payload {
        return Err(too_large);
    }
    let payload_len = usize::try_from(declared).map_err(|_| too_large)?;

    let mut payload = vec![0u8; payload_len];
    stream.read_exact(&mut payload).await?;
    let request = Request::split(&header, payload)?;

    let output = cipher::transform(&request.text, &request.key, role.direction())?;
    stream.write_all(&output).await?;
    stream.shutdown().await?;
    Ok(output.len())
}

// Reads and drops what the peer already sent, so closing does not reset the
// connection before the diagnostic is delivered.
async fn discard<S>(stream: &mut S, limit: u64)
where
    S: AsyncRead + Unpin,
{
    let _ = tokio::io::copy(&mut stream.take(limit), &mut tokio::io::sink()).await;
}
