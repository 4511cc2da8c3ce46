// File:    frame.rs
// Author:  apezoo
// Date:    2025-08-03
//
// Description: Builds and parses the length-prefixed wire message exchanged with the daemon.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Wire message framing.
//!
//! # Message Format
//!
//! ```text
//! +---------------------+
//! | origin (1)          |  b'!' encode client, b' ' decode client
//! +---------------------+
//! | text_len (10)       |  decimal ASCII, zero-padded on the left
//! +---------------------+
//! | key_len (10)        |  decimal ASCII, zero-padded on the left
//! +---------------------+
//! | text (text_len)     |  alphabet symbols
//! +---------------------+
//! | key (key_len)       |  alphabet symbols
//! +---------------------+
//! ```
//!
//! There is no delimiter anywhere in the message. The payload boundary is
//! given by the two length fields alone. The response is `text_len` bytes with
//! no header.

use std::fmt;

use crate::alphabet;
use crate::cipher::Direction;
use crate::error::{Error, Result, Segment};

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 21;

/// Width of each decimal length field.
pub const LENGTH_FIELD_WIDTH: usize = 10;

/// Largest value a length field can carry.
pub const MAX_LENGTH: u64 = 9_999_999_999;

const ENCODE_TAG: u8 = b'!';
const DECODE_TAG: u8 = b' ';

/// Tag identifying which kind of client produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Sent by an encoding client.
    Encode,
    /// Sent by a decoding client.
    Decode,
    /// Any other tag byte. Headers never carry `Unknown` with a known tag;
    /// [`Header::new`] folds it into [`Origin::Encode`] or [`Origin::Decode`].
    Unknown(u8),
}

impl Origin {
    /// The origin used by a client running in `direction`.
    #[must_use]
    pub const fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Encode => Self::Encode,
            Direction::Decode => Self::Decode,
        }
    }

    /// The tag byte written on the wire.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Encode => ENCODE_TAG,
            Self::Decode => DECODE_TAG,
            Self::Unknown(b) => b,
        }
    }
}

impl From<u8> for Origin {
    fn from(byte: u8) -> Self {
        match byte {
            ENCODE_TAG => Self::Encode,
            DECODE_TAG => Self::Decode,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => f.write_str("encode client"),
            Self::Decode => f.write_str("decode client"),
            Self::Unknown(b) => write!(f, "unknown origin {b:#04x}"),
        }
    }
}

/// The parsed 21-byte header.
///
/// Both lengths are always within [`MAX_LENGTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    origin: Origin,
    text_len: u64,
    key_len: u64,
}

impl Header {
    /// Creates a header, checking both lengths fit their fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthOutOfRange`] if a length exceeds [`MAX_LENGTH`].
    pub fn new(origin: Origin, text_len: u64, key_len: u64) -> Result<Self> {
        if text_len > MAX_LENGTH {
            return Err(Error::LengthOutOfRange(text_len));
        }
        if key_len > MAX_LENGTH {
            return Err(Error::LengthOutOfRange(key_len));
        }
        Ok(Self {
            origin: Origin::from(origin.as_byte()),
            text_len,
            key_len,
        })
    }

    /// Who sent the message.
    #[must_use]
    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Number of text bytes following the header.
    #[must_use]
    pub const fn text_len(&self) -> u64 {
        self.text_len
    }

    /// Number of key bytes following the text.
    #[must_use]
    pub const fn key_len(&self) -> u64 {
        self.key_len
    }

    /// Total number of payload bytes announced by this header.
    #[must_use]
    pub const fn payload_len(&self) -> u64 {
        self.text_len + self.key_len
    }

    /// Serializes the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.origin.as_byte();
        let text = format!("{:010}", self.text_len);
        let key = format!("{:010}", self.key_len);
        out[1..=LENGTH_FIELD_WIDTH].copy_from_slice(text.as_bytes());
        out[LENGTH_FIELD_WIDTH + 1..].copy_from_slice(key.as_bytes());
        out
    }

    /// Parses the first [`HEADER_LEN`] bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedHeader`] if fewer than 21 bytes are given or a
    /// length field does not hold a non-negative decimal number.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::MalformedHeader(format!(
                "need {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let text_len = parse_length_field(&bytes[1..=LENGTH_FIELD_WIDTH], "text length")?;
        let key_len = parse_length_field(
            &bytes[LENGTH_FIELD_WIDTH + 1..HEADER_LEN],
            "key length",
        )?;
        Ok(Self {
            origin: Origin::from(bytes[0]),
            text_len,
            key_len,
        })
    }
}

/// Reads one fixed-width length field.
///
/// The field is leading spaces, then at least one digit, then padding (`-`,
/// NUL or space) to the end of the field. Only the digits carry meaning.
fn parse_length_field(field: &[u8], name: &str) -> Result<u64> {
    let malformed = || {
        Error::MalformedHeader(format!(
            "{name} field {:?} is not a decimal number",
            String::from_utf8_lossy(field)
        ))
    };

    let start = field.iter().take_while(|&&b| b == b' ').count();
    let digits = field[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(malformed());
    }
    let rest = &field[start + digits..];
    if !rest.iter().all(|&b| matches!(b, b'-' | b'\0' | b' ')) {
        return Err(malformed());
    }

    Ok(field[start..start + digits]
        .iter()
        .fold(0u64, |acc, &d| acc * 10 + u64::from(d - b'0')))
}

/// Builds the header for the given lengths.
///
/// # Errors
///
/// Returns [`Error::LengthOutOfRange`] if a length exceeds [`MAX_LENGTH`].
pub fn build_header(origin: Origin, text_len: u64, key_len: u64) -> Result<[u8; HEADER_LEN]> {
    Header::new(origin, text_len, key_len).map(|h| h.to_bytes())
}

/// Parses a header from the start of `bytes`.
///
/// # Errors
///
/// See [`Header::parse`].
pub fn decode_header(bytes: &[u8]) -> Result<Header> {
    Header::parse(bytes)
}

/// Validates `text` and `key` and frames them into one wire message.
///
/// # Errors
///
/// Returns [`Error::InvalidCharset`] if either input holds a byte outside the
/// alphabet, [`Error::KeyTooShort`] if the key does not cover the text and
/// [`Error::LengthOutOfRange`] if a length does not fit its header field.
pub fn encode_message(origin: Origin, text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    alphabet::validate(text, Segment::Text)?;
    alphabet::validate(key, Segment::Key)?;
    if key.len() < text.len() {
        return Err(Error::KeyTooShort {
            text_len: text.len() as u64,
            key_len: key.len() as u64,
        });
    }
    let header = Header::new(origin, text.len() as u64, key.len() as u64)?;

    let mut message = Vec::with_capacity(HEADER_LEN + text.len() + key.len());
    message.extend_from_slice(&header.to_bytes());
    message.extend_from_slice(text);
    message.extend_from_slice(key);
    Ok(message)
}

/// A request after its payload has been read and split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Who sent the request.
    pub origin: Origin,
    /// The text to transform.
    pub text: Vec<u8>,
    /// The key, at least as long as the text.
    pub key: Vec<u8>,
}

impl Request {
    /// Splits `payload` into text and key using the lengths in `header`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedHeader`] if the payload size does not match the
    /// header.
    pub fn split(header: &Header, mut payload: Vec<u8>) -> Result<Self> {
        if payload.len() as u64 != header.payload_len() {
            return Err(Error::MalformedHeader(format!(
                "header announces {} payload bytes, got {}",
                header.payload_len(),
                payload.len()
            )));
        }
        let key = payload.split_off(usize::try_from(header.text_len).map_err(|_| {
            Error::MalformedHeader(format!("text length {} too large", header.text_len))
        })?);
        Ok(Self {
            origin: header.origin,
            text: payload,
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn header_layout_is_byte_exact() {
        let bytes = build_header(Origin::Encode, 11, 12).unwrap();
        assert_eq!(&bytes, b"!00000000110000000012");
        let bytes = build_header(Origin::Decode, 0, MAX_LENGTH).unwrap();
        assert_eq!(&bytes, b" 00000000009999999999");
    }

    fn any_origin() -> impl Strategy<Value = Origin> {
        prop_oneof![
            Just(Origin::Encode),
            Just(Origin::Decode),
            any::<u8>().prop_map(Origin::Unknown),
        ]
    }

    proptest! {
        #[test]
        fn header_round_trips_across_the_range(
            origin in any_origin(),
            text_len in 0..=MAX_LENGTH,
            key_len in 0..=MAX_LENGTH,
        ) {
            let header = Header::new(origin, text_len, key_len).unwrap();
            let bytes = build_header(origin, text_len, key_len).unwrap();
            prop_assert_eq!(bytes, header.to_bytes());
            prop_assert_eq!(decode_header(&bytes).unwrap(), header);
        }
    }

    #[test]
    fn unknown_origin_with_a_known_tag_is_folded() {
        let header = Header::new(Origin::Unknown(b'!'), 1, 1).unwrap();
        assert_eq!(header.origin(), Origin::Encode);
        assert_eq!(Header::parse(&header.to_bytes()).unwrap(), header);
        let header = Header::new(Origin::Unknown(b' '), 1, 1).unwrap();
        assert_eq!(header.origin(), Origin::Decode);
        let header = Header::new(Origin::Unknown(b'#'), 1, 1).unwrap();
        assert_eq!(header.origin(), Origin::Unknown(b'#'));
    }

    #[test]
    fn oversized_length_is_rejected() {
        assert!(matches!(
            build_header(Origin::Encode, MAX_LENGTH + 1, MAX_LENGTH + 1),
            Err(Error::LengthOutOfRange(_))
        ));
    }

    #[test]
    fn dash_and_nul_padded_fields_parse_by_value() {
        let mut bytes = *b"!11--------12\0\0\0\0\0\0\0\0";
        assert_eq!(bytes.len(), HEADER_LEN);
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.text_len(), 11);
        assert_eq!(header.key_len(), 12);

        bytes[1..11].copy_from_slice(b"        42");
        assert_eq!(Header::parse(&bytes).unwrap().text_len(), 42);
    }

    #[test]
    fn digits_after_padding_are_malformed() {
        assert!(matches!(
            Header::parse(b"!11-----9-00000000012"),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn non_numeric_fields_are_malformed() {
        assert!(matches!(
            Header::parse(b"!ABCDEFGHIJ0000000001"),
            Err(Error::MalformedHeader(_))
        ));
        assert!(matches!(
            Header::parse(b"!0000000001----------"),
            Err(Error::MalformedHeader(_))
        ));
        assert!(matches!(
            Header::parse(b"!-000000001 000000001"),
            Err(Error::MalformedHeader(_))
        ));
        assert!(matches!(
            Header::parse(b"!00000"),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn message_is_header_then_text_then_key() {
        let message = encode_message(Origin::Encode, b"HELLO", b"XMCKLQ").unwrap();
        assert_eq!(&message[..HEADER_LEN], b"!00000000050000000006");
        assert_eq!(&message[HEADER_LEN..], b"HELLOXMCKLQ");
    }

    #[test]
    fn bad_text_is_rejected_before_framing() {
        let err = encode_message(Origin::Encode, b"hello", b"XMCKL").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidCharset {
                segment: Segment::Text,
                position: 0,
                ..
            }
        ));
        let err = encode_message(Origin::Encode, b"HELLO\n", b"XMCKLQQ").unwrap_err();
        assert!(matches!(err, Error::InvalidCharset { position: 5, .. }));
    }

    #[test]
    fn short_key_is_rejected_before_framing() {
        let err = encode_message(Origin::Decode, b"HELLO WORLD", b"ABC").unwrap_err();
        assert!(matches!(
            err,
            Error::KeyTooShort {
                text_len: 11,
                key_len: 3
            }
        ));
    }

    #[test]
    fn payload_splits_on_declared_length() {
        let message = encode_message(Origin::Encode, b"AB", b"CDE").unwrap();
        let header = decode_header(&message).unwrap();
        let request = Request::split(&header, message[HEADER_LEN..].to_vec()).unwrap();
        assert_eq!(request.origin, Origin::Encode);
        assert_eq!(request.text, b"AB");
        assert_eq!(request.key, b"CDE");
    }

    #[test]
    fn split_rejects_wrong_payload_size() {
        let header = Header::new(Origin::Encode, 2, 3).unwrap();
        assert!(Request::split(&header, b"ABCD".to_vec()).is_err());
    }
}
