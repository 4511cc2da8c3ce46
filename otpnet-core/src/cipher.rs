// File:    cipher.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Modular one-time pad transform over the 27-symbol alphabet.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! This module contains the cipher transform.
//!
//! Each text symbol is combined with the key symbol at the same position modulo
//! 27. Space is symbol 26 and is shifted like any letter.

use std::fmt;

use crate::alphabet;
use crate::error::{Error, Result, Segment};

/// Which way the transform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `c = (p + k) mod 27`
    Encode,
    /// `p = (c - k + 27) mod 27`
    Decode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => f.write_str("encode"),
            Self::Decode => f.write_str("decode"),
        }
    }
}

/// Encodes or decodes `text` with `key`.
///
/// Only the first `text.len()` symbols of the key are used; the output has
/// the same length as `text`.
///
/// # Errors
///
/// Returns [`Error::KeyTooShort`] if the key is shorter than the text and
/// [`Error::InvalidCharset`] if either input holds a byte outside the alphabet.
pub fn transform(text: &[u8], key: &[u8], direction: Direction) -> Result<Vec<u8>> {
    if key.len() < text.len() {
        return Err(Error::KeyTooShort {
            text_len: text.len() as u64,
            key_len: key.len() as u64,
        });
    }

    text.iter()
        .zip(key.iter())
        .enumerate()
        .map(|(position, (&t, &k))| -> Result<u8> {
            let p = alphabet::index_of(t).ok_or(Error::InvalidCharset {
                segment: Segment::Text,
                position,
                byte: t,
            })?;
            let k = alphabet::index_of(k).ok_or(Error::InvalidCharset {
                segment: Segment::Key,
                position,
                byte: k,
            })?;
            let c = match direction {
                Direction::Encode => (p + k) % alphabet::LEN,
                Direction::Decode => (p + alphabet::LEN - k) % alphabet::LEN,
            };
            Ok(alphabet::symbol_at(c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_vector() {
        // H(7)+X(23)=30%27=3 -> D, space(26)+B(1)=27%27=0 -> A, A(0)+B(1) -> B
        let out = transform(b"H A", b"XBB ", Direction::Encode).unwrap();
        assert_eq!(out, b"DAB");
        let out = transform(b" A", b"B ", Direction::Encode).unwrap();
        assert_eq!(out, b"A ");
    }

    #[test]
    fn space_is_not_passed_through() {
        let out = transform(b" ", b"C", Direction::Encode).unwrap();
        assert_eq!(out, b"B");
    }

    #[test]
    fn decode_inverts_encode() {
        let text = b"THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG";
        let key = b"ZYXWVUTSRQPONMLKJIHGFEDCBA ZYXWVUTSRQPONMLKJIHGFEDCBA ";
        let cipher = transform(text, key, Direction::Encode).unwrap();
        assert_eq!(cipher.len(), text.len());
        assert_ne!(&cipher[..], &text[..]);
        let plain = transform(&cipher, key, Direction::Decode).unwrap();
        assert_eq!(&plain[..], &text[..]);
    }

    #[test]
    fn every_symbol_pair_round_trips() {
        for &t in alphabet::SYMBOLS {
            for &k in alphabet::SYMBOLS {
                let c = transform(&[t], &[k], Direction::Encode).unwrap();
                let p = transform(&c, &[k], Direction::Decode).unwrap();
                assert_eq!(p, [t]);
            }
        }
    }

    #[test]
    fn short_key_is_rejected() {
        let err = transform(b"ABC", b"AB", Direction::Encode).unwrap_err();
        assert!(matches!(
            err,
            Error::KeyTooShort {
                text_len: 3,
                key_len: 2
            }
        ));
    }

    #[test]
    fn bad_key_symbol_is_rejected() {
        let err = transform(b"ABC", b"AbC", Direction::Decode).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidCharset {
                segment: Segment::Key,
                position: 1,
                byte: b'b'
            }
        ));
    }

    #[test]
    fn empty_text_gives_empty_output() {
        assert!(transform(b"", b"", Direction::Encode).unwrap().is_empty());
    }
}
