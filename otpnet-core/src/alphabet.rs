// File:    alphabet.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: The fixed 27-symbol alphabet used for text, keys and cipher output.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The 27-symbol alphabet: `A` through `Z` at positions 0-25, space at 26.

use crate::error::{Error, Result, Segment};

/// Every symbol in position order.
pub const SYMBOLS: &[u8; 27] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// Number of symbols, and the cipher modulus.
pub const LEN: u8 = 27;

/// Returns the position of `symbol`, or `None` if it is not part of the alphabet.
#[must_use]
pub const fn index_of(symbol: u8) -> Option<u8> {
    match symbol {
        b'A'..=b'Z' => Some(symbol - b'A'),
        b' ' => Some(26),
        _ => None,
    }
}

/// Returns the symbol at `index`.
///
/// # Panics
///
/// Panics if `index` is not below [`LEN`].
#[must_use]
pub const fn symbol_at(index: u8) -> u8 {
    SYMBOLS[index as usize]
}

/// Checks that every byte of `bytes` is an alphabet symbol.
///
/// # Errors
///
/// Returns [`Error::InvalidCharset`] naming the first offending byte.
pub fn validate(bytes: &[u8], segment: Segment) -> Result<()> {
    match bytes.iter().position(|&b| index_of(b).is_none()) {
        Some(position) => Err(Error::InvalidCharset {
            segment,
            position,
            byte: bytes[position],
        }),
        None => Ok(()),
    }
}
