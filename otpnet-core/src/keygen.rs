// File:    keygen.rs
// Author:  apezoo
// Date:    2025-08-03
//
// Description: Generates random keys over the 27-symbol alphabet.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use rand::{TryRngCore, rngs::OsRng};

use crate::alphabet;
use crate::error::{Error, Result};

// Largest multiple of 27 that fits in a byte. Bytes at or above it are
// discarded so every symbol is equally likely.
const ACCEPT_BELOW: u8 = alphabet::LEN * 9;

/// Generates a key of `length` symbols drawn uniformly from the alphabet.
///
/// # Arguments
///
/// * `length` - The number of symbols in the key.
///
/// # Errors
///
/// Returns [`Error::EmptyKey`] if `length` is zero and [`Error::Transport`] if
/// the operating system's random source fails.
pub fn generate_key(length: usize) -> Result<String> {
    if length == 0 {
        return Err(Error::EmptyKey);
    }

    let mut rng = OsRng;
    let mut key = String::with_capacity(length);
    let mut buffer = vec![0u8; length];
    while key.len() < length {
        // Use the failable `try_fill_bytes` and map the error to an `io::Error`.
        rng.try_fill_bytes(&mut buffer)
            .map_err(std::io::Error::other)?;
        for &byte in buffer.iter().filter(|&&b| b < ACCEPT_BELOW) {
            if key.len() == length {
                break;
            }
            key.push(char::from(alphabet::symbol_at(byte % alphabet::LEN)));
        }
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_requested_length_and_alphabet() {
        for length in [1, 2, 27, 1000] {
            let key = generate_key(length).unwrap();
            assert_eq!(key.len(), length);
            assert!(alphabet::validate(key.as_bytes(), crate::error::Segment::Key).is_ok());
        }
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(matches!(generate_key(0), Err(Error::EmptyKey)));
    }

    #[test]
    fn large_key_uses_the_whole_alphabet() {
        let key = generate_key(10_000).unwrap();
        for &symbol in alphabet::SYMBOLS {
            assert!(key.as_bytes().contains(&symbol), "missing {}", symbol as char);
        }
    }
}
