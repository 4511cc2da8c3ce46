// File:    input.rs
// Author:  apezoo
// Date:    2025-08-03
//
// Description: Reads the text or key line that a client sends.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Reads the first line of the file at `path`.
///
/// The trailing `\n` (and a `\r` before it) is not part of the result. A file
/// without a newline is returned whole.
///
/// # Errors
///
/// Returns [`crate::Error::Transport`] if the file cannot be read.
pub fn read_line(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = fs::read(path)?;
    if let Some(end) = bytes.iter().position(|&b| b == b'\n') {
        bytes.truncate(end);
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    Ok(bytes)
}
