// File:    lib.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: The main library crate for otpnet-core: alphabet, cipher, framing and client.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # otpnet Core Library
//!
//! This library provides the pieces shared by the otpnet daemon and CLI:
//! the 27-symbol alphabet, the modular one-time pad transform, the wire
//! message framer, key generation, and a client that performs one
//! request/response exchange with a daemon.

/// The fixed 27-symbol alphabet.
pub mod alphabet;
/// Modular encode/decode transform.
pub mod cipher;
/// The TCP client.
pub mod client;
/// Error kinds shared across the workspace.
pub mod error;
/// Wire message framing.
pub mod frame;
/// Reading text and key files.
pub mod input;
/// Random key generation.
pub mod keygen;

pub use cipher::Direction;
pub use error::{Error, Result};
pub use frame::{Header, Origin, Request};
