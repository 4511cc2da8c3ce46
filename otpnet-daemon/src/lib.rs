// File:    lib.rs
// Author:  apezoo
// Date:    2025-08-05
//
// Description: Library half of the otpnet daemon: configuration, registry, worker and dispatcher.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # otpnet Daemon
//!
//! A TCP daemon serving one direction of the otpnet exchange. Each accepted
//! connection gets its own worker task; at most `max_workers` run at once.

/// Daemon configuration and roles.
pub mod config;
/// The accept loop.
pub mod dispatcher;
/// Live worker tracking and completion notices.
pub mod registry;
/// The per-connection exchange.
pub mod worker;

pub use config::{DaemonConfig, Role};
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use registry::{MAX_CONCURRENT, WorkerRegistry};
