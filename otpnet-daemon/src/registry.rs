// File:    registry.rs
// Author:  apezoo
// Date:    2025-08-05
//
// Description: Tracks live workers and carries their completion notices back to the dispatcher.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The worker registry and the completion channel that reaps it.
//!
//! The registry is a plain bounded list owned by the dispatcher task. Workers
//! never touch it: each one holds a [`CompletionGuard`] that posts a
//! [`Completion`] on drop, whether the worker returned, failed, panicked or was
//! aborted. The dispatcher is the only consumer of those notices and the only
//! code that mutates the registry.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Default number of workers allowed to run at once.
pub const MAX_CONCURRENT: usize = 5;

/// Identifier of one worker.
pub type WorkerId = Uuid;

/// Returned by [`WorkerRegistry::register`] when no slot is free.
#[derive(Debug, Error)]
#[error("worker registry is full ({capacity} live workers)")]
pub struct RegistryFull {
    /// Capacity of the registry that refused the worker.
    pub capacity: usize,
}

/// Bounded, ordered list of live worker identifiers.
#[derive(Debug)]
pub struct WorkerRegistry {
    capacity: usize,
    live: Vec<WorkerId>,
}

impl WorkerRegistry {
    /// Creates an empty registry. A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            live: Vec::with_capacity(capacity),
        }
    }

    /// Records a newly spawned worker.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryFull`] if the registry already holds `capacity`
    /// workers; nothing is recorded in that case.
    pub fn register(&mut self, id: WorkerId) -> Result<(), RegistryFull> {
        if self.is_full() {
            return Err(RegistryFull {
                capacity: self.capacity,
            });
        }
        self.live.push(id);
        Ok(())
    }

    /// Removes a finished worker. Returns `false` if it was not present.
    pub fn complete(&mut self, id: WorkerId) -> bool {
        match self.live.iter().position(|&live| live == id) {
            Some(index) => {
                self.live.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of live workers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.live.len()
    }

    /// Maximum number of live workers.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether every slot is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.live.len() >= self.capacity
    }

    /// Whether no worker is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether `id` is live.
    #[must_use]
    pub fn contains(&self, id: WorkerId) -> bool {
        self.live.contains(&id)
    }

    /// Live workers in spawn order.
    #[must_use]
    pub fn live(&self) -> &[WorkerId] {
        &self.live
    }
}

/// How a worker's exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The response was written; `len` symbols were sent.
    Served {
        /// Number of symbols written back.
        len: usize,
    },
    /// The exchange ended with an error.
    Failed(String),
    /// The worker was dropped without reporting, e.g. it panicked.
    Aborted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Served { len } => write!(f, "served {len} symbols"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Aborted => f.write_str("aborted"),
        }
    }
}

/// Notice that a worker has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The finished worker.
    pub id: WorkerId,
    /// How it finished.
    pub outcome: Outcome,
}

/// Posts a [`Completion`] for its worker when dropped.
#[derive(Debug)]
pub struct CompletionGuard {
    id: WorkerId,
    outcome: Option<Outcome>,
    tx: UnboundedSender<Completion>,
}

impl CompletionGuard {
    /// Creates a guard reporting on `tx`.
    #[must_use]
    pub fn new(id: WorkerId, tx: UnboundedSender<Completion>) -> Self {
        Self {
            id,
            outcome: None,
            tx,
        }
    }

    /// Reports `outcome` and releases the slot.
    pub fn finish(mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or(Outcome::Aborted);
        // The dispatcher may already be gone during shutdown.
        let _ = self.tx.send(Completion {
            id: self.id,
            outcome,
        });
    }
}
