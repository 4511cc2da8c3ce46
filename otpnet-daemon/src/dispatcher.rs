// File:    dispatcher.rs
// Author:  apezoo
// Date:    2025-08-06
//
// Description: Accept loop that hands each connection to a worker task and bounds how many run at once.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The connection dispatcher.
//!
//! While fewer than `max_workers` workers are live the dispatcher accepts a
//! connection, spawns a worker task for it and goes straight back to
//! accepting. Once every slot is taken it stops calling `accept` and waits for
//! a completion notice; further connections wait in the kernel backlog.

use std::future::Future;
use std::net::SocketAddr;

use log::{debug, error, info, warn};
use otpnet_core::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::config::DaemonConfig;
use crate::registry::{Completion, CompletionGuard, Outcome, WorkerRegistry};
use crate::worker;

/// Owns the listening socket, the registry and the completion channel.
#[derive(Debug)]
pub struct Dispatcher {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: DaemonConfig,
    registry: WorkerRegistry,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    active_tx: watch::Sender<usize>,
}

/// A cheap view of a running dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    local_addr: SocketAddr,
    active: watch::Receiver<usize>,
}

impl DispatcherHandle {
    /// Address the dispatcher is listening on.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of live workers as last published by the dispatcher.
    #[must_use]
    pub fn active_workers(&self) -> usize {
        *self.active.borrow()
    }

    /// Waits until exactly `count` workers are live.
    ///
    /// Returns `false` if the dispatcher stopped first.
    pub async fn wait_for_active(&mut self, count: usize) -> bool {
        self.active.wait_for(|&active| active == count).await.is_ok()
    }
}

impl Dispatcher {
    /// Binds the listening socket described by `config`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the address cannot be bound.
    pub async fn bind(config: DaemonConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let local_addr = listener.local_addr()?;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (active_tx, _) = watch::channel(0);
        Ok(Self {
            listener,
            local_addr,
            registry: WorkerRegistry::new(config.max_workers),
            config,
            completions_tx,
            completions_rx,
            active_tx,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns a handle for observing the dispatcher once it runs.
    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            local_addr: self.local_addr,
            active: self.active_tx.subscribe(),
        }
    }

    /// Runs the accept loop forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Runs the accept loop until `shutdown` resolves, then waits for live
    /// workers to finish.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            "Listening on {} as {:?} daemon (max {} workers)",
            self.local_addr,
            self.config.role,
            self.registry.capacity()
        );

        loop {
            if self.registry.is_full() {
                debug!(
                    "All {} workers busy, waiting for one to finish",
                    self.registry.capacity()
                );
                tokio::select! {
                    biased;
                    () = &mut shutdown => break,
                    Some(done) = self.completions_rx.recv() => self.reap(done),
                }
                continue;
            }

            tokio::select! {
                biased;
                () = &mut shutdown => break,
                Some(done) = self.completions_rx.recv() => self.reap(done),
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.dispatch(stream, peer),
                    Err(e) => error!("Failed to accept connection: {e}"),
                },
            }
        }

        info!("Shutting down, waiting for {} workers", self.registry.count());
        while !self.registry.is_empty() {
            match self.completions_rx.recv().await {
                Some(done) => self.reap(done),
                None => break,
            }
        }
        info!("All workers finished");
    }

    fn dispatch(&mut self, mut stream: TcpStream, peer: SocketAddr) {
        let id = Uuid::new_v4();
        if let Err(e) = self.registry.register(id) {
            // The loop only accepts with a free slot.
            error!("Dropping connection from {peer}: {e}");
            return;
        }
        self.publish();
        info!(
            "Worker {id} dispatched for {peer} ({}/{} active)",
            self.registry.count(),
            self.registry.capacity()
        );

        let guard = CompletionGuard::new(id, self.completions_tx.clone());
        let role = self.config.role;
        let max_payload = self.config.max_payload;
        let timeout = self.config.io_timeout();
        tokio::spawn(async move {
            let served = match timeout {
                Some(limit) => {
                    tokio::time::timeout(limit, worker::serve(&mut stream, role, max_payload))
                        .await
                        .unwrap_or_else(|_| Err(Error::Timeout(limit)))
                }
                None => worker::serve(&mut stream, role, max_payload).await,
            };
            let outcome = match served {
                Ok(len) => Outcome::Served { len },
                Err(e) => {
                    match &e {
                        Error::OriginMismatch { .. } => warn!("Worker {id} ({peer}): {e}"),
                        _ => error!("Worker {id} ({peer}): {e}"),
                    }
                    Outcome::Failed(e.to_string())
                }
            };
            guard.finish(outcome);
        });
    }

    fn reap(&mut self, done: Completion) {
        if self.registry.complete(done.id) {
            info!(
                "Worker {} {} ({}/{} active)",
                done.id,
                done.outcome,
                self.registry.count(),
                self.registry.capacity()
            );
            self.publish();
        } else {
            debug!("Worker {} was already reclaimed", done.id);
        }
    }

    fn publish(&self) {
        self.active_tx.send_replace(self.registry.count());
    }
}
