//! Delivery worker pool
//!
//! Fixed set of tokio tasks, each draining its own bounded queue. Sessions
//! are assigned to a worker round-robin when they open a handle.

use std::sync::atomic::{AtomicU64, Ordering};

use ledger_telemetry::{DELIVERY_FAILURES, NOTIFICATIONS_DELIVERED, NOTIFICATIONS_DROPPED};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use super::handle::{DeliveryHandle, Job};
use crate::domain::DeliveryConfig;
use crate::error::NotifyError;

/// Owner of the delivery workers.
pub struct DeliveryPool {
    shards: Vec<mpsc::Sender<Job>>,
    next_session: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl DeliveryPool {
    /// Spawn `config.workers` workers on the current tokio runtime.
    ///
    /// Fails with [`NotifyError::NoRuntime`] when called outside one.
    pub fn start(config: &DeliveryConfig) -> Result<Self, NotifyError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut shards = Vec::with_capacity(config.workers);
        let mut workers = Vec::with_capacity(config.workers);

        for worker_id in 0..config.workers {
            let (tx, rx) = mpsc::channel(config.queue_capacity);
            shards.push(tx);
            workers.push(runtime.spawn(run_worker(worker_id, rx, shutdown_rx.clone())));
        }

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "Delivery pool started"
        );

        Ok(Self {
            shards,
            next_session: AtomicU64::new(1),
            shutdown_tx,
            workers: Mutex::new(workers),
        })
    }

    /// Allocate a session id and bind it to a worker.
    pub fn open_handle(&self) -> DeliveryHandle {
        let session_id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let shard = (session_id % self.shards.len() as u64) as usize;
        DeliveryHandle::new(session_id, self.shards[shard].clone())
    }

    pub fn worker_count(&self) -> usize {
        self.shards.len()
    }

    /// Stop every worker and wait for it to exit.
    ///
    /// Jobs still queued are discarded.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            let _ = worker.await;
        }
        info!("Delivery pool stopped");
    }
}

async fn run_worker(
    worker_id: usize,
    mut jobs: mpsc::Receiver<Job>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(worker_id, "Delivery worker started");
    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            job = jobs.recv() => match job {
                Some(job) => deliver(job),
                None => break,
            },
        }
    }
    debug!(worker_id, "Delivery worker stopped");
}

fn deliver(job: Job) {
    let stream = job.stream.as_str();

    if !job.liveness.is_alive() {
        trace!(session_id = job.session_id, stream, "Session closed, skipping delivery");
        NOTIFICATIONS_DROPPED
            .with_label_values(&[stream, "session_closed"])
            .inc();
        return;
    }

    match (job.callback)(job.payload) {
        Ok(()) => {
            NOTIFICATIONS_DELIVERED.with_label_values(&[stream]).inc();
        }
        Err(error) => {
            debug!(session_id = job.session_id, stream, %error, "Subscriber callback failed");
            DELIVERY_FAILURES.with_label_values(&[stream]).inc();
        }
    }
}
