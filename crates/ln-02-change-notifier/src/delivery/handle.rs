//! Per-session delivery handle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ledger_telemetry::{NOTIFICATIONS_DROPPED, NOTIFICATIONS_SCHEDULED};
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace, warn};

use crate::domain::{Callback, Stream};

/// Shared flag a worker checks before invoking a session's callback.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Irreversible.
    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of work for a delivery worker.
pub(super) struct Job {
    pub(super) session_id: u64,
    pub(super) stream: Stream,
    pub(super) callback: Callback,
    pub(super) payload: Value,
    pub(super) liveness: Liveness,
}

/// A session's cancellable connection to one delivery worker.
///
/// All streams of a session share one worker queue, so batches for any one
/// destination are delivered in submission order.
pub struct DeliveryHandle {
    session_id: u64,
    sender: mpsc::Sender<Job>,
    liveness: Liveness,
}

impl DeliveryHandle {
    pub(super) fn new(session_id: u64, sender: mpsc::Sender<Job>) -> Self {
        Self {
            session_id,
            sender,
            liveness: Liveness::new(),
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Queue one callback invocation. Never blocks.
    ///
    /// Returns false when the batch was dropped: the handle is closed, the
    /// worker queue is full or the pool has stopped.
    pub fn schedule(&self, stream: Stream, callback: &Callback, payload: Value) -> bool {
        if !self.liveness.is_alive() {
            trace!(session_id = self.session_id, %stream, "Handle closed, not scheduling");
            return false;
        }

        let job = Job {
            session_id: self.session_id,
            stream,
            callback: Arc::clone(callback),
            payload,
            liveness: self.liveness.clone(),
        };

        match self.sender.try_send(job) {
            Ok(()) => {
                NOTIFICATIONS_SCHEDULED
                    .with_label_values(&[stream.as_str()])
                    .inc();
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(
                    session_id = self.session_id,
                    %stream,
                    "Delivery queue full, dropping notification batch"
                );
                NOTIFICATIONS_DROPPED
                    .with_label_values(&[stream.as_str(), "queue_full"])
                    .inc();
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(
                    session_id = self.session_id,
                    %stream,
                    "Delivery pool stopped, dropping notification batch"
                );
                NOTIFICATIONS_DROPPED
                    .with_label_values(&[stream.as_str(), "pool_stopped"])
                    .inc();
                false
            }
        }
    }

    /// Stop scheduling and turn queued jobs into no-ops.
    pub fn close(&self) {
        self.liveness.kill();
    }

    pub fn is_open(&self) -> bool {
        self.liveness.is_alive()
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }
}

impl Drop for DeliveryHandle {
    fn drop(&mut self) {
        self.liveness.kill();
    }
}
