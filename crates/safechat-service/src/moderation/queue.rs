//! Hand-off between the send path and the moderation worker

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use super::job::ModerationJob;

/// Accepts moderation jobs without blocking the caller.
///
/// `enqueue` is synchronous: the send path never awaits moderation and
/// never sees its failures.
pub trait ModerationDispatch: Send + Sync {
    fn enqueue(&self, job: ModerationJob);
}

/// Bounded in-process queue feeding a [`super::ModerationWorker`]
#[derive(Debug, Clone)]
pub struct ModerationQueue {
    tx: mpsc::Sender<ModerationJob>,
}

impl ModerationQueue {
    /// Create the queue and the receiver its worker drains
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ModerationJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ModerationDispatch for ModerationQueue {
    fn enqueue(&self, job: ModerationJob) {
        let message_id = job.message_id;
        let branch = job.branch();

        match self.tx.try_send(job) {
            Ok(()) => debug!(message_id = %message_id, branch, "Moderation job queued"),
            Err(TrySendError::Full(_)) => {
                warn!(message_id = %message_id, branch, "Moderation queue full, job dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(message_id = %message_id, branch, "Moderation worker stopped, job dropped");
            }
        }
    }
}
