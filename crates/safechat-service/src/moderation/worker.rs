//! Background consumer of the moderation queue

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::job::ModerationJob;
use super::pipeline::ModerationPipeline;

/// Drains the queue, running each job on its own task so a slow image
/// scan never holds up keyword scans. At most `max_concurrent` jobs run at
/// once; while all slots are busy the worker stops receiving and the
/// bounded queue absorbs the backlog.
pub struct ModerationWorker {
    rx: mpsc::Receiver<ModerationJob>,
    pipeline: Arc<ModerationPipeline>,
    slots: Arc<Semaphore>,
    max_concurrent: usize,
}

impl ModerationWorker {
    pub fn new(
        rx: mpsc::Receiver<ModerationJob>,
        pipeline: Arc<ModerationPipeline>,
        max_concurrent: usize,
    ) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            rx,
            pipeline,
            slots: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every queue handle has been dropped
    pub async fn run(mut self) {
        info!(max_concurrent = self.max_concurrent, "Moderation worker started");

        loop {
            // Take a slot before taking a job, so a saturated worker leaves
            // jobs in the queue
            let Ok(permit) = Arc::clone(&self.slots).acquire_owned().await else {
                break;
            };
            let Some(job) = self.rx.recv().await else {
                break;
            };

            debug!(
                message_id = %job.message_id,
                free_slots = self.slots.available_permits(),
                "Moderation job started"
            );
            let pipeline = Arc::clone(&self.pipeline);
            tokio::spawn(async move {
                pipeline.process(job).await;
                drop(permit);
            });
        }

        info!("Moderation worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::{ModerationDispatch, ModerationQueue};
    use crate::testing::{FakeScanner, Harness, SlowScanner};
    use safechat_core::Snowflake;
    use std::time::Duration;

    #[tokio::test]
    async fn test_worker_flags_queued_message() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let message = h.message(&chat, child, "nobody likes you").await;

        let (queue, rx) = ModerationQueue::bounded(8);
        let worker = ModerationWorker::new(rx, Arc::new(h.pipeline(FakeScanner::clean())), 4).spawn();

        queue.enqueue(ModerationJob::text(message.id, child, chat.id, "nobody likes you"));

        let mut flagged = false;
        for _ in 0..50 {
            if h.store.flag_count() == 1 {
                flagged = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(flagged, "worker never flagged the message");

        drop(queue);
        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_running_scans_never_exceed_cap() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let scanner = SlowScanner::new(Duration::from_millis(50));

        let (queue, rx) = ModerationQueue::bounded(4);
        let worker = ModerationWorker::new(rx, Arc::new(h.pipeline(scanner.clone())), 2).spawn();

        // The worker has not run yet, so the queue takes four and drops the rest
        for n in 0..10 {
            queue.enqueue(ModerationJob::image(
                Snowflake::new(5_000 + n),
                child,
                chat.id,
                format!("https://cdn.example/{n}.jpg"),
            ));
        }

        let mut finished = false;
        for _ in 0..100 {
            if scanner.completed() == 4 {
                finished = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(finished, "queued scans never finished");
        assert_eq!(scanner.peak(), 2);
        assert_eq!(scanner.completed(), 4);

        drop(queue);
        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .unwrap()
            .unwrap();
    }
}
