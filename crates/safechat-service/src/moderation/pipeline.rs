//! Scanning of child-authored messages
//!
//! Each job moves `SENT -> SCANNING -> CLEAN | FLAGGED`. A positive result
//! appends a flag attributed to the system flagger. Keyword hits also send
//! the child a counseling notice from the counselor account; a failed
//! notice never removes the flag.

use std::sync::Arc;

use safechat_core::entities::{Chat, Flag, Message};
use safechat_core::{DomainError, Snowflake};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::services::ServiceContext;

use super::job::{JobKind, ModerationJob};
use super::scanner::{ImageScanRequest, ImageScanner, ScanError};

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("store error: {0}")]
    Store(#[from] DomainError),
}

/// Terminal state of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Clean,
    Flagged { flag_id: Snowflake, reason: String },
}

impl ScanOutcome {
    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::Flagged { .. })
    }
}

pub struct ModerationPipeline {
    ctx: ServiceContext,
    scanner: Arc<dyn ImageScanner>,
}

impl ModerationPipeline {
    pub fn new(ctx: ServiceContext, scanner: Arc<dyn ImageScanner>) -> Self {
        Self { ctx, scanner }
    }

    /// Run a job and swallow any failure
    pub async fn process(&self, job: ModerationJob) {
        match self.scan(&job).await {
            Ok(ScanOutcome::Clean) => {
                debug!(message_id = %job.message_id, branch = job.branch(), "Message clean");
            }
            Ok(ScanOutcome::Flagged { flag_id, reason }) => {
                info!(
                    message_id = %job.message_id,
                    flag_id = %flag_id,
                    reason = %reason,
                    "Message flagged"
                );
            }
            Err(ModerationError::Scan(ScanError::Disabled)) => {
                debug!(message_id = %job.message_id, "Image scan skipped, scanner disabled");
            }
            Err(e) => {
                warn!(
                    message_id = %job.message_id,
                    branch = job.branch(),
                    error = %e,
                    "Moderation scan failed"
                );
            }
        }
    }

    /// Run a job and report how it ended
    #[instrument(skip(self, job), fields(message_id = %job.message_id, branch = job.branch()))]
    pub async fn scan(&self, job: &ModerationJob) -> Result<ScanOutcome, ModerationError> {
        match &job.kind {
            JobKind::Text { content } => self.scan_text(job, content).await,
            JobKind::Image { image_ref } => self.scan_image(job, image_ref).await,
        }
    }

    async fn scan_text(
        &self,
        job: &ModerationJob,
        content: &str,
    ) -> Result<ScanOutcome, ModerationError> {
        let classification = self.ctx.classifier().classify(content);
        let (Some(category), Some(term)) = (
            classification.category.as_deref(),
            classification.matched_term.as_deref(),
        ) else {
            return Ok(ScanOutcome::Clean);
        };

        let reason = Flag::keyword_reason(category, term);
        let outcome = self.record_flag(job.message_id, reason).await?;

        if let Err(e) = self.notify_counselor(job.sender_id).await {
            warn!(child_id = %job.sender_id, error = %e, "Counselor notice failed");
        }

        Ok(outcome)
    }

    async fn scan_image(
        &self,
        job: &ModerationJob,
        image_ref: &str,
    ) -> Result<ScanOutcome, ModerationError> {
        let request = ImageScanRequest {
            message_id: job.message_id,
            image_url: image_ref.to_string(),
            sender_id: job.sender_id,
            chat_id: job.chat_id,
        };

        let verdict = self.scanner.scan(&request).await?;
        if !verdict.flagged {
            return Ok(ScanOutcome::Clean);
        }

        let reason = Flag::image_reason(verdict.reason.as_deref());
        self.record_flag(job.message_id, reason).await
    }

    async fn record_flag(
        &self,
        message_id: Snowflake,
        reason: String,
    ) -> Result<ScanOutcome, ModerationError> {
        let flag = Flag::new(
            self.ctx.generate_id(),
            message_id,
            self.ctx.system_accounts().system_flagger_id,
            Some(reason.clone()),
        );
        self.ctx.flag_repo().create(&flag).await?;

        Ok(ScanOutcome::Flagged {
            flag_id: flag.id,
            reason,
        })
    }

    /// Post the counseling message into the counselor's chat with the child
    async fn notify_counselor(&self, child_id: Snowflake) -> Result<(), DomainError> {
        let counselor_id = self.ctx.system_accounts().counselor_id;
        let chat = self.counselor_chat(counselor_id, child_id).await?;

        let notice = Message::new(
            self.ctx.generate_id(),
            chat.id,
            counselor_id,
            Some(self.ctx.counselor_message().to_string()),
            None,
        )?;
        self.ctx.message_repo().create(&notice).await?;

        debug!(chat_id = %chat.id, child_id = %child_id, "Counselor notice sent");
        Ok(())
    }

    async fn counselor_chat(
        &self,
        counselor_id: Snowflake,
        child_id: Snowflake,
    ) -> Result<Chat, DomainError> {
        if let Some(chat) = self.ctx.chat_repo().find_between(counselor_id, child_id).await? {
            return Ok(chat);
        }

        let chat = Chat::new(self.ctx.generate_id(), counselor_id, child_id);
        match self.ctx.chat_repo().create(&chat).await {
            Ok(()) => Ok(chat),
            // Lost a race with another notice
            Err(DomainError::ChatExists) => self
                .ctx
                .chat_repo()
                .find_between(counselor_id, child_id)
                .await?
                .ok_or(DomainError::ChatNotFound(chat.id)),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for ModerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationPipeline").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeScanner, Harness};
    use safechat_core::traits::{ChatRepository, FlagRepository, MessageQuery, MessageRepository};
    use safechat_db::StoreFault;

    #[tokio::test]
    async fn test_keyword_hit_flags_and_counsels() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let message = h.message(&chat, child, "you are such a loser").await;

        let pipeline = h.pipeline(FakeScanner::clean());
        let outcome = pipeline
            .scan(&ModerationJob::text(message.id, child, chat.id, "you are such a loser"))
            .await
            .unwrap();

        let ScanOutcome::Flagged { reason, .. } = outcome else {
            panic!("expected a flag");
        };
        assert_eq!(reason, "keyword:bullying:loser");

        let flags = h.store.find_by_message_ids(&[message.id]).await.unwrap();
        assert_eq!(flags[&message.id][0].flagged_by, h.accounts.system_flagger_id);

        let counselor_chat = h
            .store
            .find_between(h.accounts.counselor_id, child)
            .await
            .unwrap()
            .expect("counselor chat created");
        let notices = h
            .store
            .find_by_chat(counselor_chat.id, MessageQuery { before: None, after: None, limit: 10 })
            .await
            .unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].sender_id, h.accounts.counselor_id);
    }

    #[tokio::test]
    async fn test_second_hit_reuses_counselor_chat() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let pipeline = h.pipeline(FakeScanner::clean());

        for text in ["loser", "nobody likes you"] {
            let message = h.message(&chat, child, text).await;
            pipeline
                .scan(&ModerationJob::text(message.id, child, chat.id, text))
                .await
                .unwrap();
        }

        let chats = h.store.find_by_user(child).await.unwrap();
        assert_eq!(chats.len(), 2);
    }

    #[tokio::test]
    async fn test_clean_text_writes_nothing() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let message = h.message(&chat, child, "see you at practice").await;

        let outcome = h
            .pipeline(FakeScanner::clean())
            .scan(&ModerationJob::text(message.id, child, chat.id, "see you at practice"))
            .await
            .unwrap();

        assert_eq!(outcome, ScanOutcome::Clean);
        assert_eq!(h.store.flag_count(), 0);
        assert_eq!(h.store.find_by_user(child).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_counselor_failure_keeps_flag() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let message = h.message(&chat, child, "loser").await;

        h.store.inject_fault(StoreFault::Chats);
        let outcome = h
            .pipeline(FakeScanner::clean())
            .scan(&ModerationJob::text(message.id, child, chat.id, "loser"))
            .await
            .unwrap();

        assert!(outcome.is_flagged());
        assert_eq!(h.store.flag_count(), 1);
    }

    #[tokio::test]
    async fn test_image_hit_uses_scanner_reason() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let message = h.message(&chat, child, "pic").await;

        let outcome = h
            .pipeline(FakeScanner::flagging(Some("nudity")))
            .scan(&ModerationJob::image(message.id, child, chat.id, "s3://p/1.png"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ScanOutcome::Flagged {
                flag_id: h.store.find_by_message_ids(&[message.id]).await.unwrap()[&message.id][0].id,
                reason: "image:nudity".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_scanner_failure_is_swallowed() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let message = h.message(&chat, child, "pic").await;
        let pipeline = h.pipeline(FakeScanner::failing());
        let job = ModerationJob::image(message.id, child, chat.id, "s3://p/1.png");

        assert!(matches!(
            pipeline.scan(&job).await,
            Err(ModerationError::Scan(_))
        ));
        pipeline.process(job).await;
        assert_eq!(h.store.flag_count(), 0);
    }

    #[tokio::test]
    async fn test_flag_store_failure_is_swallowed() {
        let h = Harness::new();
        let (child, other) = (h.child("ana").await, h.child("ben").await);
        let chat = h.chat(child, other).await;
        let message = h.message(&chat, child, "loser").await;

        h.store.inject_fault(StoreFault::Flags);
        let pipeline = h.pipeline(FakeScanner::clean());
        let job = ModerationJob::text(message.id, child, chat.id, "loser");

        assert!(matches!(
            pipeline.scan(&job).await,
            Err(ModerationError::Store(_))
        ));
        pipeline.process(job).await;
    }
}
