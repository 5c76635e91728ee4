//! Scan service
//!
//! Internal entry points that queue a stored message for moderation.
//! Submissions are checked against the store, then acknowledged before any
//! scanning happens.

use safechat_core::entities::Message;
use safechat_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{ScanAcceptedResponse, ScanImageRequest, ScanTextRequest};
use crate::moderation::ModerationJob;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Scan service
pub struct ScanService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ScanService<'a> {
    /// Create a new ScanService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(message_id = %request.message_id))]
    pub async fn submit_text(&self, request: ScanTextRequest) -> ServiceResult<ScanAcceptedResponse> {
        if request.text.trim().is_empty() {
            return Err(ServiceError::validation("text must not be empty"));
        }
        self.verify(request.message_id, request.chat_id, request.child_id)
            .await?;

        let job = ModerationJob::text(
            request.message_id,
            request.child_id,
            request.chat_id,
            request.text,
        );
        Ok(self.dispatch(job))
    }

    #[instrument(skip(self, request), fields(message_id = %request.message_id))]
    pub async fn submit_image(
        &self,
        request: ScanImageRequest,
    ) -> ServiceResult<ScanAcceptedResponse> {
        if request.image_ref.trim().is_empty() {
            return Err(ServiceError::validation("image_ref must not be empty"));
        }
        self.verify(request.message_id, request.chat_id, request.child_id)
            .await?;

        let job = ModerationJob::image(
            request.message_id,
            request.child_id,
            request.chat_id,
            request.image_ref,
        );
        Ok(self.dispatch(job))
    }

    /// The message must exist, belong to the chat, come from the given
    /// sender, and that sender must be a child
    async fn verify(
        &self,
        message_id: Snowflake,
        chat_id: Snowflake,
        child_id: Snowflake,
    ) -> ServiceResult<Message> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;

        if message.chat_id != chat_id || message.sender_id != child_id {
            return Err(ServiceError::validation(
                "message does not belong to that chat and sender",
            ));
        }

        let sender = self
            .ctx
            .user_repo()
            .find_by_id(child_id)
            .await?
            .ok_or(DomainError::UserNotFound(child_id))?;
        if !sender.is_child() {
            return Err(DomainError::NotAChild(child_id).into());
        }

        Ok(message)
    }

    fn dispatch(&self, job: ModerationJob) -> ScanAcceptedResponse {
        let response = ScanAcceptedResponse {
            message_id: job.message_id.to_string(),
            branch: job.branch(),
        };
        info!(message_id = %job.message_id, branch = job.branch(), "Scan submitted");
        self.ctx.moderation().enqueue(job);
        response
    }
}
