//! Message service
//!
//! Handles message creation. Messages from children are handed to the
//! moderation queue after they are persisted.

use safechat_core::entities::{Attachment, Message};
use safechat_core::policy::DenyReason;
use safechat_core::{DomainError, Snowflake};
use tracing::{debug, error, info, instrument};

use crate::dto::{CreateMessageRequest, MessageResponse};
use crate::moderation::ModerationJob;

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Persist a message and, for child senders, enqueue its moderation
    /// jobs. The send never waits on moderation.
    #[instrument(skip(self, request))]
    pub async fn send_message(
        &self,
        chat_id: Snowflake,
        sender_id: Snowflake,
        request: CreateMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let chat = self
            .ctx
            .chat_repo()
            .find_by_id(chat_id)
            .await?
            .ok_or(DomainError::ChatNotFound(chat_id))?;

        let Some(other) = chat.other_participant(sender_id) else {
            return Err(ServiceError::Denied(DenyReason::NoRelationship));
        };

        let sender = self
            .ctx
            .user_repo()
            .find_by_id(sender_id)
            .await
            .map_err(|e| {
                error!(sender_id = %sender_id, error = %e, "Sender lookup failed, refusing send");
                ServiceError::Denied(DenyReason::Unavailable)
            })?
            .ok_or(ServiceError::Denied(DenyReason::Unavailable))?;

        if sender.is_child() {
            if let Some(reason) = AccessService::new(self.ctx)
                .gate_participant(sender_id, other)
                .await
            {
                return Err(ServiceError::Denied(reason));
            }
        }

        let attachment = request
            .attachment
            .map(|a| Attachment::new(a.url, a.content_type));
        let message = Message::new(
            self.ctx.generate_id(),
            chat_id,
            sender_id,
            request.content,
            attachment,
        )?;

        self.ctx.message_repo().create(&message).await?;
        info!(message_id = %message.id, chat_id = %chat_id, "Message created");

        if sender.is_child() {
            for job in ModerationJob::for_message(&message) {
                debug!(message_id = %message.id, branch = job.branch(), "Moderation job enqueued");
                self.ctx.moderation().enqueue(job);
            }
        }

        Ok(MessageResponse::from(&message))
    }
}
