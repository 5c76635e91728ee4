//! Flag service
//!
//! Human flagging and the parent "reviewed, clear" override. Flags are
//! append-only; clearing removes every flag on a message at once.

use safechat_core::entities::{Flag, Message};
use safechat_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{ClearFlagsResponse, CreateFlagRequest, FlagResponse};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Flag service
pub struct FlagService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FlagService<'a> {
    /// Create a new FlagService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Flag a message. The flagger must currently be allowed into its chat.
    #[instrument(skip(self, request))]
    pub async fn flag_message(
        &self,
        message_id: Snowflake,
        flagger_id: Snowflake,
        request: CreateFlagRequest,
    ) -> ServiceResult<FlagResponse> {
        let message = self.load_message(message_id).await?;
        AccessService::new(self.ctx)
            .authorize(flagger_id, message.chat_id)
            .await?;

        let reason = request.reason.filter(|r| !r.trim().is_empty());
        let flag = Flag::new(self.ctx.generate_id(), message_id, flagger_id, reason);
        self.ctx.flag_repo().create(&flag).await?;

        info!(flag_id = %flag.id, message_id = %message_id, flagged_by = %flagger_id, "Message flagged");
        Ok(FlagResponse::from(flag))
    }

    /// Clear every flag on a message. Requires a supervising link, at any
    /// level, to one of the chat's participants.
    #[instrument(skip(self))]
    pub async fn clear_flags(
        &self,
        message_id: Snowflake,
        parent_id: Snowflake,
    ) -> ServiceResult<ClearFlagsResponse> {
        let message = self.load_message(message_id).await?;
        let chat = self
            .ctx
            .chat_repo()
            .find_by_id(message.chat_id)
            .await?
            .ok_or(DomainError::ChatNotFound(message.chat_id))?;

        let links = self
            .ctx
            .link_repo()
            .find_for_parent_among(parent_id, &chat.participants())
            .await?;
        if links.is_empty() {
            return Err(DomainError::NotSupervisingParent(message.sender_id).into());
        }

        let cleared = self.ctx.flag_repo().delete_by_message(message_id).await?;
        info!(message_id = %message_id, parent_id = %parent_id, cleared, "Flags cleared");

        Ok(ClearFlagsResponse {
            message_id: message_id.to_string(),
            cleared,
        })
    }

    async fn load_message(&self, message_id: Snowflake) -> ServiceResult<Message> {
        Ok(self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?)
    }
}
