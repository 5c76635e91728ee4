//! Chat service
//!
//! Direct chat creation, chat listing and message history.

use std::collections::HashMap;

use safechat_core::entities::Chat;
use safechat_core::traits::MessageQuery;
use safechat_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{ChatResponse, CreateChatRequest, MessageResponse, PaginatedResponse, UserResponse};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Chat service
pub struct ChatService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatService<'a> {
    /// Create a new ChatService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Find or lazily create the chat between the caller and the recipient.
    /// Child callers must pass the contact gate first.
    #[instrument(skip(self, request))]
    pub async fn start_direct_chat(
        &self,
        viewer: Snowflake,
        request: CreateChatRequest,
    ) -> ServiceResult<ChatResponse> {
        let recipient_id = request.recipient_id;
        if recipient_id == viewer {
            return Err(DomainError::SelfChat.into());
        }

        let recipient = self
            .ctx
            .user_repo()
            .find_by_id(recipient_id)
            .await?
            .ok_or(DomainError::UserNotFound(recipient_id))?;

        if let Some(reason) = AccessService::new(self.ctx)
            .gate_participant(viewer, recipient_id)
            .await
        {
            return Err(ServiceError::Denied(reason));
        }

        let chat = self.find_or_create(viewer, recipient_id).await?;
        let last_message = self.ctx.message_repo().latest_in_chat(chat.id).await?;

        Ok(ChatResponse {
            id: chat.id.to_string(),
            participants: chat.participants().map(|id| id.to_string()),
            other_participant: Some(UserResponse::from(&recipient)),
            last_message: last_message.as_ref().map(MessageResponse::from),
            created_at: chat.created_at,
        })
    }

    /// Chats the user takes part in, most recent activity first
    #[instrument(skip(self))]
    pub async fn list_chats(&self, user_id: Snowflake) -> ServiceResult<Vec<ChatResponse>> {
        let chats = self.ctx.chat_repo().find_by_user(user_id).await?;

        let mut entries = Vec::with_capacity(chats.len());
        for chat in chats {
            let last_message = self.ctx.message_repo().latest_in_chat(chat.id).await?;
            let other = match chat.other_participant(user_id) {
                Some(other_id) => self.ctx.user_repo().find_by_id(other_id).await?,
                None => None,
            };
            let activity = last_message
                .as_ref()
                .map_or(chat.created_at, |m| m.created_at);

            entries.push((
                activity,
                ChatResponse {
                    id: chat.id.to_string(),
                    participants: chat.participants().map(|id| id.to_string()),
                    other_participant: other.as_ref().map(UserResponse::from),
                    last_message: last_message.as_ref().map(MessageResponse::from),
                    created_at: chat.created_at,
                },
            ));
        }

        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries.into_iter().map(|(_, chat)| chat).collect())
    }

    /// Message history with flags attached. The viewer must be allowed to
    /// open the chat.
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        viewer: Snowflake,
        chat_id: Snowflake,
        query: MessageQuery,
    ) -> ServiceResult<PaginatedResponse<MessageResponse>> {
        let (chat, basis) = AccessService::new(self.ctx).authorize(viewer, chat_id).await?;
        let limit = query.limit.clamp(1, 100);
        let before = query.before.map(|id| id.to_string());
        let after = query.after.map(|id| id.to_string());

        let messages = self
            .ctx
            .message_repo()
            .find_by_chat(chat.id, MessageQuery { limit, ..query })
            .await?;

        let ids: Vec<Snowflake> = messages.iter().map(|m| m.id).collect();
        let mut flags = if ids.is_empty() {
            HashMap::new()
        } else {
            self.ctx.flag_repo().find_by_message_ids(&ids).await?
        };

        let has_more = i64::try_from(messages.len()).unwrap_or(i64::MAX) >= limit;
        let data = messages
            .iter()
            .map(|message| {
                let attached = flags.remove(&message.id).unwrap_or_default();
                MessageResponse::with_flags(message, &attached)
            })
            .collect();

        info!(viewer_id = %viewer, chat_id = %chat_id, ?basis, "Messages read");
        Ok(PaginatedResponse::new(data, before, after, has_more, limit))
    }

    /// Existing chat for the pair, or a new one. A concurrent create for the
    /// same pair is resolved by reading the winner back.
    async fn find_or_create(&self, a: Snowflake, b: Snowflake) -> ServiceResult<Chat> {
        if let Some(chat) = self.ctx.chat_repo().find_between(a, b).await? {
            return Ok(chat);
        }

        let chat = Chat::new(self.ctx.generate_id(), a, b);
        match self.ctx.chat_repo().create(&chat).await {
            Ok(()) => {
                info!(chat_id = %chat.id, "Direct chat created");
                Ok(chat)
            }
            Err(DomainError::ChatExists) => {
                warn!(a = %a, b = %b, "Chat created concurrently, reusing");
                self.ctx
                    .chat_repo()
                    .find_between(a, b)
                    .await?
                    .ok_or_else(|| ServiceError::internal("chat vanished after create conflict"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
