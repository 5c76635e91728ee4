//! Access service
//!
//! Runs the contact approval gate and the access decision engine against
//! the store. Every lookup failure becomes `Deny(Unavailable)`; no error
//! path grants access.

use safechat_core::entities::Chat;
use safechat_core::policy::{
    evaluate, resolve_flag_check, AccessBasis, AccessDecision, AccessStep, DenyReason,
};
use safechat_core::{DomainError, Snowflake};
use tracing::{debug, error, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Access service
pub struct AccessService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessService<'a> {
    /// Create a new AccessService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Decide whether `viewer` may open `chat_id`.
    ///
    /// Child participants first pass the contact gate against the other
    /// participant; then the engine decides for everyone.
    #[instrument(skip(self))]
    pub async fn open_chat(
        &self,
        viewer: Snowflake,
        chat_id: Snowflake,
    ) -> ServiceResult<AccessDecision> {
        match self.load_chat(chat_id).await {
            Ok(chat) => Ok(self.check(viewer, &chat).await),
            Err(ServiceError::Denied(reason)) => Ok(AccessDecision::Deny(reason)),
            Err(e) => Err(e),
        }
    }

    /// Like [`Self::open_chat`], but a denial is an error and the chat is
    /// returned on success
    #[instrument(skip(self))]
    pub async fn authorize(
        &self,
        viewer: Snowflake,
        chat_id: Snowflake,
    ) -> ServiceResult<(Chat, AccessBasis)> {
        let chat = self.load_chat(chat_id).await?;
        match self.check(viewer, &chat).await {
            AccessDecision::Allow { basis } => Ok((chat, basis)),
            AccessDecision::Deny(reason) => Err(ServiceError::Denied(reason)),
        }
    }

    /// Gate plus engine for an already loaded chat
    pub async fn check(&self, viewer: Snowflake, chat: &Chat) -> AccessDecision {
        if let Some(other) = chat.other_participant(viewer) {
            if let Some(reason) = self.gate_participant(viewer, other).await {
                debug!(viewer_id = %viewer, chat_id = %chat.id, reason = %reason, "Contact gate denied");
                return AccessDecision::Deny(reason);
            }
        }

        let decision = self.decide(viewer, chat).await;
        debug!(viewer_id = %viewer, chat_id = %chat.id, ?decision, "Access decided");
        decision
    }

    /// The access decision engine.
    ///
    /// Links are read only for non-participants and the flag predicate only
    /// for `medium`. When the viewer supervises both participants the
    /// strongest of their links applies.
    pub async fn decide(&self, viewer: Snowflake, chat: &Chat) -> AccessDecision {
        let level = if chat.has_participant(viewer) {
            None
        } else {
            match self
                .ctx
                .link_repo()
                .find_for_parent_among(viewer, &chat.participants())
                .await
            {
                Ok(links) => links.iter().map(|l| l.surveillance_level).max(),
                Err(e) => {
                    error!(viewer_id = %viewer, chat_id = %chat.id, error = %e, "Link lookup failed, denying");
                    return AccessDecision::Deny(DenyReason::Unavailable);
                }
            }
        };

        match evaluate(viewer, chat, level) {
            AccessStep::Decided(decision) => decision,
            AccessStep::NeedsFlagCheck => match self.ctx.flag_repo().exists_for_chat(chat.id).await {
                Ok(has_flags) => resolve_flag_check(has_flags),
                Err(e) => {
                    error!(viewer_id = %viewer, chat_id = %chat.id, error = %e, "Flag lookup failed, denying");
                    AccessDecision::Deny(DenyReason::Unavailable)
                }
            },
        }
    }

    /// The contact approval gate: the counselor is always reachable,
    /// anyone else needs an approval row for `(child_id, other_id)`
    pub async fn can_child_open_chat(
        &self,
        child_id: Snowflake,
        other_id: Snowflake,
    ) -> Result<bool, DomainError> {
        if self.ctx.system_accounts().is_counselor(other_id) {
            return Ok(true);
        }
        self.ctx.contact_repo().is_approved(child_id, other_id).await
    }

    /// Gate a participant against the other one. `None` means pass.
    /// Only child accounts are gated.
    pub(crate) async fn gate_participant(
        &self,
        viewer: Snowflake,
        other: Snowflake,
    ) -> Option<DenyReason> {
        let account = match self.ctx.user_repo().find_by_id(viewer).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(viewer_id = %viewer, "Participant has no account record, denying");
                return Some(DenyReason::Unavailable);
            }
            Err(e) => {
                error!(viewer_id = %viewer, error = %e, "Account lookup failed, denying");
                return Some(DenyReason::Unavailable);
            }
        };

        if !account.is_child() {
            return None;
        }

        match self.can_child_open_chat(viewer, other).await {
            Ok(true) => None,
            Ok(false) => Some(DenyReason::PendingApproval),
            Err(e) => {
                error!(child_id = %viewer, other_id = %other, error = %e, "Approval lookup failed, denying");
                Some(DenyReason::Unavailable)
            }
        }
    }

    /// Live "any message in this chat is flagged" predicate, for a caller
    /// who takes part in the chat or supervises one of its participants
    #[instrument(skip(self))]
    pub async fn has_flagged_messages(
        &self,
        chat_id: Snowflake,
        parent_id: Snowflake,
    ) -> ServiceResult<bool> {
        let chat = self
            .ctx
            .chat_repo()
            .find_by_id(chat_id)
            .await?
            .ok_or(DomainError::ChatNotFound(chat_id))?;

        if !chat.has_participant(parent_id) {
            let links = self
                .ctx
                .link_repo()
                .find_for_parent_among(parent_id, &chat.participants())
                .await?;
            if links.is_empty() {
                return Err(DomainError::NotSupervisingParent(chat.participant_a).into());
            }
        }

        Ok(self.ctx.flag_repo().exists_for_chat(chat_id).await?)
    }

    /// 404 for a missing chat; a store failure is a fail-closed denial
    async fn load_chat(&self, chat_id: Snowflake) -> ServiceResult<Chat> {
        match self.ctx.chat_repo().find_by_id(chat_id).await {
            Ok(Some(chat)) => Ok(chat),
            Ok(None) => Err(DomainError::ChatNotFound(chat_id).into()),
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Chat lookup failed, denying");
                Err(ServiceError::Denied(DenyReason::Unavailable))
            }
        }
    }
}
