//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use safechat_core::entities::{
    ApprovedContact, Attachment, Flag, Message, ParentChildLink, PendingContactRequest, User,
};
use safechat_core::policy::AccessDecision;
use safechat_core::Snowflake;

use super::responses::{
    AccessResponse, AttachmentResponse, ChildResponse, ContactRequestResponse, ContactResponse,
    FlagResponse, MessageResponse, UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            account_type: user.kind.as_str(),
            username: user.kind.username().map(String::from),
            display_name: user.display_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

// ============================================================================
// Access Mappers
// ============================================================================

impl AccessResponse {
    pub fn new(chat_id: Snowflake, decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::Allow { basis } => Self {
                chat_id: chat_id.to_string(),
                allowed: true,
                basis: Some(basis),
                reason: None,
                message: None,
            },
            AccessDecision::Deny(reason) => Self {
                chat_id: chat_id.to_string(),
                allowed: false,
                basis: None,
                reason: Some(reason.code()),
                message: Some(reason.user_message()),
            },
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        Self {
            url: attachment.url.clone(),
            content_type: attachment.content_type.clone(),
        }
    }
}

impl From<&Flag> for FlagResponse {
    fn from(flag: &Flag) -> Self {
        Self {
            id: flag.id.to_string(),
            message_id: flag.message_id.to_string(),
            flagged_by: flag.flagged_by.to_string(),
            reason: flag.reason.clone(),
            created_at: flag.created_at,
        }
    }
}

impl From<Flag> for FlagResponse {
    fn from(flag: Flag) -> Self {
        Self::from(&flag)
    }
}

impl MessageResponse {
    /// Message with the flags currently attached to it
    pub fn with_flags(message: &Message, flags: &[Flag]) -> Self {
        Self {
            id: message.id.to_string(),
            chat_id: message.chat_id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content.clone(),
            attachment: message.attachment.as_ref().map(AttachmentResponse::from),
            flagged: !flags.is_empty(),
            flags: flags.iter().map(FlagResponse::from).collect(),
            created_at: message.created_at,
        }
    }
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self::with_flags(message, &[])
    }
}

// ============================================================================
// Supervision Mappers
// ============================================================================

impl ChildResponse {
    pub fn new(link: &ParentChildLink, child: &User) -> Self {
        Self {
            child: UserResponse::from(child),
            surveillance_level: link.surveillance_level,
            linked_at: link.created_at,
        }
    }
}

// ============================================================================
// Contact Mappers
// ============================================================================

impl From<&ApprovedContact> for ContactResponse {
    fn from(contact: &ApprovedContact) -> Self {
        Self {
            child_id: contact.child_id.to_string(),
            contact_id: contact.contact_id.to_string(),
            approved_by: contact.parent_id.to_string(),
            created_at: contact.created_at,
        }
    }
}

impl From<&PendingContactRequest> for ContactRequestResponse {
    fn from(request: &PendingContactRequest) -> Self {
        Self {
            id: request.id.to_string(),
            child_id: request.child_id.to_string(),
            contact_id: request.contact_id.to_string(),
            requested_by: request.requested_by.to_string(),
            created_at: request.created_at,
        }
    }
}
