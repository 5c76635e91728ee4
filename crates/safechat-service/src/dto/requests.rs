//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! IDs accept either JSON strings or numbers.

use safechat_core::Snowflake;
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Chat Requests
// ============================================================================

/// Start (or reuse) a direct chat
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChatRequest {
    pub recipient_id: Snowflake,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Reference to an already uploaded file
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttachmentRequest {
    #[validate(length(min = 1, max = 2048, message = "Attachment URL must be 1-2048 characters"))]
    pub url: String,

    #[validate(length(min = 1, max = 255, message = "Content type must be 1-255 characters"))]
    pub content_type: String,
}

/// Send a message. At least one of `content` and `attachment` is required.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(max = 4000, message = "Message must be at most 4000 characters"))]
    pub content: Option<String>,

    #[validate(nested)]
    pub attachment: Option<AttachmentRequest>,
}

// ============================================================================
// Flag Requests
// ============================================================================

/// Flag a message by hand
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateFlagRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Supervision Requests
// ============================================================================

/// Change a child's surveillance level. The value is parsed strictly.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSurveillanceRequest {
    #[validate(length(min = 1, max = 16, message = "Level must be strict, medium or mild"))]
    pub level: String,
}

// ============================================================================
// Contact Requests
// ============================================================================

/// A parent asks for their child to be connected with another child
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContactRequest {
    pub child_id: Snowflake,
    pub contact_id: Snowflake,
}

// ============================================================================
// Internal Moderation Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScanTextRequest {
    pub message_id: Snowflake,
    pub child_id: Snowflake,
    pub chat_id: Snowflake,

    #[validate(length(min = 1, max = 4000, message = "Text must be 1-4000 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScanImageRequest {
    pub message_id: Snowflake,
    pub child_id: Snowflake,
    pub chat_id: Snowflake,

    #[validate(length(min = 1, max = 2048, message = "Image reference must be 1-2048 characters"))]
    pub image_ref: String,
}
