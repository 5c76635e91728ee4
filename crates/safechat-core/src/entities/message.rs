//! Message entity - immutable once stored

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Maximum characters of message text
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Reference to an uploaded file (object storage lives elsewhere)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub content_type: String,
}

impl Attachment {
    pub fn new(url: String, content_type: String) -> Self {
        Self { url, content_type }
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub chat_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: Option<String>,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a validated message. Blank content is normalized to `None`;
    /// at least one of content or attachment must remain.
    pub fn new(
        id: Snowflake,
        chat_id: Snowflake,
        sender_id: Snowflake,
        content: Option<String>,
        attachment: Option<Attachment>,
    ) -> Result<Self, DomainError> {
        let content = content.filter(|c| !c.trim().is_empty());

        if let Some(text) = &content {
            if text.chars().count() > MAX_MESSAGE_LENGTH {
                return Err(DomainError::ContentTooLong {
                    max: MAX_MESSAGE_LENGTH,
                });
            }
        }

        if content.is_none() && attachment.is_none() {
            return Err(DomainError::ValidationError(
                "message needs content or an attachment".to_string(),
            ));
        }

        Ok(Self {
            id,
            chat_id,
            sender_id,
            content,
            attachment,
            created_at: Utc::now(),
        })
    }

    /// Non-empty text, if any
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Attachment URL when the attachment is an image
    pub fn image_ref(&self) -> Option<&str> {
        self.attachment
            .as_ref()
            .filter(|a| a.is_image())
            .map(|a| a.url.as_str())
    }
}
