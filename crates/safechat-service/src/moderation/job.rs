//! Units of work handed from the send path to the moderation worker

use safechat_core::entities::Message;
use safechat_core::Snowflake;

/// Which branch of the pipeline a job runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Text { content: String },
    Image { image_ref: String },
}

/// One scan of one child-authored message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationJob {
    pub message_id: Snowflake,
    pub sender_id: Snowflake,
    pub chat_id: Snowflake,
    pub kind: JobKind,
}

impl ModerationJob {
    pub fn text(
        message_id: Snowflake,
        sender_id: Snowflake,
        chat_id: Snowflake,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            sender_id,
            chat_id,
            kind: JobKind::Text {
                content: content.into(),
            },
        }
    }

    pub fn image(
        message_id: Snowflake,
        sender_id: Snowflake,
        chat_id: Snowflake,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            sender_id,
            chat_id,
            kind: JobKind::Image {
                image_ref: image_ref.into(),
            },
        }
    }

    /// Jobs for a stored message: one per branch that applies.
    /// Whether the sender is a child is the caller's decision.
    pub fn for_message(message: &Message) -> Vec<Self> {
        let mut jobs = Vec::with_capacity(2);
        if let Some(text) = message.text() {
            jobs.push(Self::text(message.id, message.sender_id, message.chat_id, text));
        }
        if let Some(image_ref) = message.image_ref() {
            jobs.push(Self::image(
                message.id,
                message.sender_id,
                message.chat_id,
                image_ref,
            ));
        }
        jobs
    }

    pub fn branch(&self) -> &'static str {
        match self.kind {
            JobKind::Text { .. } => "text",
            JobKind::Image { .. } => "image",
        }
    }
}
