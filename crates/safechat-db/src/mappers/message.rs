//! Message entity <-> model mapper

use safechat_core::entities::{Attachment, Message};
use safechat_core::value_objects::Snowflake;

use crate::models::MessageModel;

const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        let attachment = model.attachment_url.map(|url| Attachment {
            url,
            content_type: model
                .attachment_content_type
                .unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string()),
        });

        Message {
            id: Snowflake::new(model.id),
            chat_id: Snowflake::new(model.chat_id),
            sender_id: Snowflake::new(model.sender_id),
            content: model.content,
            attachment,
            created_at: model.created_at,
        }
    }
}

/// Message values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub content: Option<&'a str>,
    pub attachment_url: Option<&'a str>,
    pub attachment_content_type: Option<&'a str>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            chat_id: message.chat_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            content: message.content.as_deref(),
            attachment_url: message.attachment.as_ref().map(|a| a.url.as_str()),
            attachment_content_type: message
                .attachment
                .as_ref()
                .map(|a| a.content_type.as_str()),
        }
    }
}
