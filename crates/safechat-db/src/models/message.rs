//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table. The attachment is flattened into
/// two nullable columns.
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub content: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    #[inline]
    pub fn has_attachment(&self) -> bool {
        self.attachment_url.is_some()
    }
}
