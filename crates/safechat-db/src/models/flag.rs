//! Flag database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for flags table
#[derive(Debug, Clone, FromRow)]
pub struct FlagModel {
    pub id: i64,
    pub message_id: i64,
    pub flagged_by: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
