//! Parent/child link database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for parent_child_links table
#[derive(Debug, Clone, FromRow)]
pub struct LinkModel {
    pub parent_id: i64,
    pub child_id: i64,
    /// Constrained to strict/medium/mild by a CHECK
    pub surveillance_level: String,
    pub created_at: DateTime<Utc>,
}
