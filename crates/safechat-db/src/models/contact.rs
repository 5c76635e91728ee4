//! Contact approval database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for approved_contacts table
#[derive(Debug, Clone, FromRow)]
pub struct ApprovedContactModel {
    pub child_id: i64,
    pub contact_id: i64,
    pub parent_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Database model for pending_contact_requests table
#[derive(Debug, Clone, FromRow)]
pub struct ContactRequestModel {
    pub id: i64,
    pub child_id: i64,
    pub contact_id: i64,
    pub requested_by: i64,
    pub created_at: DateTime<Utc>,
}
