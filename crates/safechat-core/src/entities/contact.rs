//! Approved contacts and pending contact requests

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Permission for `child_id` to chat with `contact_id`, granted by `parent_id`.
/// Directional; an accepted request produces one row per direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedContact {
    pub child_id: Snowflake,
    pub contact_id: Snowflake,
    pub parent_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl ApprovedContact {
    pub fn new(child_id: Snowflake, contact_id: Snowflake, parent_id: Snowflake) -> Self {
        Self {
            child_id,
            contact_id,
            parent_id,
            created_at: Utc::now(),
        }
    }
}

/// A parent asking for their child (`child_id`) to be connected with another
/// child (`contact_id`). The contact's parent accepts or declines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingContactRequest {
    pub id: Snowflake,
    pub child_id: Snowflake,
    pub contact_id: Snowflake,
    pub requested_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl PendingContactRequest {
    pub fn new(
        id: Snowflake,
        child_id: Snowflake,
        contact_id: Snowflake,
        requested_by: Snowflake,
    ) -> Self {
        Self {
            id,
            child_id,
            contact_id,
            requested_by,
            created_at: Utc::now(),
        }
    }

    /// The two approval rows accepting this request must produce
    pub fn approvals(&self, accepted_by: Snowflake) -> [ApprovedContact; 2] {
        [
            ApprovedContact::new(self.child_id, self.contact_id, self.requested_by),
            ApprovedContact::new(self.contact_id, self.child_id, accepted_by),
        ]
    }
}
