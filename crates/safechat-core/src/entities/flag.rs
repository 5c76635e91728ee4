//! Flag entity - a message marked as concerning

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// One flag event. A message can carry any number of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub flagged_by: Snowflake,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Flag {
    pub fn new(
        id: Snowflake,
        message_id: Snowflake,
        flagged_by: Snowflake,
        reason: Option<String>,
    ) -> Self {
        Self {
            id,
            message_id,
            flagged_by,
            reason,
            created_at: Utc::now(),
        }
    }

    /// Reason recorded for a keyword classifier hit
    pub fn keyword_reason(category: &str, term: &str) -> String {
        format!("keyword:{category}:{term}")
    }

    /// Reason recorded for an image scanner hit
    pub fn image_reason(reason: Option<&str>) -> String {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        format!("image:{}", reason.unwrap_or("unsafe-content"))
    }
}
