//! Fixed system identities, injected from configuration

use super::Snowflake;

/// Well-known accounts the moderation and contact rules refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemAccounts {
    /// Always reachable by children, and author of counseling notices
    pub counselor_id: Snowflake,
    /// Recorded as `flagged_by` on automatic flags
    pub system_flagger_id: Snowflake,
}

impl SystemAccounts {
    pub const fn new(counselor_id: Snowflake, system_flagger_id: Snowflake) -> Self {
        Self {
            counselor_id,
            system_flagger_id,
        }
    }

    #[inline]
    pub fn is_counselor(&self, user_id: Snowflake) -> bool {
        self.counselor_id == user_id
    }
}
