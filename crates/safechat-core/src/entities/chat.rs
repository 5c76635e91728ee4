//! Chat entity - a conversation between exactly two participants

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Chat entity. Symmetric: neither participant owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: Snowflake,
    pub participant_a: Snowflake,
    pub participant_b: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: Snowflake, participant_a: Snowflake, participant_b: Snowflake) -> Self {
        Self {
            id,
            participant_a,
            participant_b,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn participants(&self) -> [Snowflake; 2] {
        [self.participant_a, self.participant_b]
    }

    #[inline]
    pub fn has_participant(&self, user_id: Snowflake) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The participant that is not `user_id`, if `user_id` is in the chat
    pub fn other_participant(&self, user_id: Snowflake) -> Option<Snowflake> {
        if self.participant_a == user_id {
            Some(self.participant_b)
        } else if self.participant_b == user_id {
            Some(self.participant_a)
        } else {
            None
        }
    }

    /// True if this chat is between `a` and `b` in either order
    pub fn is_between(&self, a: Snowflake, b: Snowflake) -> bool {
        (self.participant_a == a && self.participant_b == b)
            || (self.participant_a == b && self.participant_b == a)
    }
}
