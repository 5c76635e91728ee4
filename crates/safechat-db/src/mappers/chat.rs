//! Chat entity <-> model mapper

use safechat_core::entities::Chat;
use safechat_core::value_objects::Snowflake;

use crate::models::ChatModel;

impl From<ChatModel> for Chat {
    fn from(model: ChatModel) -> Self {
        Chat {
            id: Snowflake::new(model.id),
            participant_a: Snowflake::new(model.participant_a),
            participant_b: Snowflake::new(model.participant_b),
            created_at: model.created_at,
        }
    }
}
