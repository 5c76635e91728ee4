//! Flag entity <-> model mapper

use safechat_core::entities::Flag;
use safechat_core::value_objects::Snowflake;

use crate::models::FlagModel;

impl From<FlagModel> for Flag {
    fn from(model: FlagModel) -> Self {
        Flag {
            id: Snowflake::new(model.id),
            message_id: Snowflake::new(model.message_id),
            flagged_by: Snowflake::new(model.flagged_by),
            reason: model.reason,
            created_at: model.created_at,
        }
    }
}
