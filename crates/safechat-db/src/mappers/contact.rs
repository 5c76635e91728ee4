//! Contact entity <-> model mappers

use safechat_core::entities::{ApprovedContact, PendingContactRequest};
use safechat_core::value_objects::Snowflake;

use crate::models::{ApprovedContactModel, ContactRequestModel};

impl From<ApprovedContactModel> for ApprovedContact {
    fn from(model: ApprovedContactModel) -> Self {
        ApprovedContact {
            child_id: Snowflake::new(model.child_id),
            contact_id: Snowflake::new(model.contact_id),
            parent_id: Snowflake::new(model.parent_id),
            created_at: model.created_at,
        }
    }
}

impl From<ContactRequestModel> for PendingContactRequest {
    fn from(model: ContactRequestModel) -> Self {
        PendingContactRequest {
            id: Snowflake::new(model.id),
            child_id: Snowflake::new(model.child_id),
            contact_id: Snowflake::new(model.contact_id),
            requested_by: Snowflake::new(model.requested_by),
            created_at: model.created_at,
        }
    }
}
