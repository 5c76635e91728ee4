//! Parent/child link entity <-> model mapper

use safechat_core::entities::{ParentChildLink, SurveillanceLevel};
use safechat_core::error::DomainError;
use safechat_core::value_objects::Snowflake;

use crate::models::LinkModel;

/// Fallible: an unknown level in storage is an error, never coerced
impl TryFrom<LinkModel> for ParentChildLink {
    type Error = DomainError;

    fn try_from(model: LinkModel) -> Result<Self, Self::Error> {
        let level = model
            .surveillance_level
            .parse::<SurveillanceLevel>()
            .map_err(|_| {
                DomainError::DatabaseError(format!(
                    "stored surveillance level '{}' is invalid",
                    model.surveillance_level
                ))
            })?;

        Ok(ParentChildLink {
            parent_id: Snowflake::new(model.parent_id),
            child_id: Snowflake::new(model.child_id),
            surveillance_level: level,
            created_at: model.created_at,
        })
    }
}
