//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Chat not found: {0}")]
    ChatNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("No supervision link between parent {parent_id} and child {child_id}")]
    LinkNotFound {
        parent_id: Snowflake,
        child_id: Snowflake,
    },

    #[error("Contact request not found: {0}")]
    ContactRequestNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid surveillance level '{0}' (expected strict, medium or mild)")]
    InvalidSurveillanceLevel(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Cannot start a chat with yourself")]
    SelfChat,

    #[error("User {0} is not a child account")]
    NotAChild(Snowflake),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a supervising parent of {0}")]
    NotSupervisingParent(Snowflake),

    #[error("Contact {0} is not approved")]
    ContactNotApproved(Snowflake),

    #[error("Parent accounts only")]
    ParentOnly,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Contact is already approved")]
    AlreadyApproved,

    #[error("A contact request for this pair already exists")]
    RequestExists,

    #[error("Supervision link already exists")]
    LinkExists,

    #[error("A chat between these users already exists")]
    ChatExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ChatNotFound(_) => "UNKNOWN_CHAT",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::LinkNotFound { .. } => "UNKNOWN_LINK",
            Self::ContactRequestNotFound(_) => "UNKNOWN_CONTACT_REQUEST",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidSurveillanceLevel(_) => "INVALID_SURVEILLANCE_LEVEL",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::SelfChat => "SELF_CHAT",
            Self::NotAChild(_) => "NOT_A_CHILD",

            // Authorization
            Self::NotSupervisingParent(_) => "NOT_SUPERVISING_PARENT",
            Self::ContactNotApproved(_) => "PENDING_APPROVAL",
            Self::ParentOnly => "PARENT_ONLY",

            // Conflict
            Self::AlreadyApproved => "ALREADY_APPROVED",
            Self::RequestExists => "REQUEST_EXISTS",
            Self::LinkExists => "LINK_EXISTS",
            Self::ChatExists => "CHAT_EXISTS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ChatNotFound(_)
                | Self::MessageNotFound(_)
                | Self::LinkNotFound { .. }
                | Self::ContactRequestNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidSurveillanceLevel(_)
                | Self::ContentTooLong { .. }
                | Self::SelfChat
                | Self::NotAChild(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotSupervisingParent(_) | Self::ContactNotApproved(_) | Self::ParentOnly
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyApproved | Self::RequestExists | Self::LinkExists | Self::ChatExists
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::ChatNotFound(Snowflake::new(1)).code(), "UNKNOWN_CHAT");
        assert_eq!(
            DomainError::ContactNotApproved(Snowflake::new(1)).code(),
            "PENDING_APPROVAL"
        );
        assert_eq!(
            DomainError::InvalidSurveillanceLevel("loose".into()).code(),
            "INVALID_SURVEILLANCE_LEVEL"
        );
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::LinkNotFound {
            parent_id: Snowflake::new(1),
            child_id: Snowflake::new(2)
        }
        .is_not_found());
        assert!(DomainError::InvalidSurveillanceLevel(String::new()).is_validation());
        assert!(DomainError::NotSupervisingParent(Snowflake::new(1)).is_authorization());
        assert!(DomainError::RequestExists.is_conflict());
        assert!(!DomainError::DatabaseError("x".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::ChatNotFound(Snowflake::new(123));
        assert_eq!(err.to_string(), "Chat not found: 123");

        let err = DomainError::ContentTooLong { max: 4000 };
        assert_eq!(err.to_string(), "Content too long: max 4000 characters");
    }
}
