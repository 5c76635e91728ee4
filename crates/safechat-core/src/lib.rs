//! # safechat-core
//!
//! Domain layer: entities, value objects, repository traits, the access
//! policy and the keyword classifier.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod classifier;
pub mod entities;
pub mod error;
pub mod policy;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use classifier::{Classification, KeywordClassifier, KeywordListError};
pub use entities::{
    AccountKind, ApprovedContact, Attachment, Chat, Flag, Message, ParentChildLink,
    PendingContactRequest, SurveillanceLevel, User, MAX_MESSAGE_LENGTH,
};
pub use error::DomainError;
pub use policy::{AccessBasis, AccessDecision, AccessStep, DenyReason};
pub use traits::{
    ChatRepository, ContactRepository, FlagRepository, LinkRepository, MessageQuery,
    MessageRepository, RepoResult, UserRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError, SystemAccounts};
