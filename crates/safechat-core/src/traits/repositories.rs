//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or the in-process store).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{
    ApprovedContact, Chat, Flag, Message, ParentChildLink, PendingContactRequest,
    SurveillanceLevel, User,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;
}

// ============================================================================
// Parent/Child Link Repository
// ============================================================================

#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Find the link for one (parent, child) pair
    async fn find(&self, parent_id: Snowflake, child_id: Snowflake)
        -> RepoResult<Option<ParentChildLink>>;

    /// Links from `parent_id` to any of `child_ids`
    async fn find_for_parent_among(
        &self,
        parent_id: Snowflake,
        child_ids: &[Snowflake],
    ) -> RepoResult<Vec<ParentChildLink>>;

    /// All children supervised by a parent
    async fn find_by_parent(&self, parent_id: Snowflake) -> RepoResult<Vec<ParentChildLink>>;

    /// Create a new link; fails with `LinkExists` for a duplicate pair
    async fn create(&self, link: &ParentChildLink) -> RepoResult<()>;

    /// Change the level; returns false if no link exists
    async fn update_level(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
        level: SurveillanceLevel,
    ) -> RepoResult<bool>;

    /// Remove the link; returns false if no link existed
    async fn delete(&self, parent_id: Snowflake, child_id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Chat Repository
// ============================================================================

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find chat by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>>;

    /// Find the chat between two users, in either participant order
    async fn find_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Chat>>;

    /// All chats a user participates in
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>>;

    /// Create a new chat
    async fn create(&self, chat: &Chat) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Pagination options for message queries
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: i64,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// List messages in a chat, newest first
    async fn find_by_chat(&self, chat_id: Snowflake, query: MessageQuery)
        -> RepoResult<Vec<Message>>;

    /// Most recent message in a chat
    async fn latest_in_chat(&self, chat_id: Snowflake) -> RepoResult<Option<Message>>;

    /// Create a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;
}

// ============================================================================
// Flag Repository
// ============================================================================

#[async_trait]
pub trait FlagRepository: Send + Sync {
    /// Append a flag. No uniqueness on (message, flagger).
    async fn create(&self, flag: &Flag) -> RepoResult<()>;

    /// Flags grouped by message; messages without flags are absent
    async fn find_by_message_ids(
        &self,
        message_ids: &[Snowflake],
    ) -> RepoResult<HashMap<Snowflake, Vec<Flag>>>;

    /// Delete every flag on a message, returning how many were removed
    async fn delete_by_message(&self, message_id: Snowflake) -> RepoResult<u64>;

    /// Whether any message in the chat currently carries a flag.
    /// The one query every "has flagged messages" check goes through.
    async fn exists_for_chat(&self, chat_id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Contact Repository
// ============================================================================

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Whether `child_id` may chat with `contact_id`
    async fn is_approved(&self, child_id: Snowflake, contact_id: Snowflake) -> RepoResult<bool>;

    /// Approved contacts of a child
    async fn find_approved(&self, child_id: Snowflake) -> RepoResult<Vec<ApprovedContact>>;

    /// Insert one approval direction; a duplicate is a no-op
    async fn insert_approval(&self, approval: &ApprovedContact) -> RepoResult<()>;

    /// Insert both approval rows and delete the request, atomically
    async fn approve_request(
        &self,
        request: &PendingContactRequest,
        approvals: &[ApprovedContact; 2],
    ) -> RepoResult<()>;

    /// Remove both directions between two children
    async fn delete_pair(&self, a: Snowflake, b: Snowflake) -> RepoResult<u64>;

    /// Find a pending request by ID
    async fn find_request(&self, id: Snowflake) -> RepoResult<Option<PendingContactRequest>>;

    /// Pending request between two children, in either direction
    async fn find_request_between(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<PendingContactRequest>>;

    /// Pending requests asking for any of `contact_ids`
    async fn find_requests_for(
        &self,
        contact_ids: &[Snowflake],
    ) -> RepoResult<Vec<PendingContactRequest>>;

    /// Create a pending request
    async fn create_request(&self, request: &PendingContactRequest) -> RepoResult<()>;

    /// Delete a pending request; returns false if it did not exist
    async fn delete_request(&self, id: Snowflake) -> RepoResult<bool>;
}
