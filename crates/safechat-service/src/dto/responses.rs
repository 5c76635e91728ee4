//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use safechat_core::policy::AccessBasis;
use safechat_core::SurveillanceLevel;
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Paginated response with cursor-based pagination
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, before: Option<String>, after: Option<String>, has_more: bool, limit: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta {
                before,
                after,
                has_more,
                limit,
            },
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Cursor for fetching older messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Cursor for fetching newer messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Whether more results exist
    pub has_more: bool,
    /// Page size limit used
    pub limit: i64,
}

// ============================================================================
// User Responses
// ============================================================================

/// Public account view
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    /// `parent` or `child`
    pub account_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
}

// ============================================================================
// Access Responses
// ============================================================================

/// Outcome of a chat-open check
#[derive(Debug, Clone, Serialize)]
pub struct AccessResponse {
    pub chat_id: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis: Option<AccessBasis>,
    /// Deny reason code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Explanation for the viewer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedResponse {
    pub chat_id: String,
    pub has_flagged_messages: bool,
}

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub participants: [String; 2],
    /// The participant who is not the caller; absent for supervising parents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_participant: Option<UserResponse>,
    pub last_message: Option<MessageResponse>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentResponse {
    pub url: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub content: Option<String>,
    pub attachment: Option<AttachmentResponse>,
    pub flagged: bool,
    pub flags: Vec<FlagResponse>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Flag Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FlagResponse {
    pub id: String,
    pub message_id: String,
    pub flagged_by: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearFlagsResponse {
    pub message_id: String,
    pub cleared: u64,
}

// ============================================================================
// Supervision Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChildResponse {
    pub child: UserResponse,
    pub surveillance_level: SurveillanceLevel,
    pub linked_at: DateTime<Utc>,
}

// ============================================================================
// Contact Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub child_id: String,
    pub contact_id: String,
    pub approved_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactRequestResponse {
    pub id: String,
    pub child_id: String,
    pub contact_id: String,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Moderation Responses
// ============================================================================

/// Internal scan submissions are acknowledged before they run
#[derive(Debug, Clone, Serialize)]
pub struct ScanAcceptedResponse {
    pub message_id: String,
    pub branch: &'static str,
}

// ============================================================================
// Health Check Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    /// `postgres` or `memory`
    pub store: &'static str,
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(store: &'static str, database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store,
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}
