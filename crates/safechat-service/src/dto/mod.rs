//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AttachmentRequest, CreateChatRequest, CreateContactRequest, CreateFlagRequest,
    CreateMessageRequest, ScanImageRequest, ScanTextRequest, UpdateSurveillanceRequest,
};

pub use responses::{
    AccessResponse, AttachmentResponse, ChatResponse, ChildResponse, ClearFlagsResponse,
    ContactRequestResponse, ContactResponse, FlagResponse, FlaggedResponse, HealthChecks,
    HealthResponse, MessageResponse, PaginatedResponse, PaginationMeta, ReadinessResponse,
    ScanAcceptedResponse, UserResponse,
};
