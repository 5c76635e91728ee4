//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{chats, contacts, health, messages, moderation, supervision};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately so they
/// bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(chat_routes())
        .merge(message_routes())
        .merge(supervision_routes())
        .merge(contact_routes())
        .merge(internal_routes())
}

/// Chat routes
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chats", get(chats::list_chats).post(chats::create_chat))
        .route("/chats/:chat_id/access", get(chats::get_access))
        .route("/chats/:chat_id/flagged", get(chats::has_flagged_messages))
        .route(
            "/chats/:chat_id/messages",
            get(chats::list_messages).post(messages::create_message),
        )
}

/// Message flag routes
fn message_routes() -> Router<AppState> {
    Router::new().route(
        "/messages/:message_id/flags",
        post(messages::flag_message).delete(messages::clear_flags),
    )
}

/// Supervision routes
fn supervision_routes() -> Router<AppState> {
    Router::new()
        .route("/children", get(supervision::list_children))
        .route("/children/:child_id", delete(supervision::unlink_child))
        .route(
            "/children/:child_id/surveillance",
            put(supervision::update_surveillance),
        )
        .route("/children/:child_id/contacts", get(supervision::list_contacts))
        .route(
            "/children/:child_id/contacts/:contact_id",
            delete(supervision::revoke_contact),
        )
}

/// Contact request routes
fn contact_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contact-requests",
            get(contacts::list_requests).post(contacts::create_request),
        )
        .route("/contact-requests/:request_id", delete(contacts::decline_request))
        .route(
            "/contact-requests/:request_id/accept",
            post(contacts::accept_request),
        )
}

/// Internal moderation entry points
fn internal_routes() -> Router<AppState> {
    Router::new()
        .route("/internal/moderation/scan-text", post(moderation::scan_text))
        .route("/internal/moderation/scan-image", post(moderation::scan_image))
}
