//! Chat handlers
//!
//! Endpoints for chat listing, direct chat creation, the access check and
//! message history.

use axum::{
    extract::{Path, State},
    Json,
};
use safechat_service::dto::{
    AccessResponse, ChatResponse, CreateChatRequest, FlaggedResponse, MessageResponse,
    PaginatedResponse,
};
use safechat_service::{AccessService, ChatService};

use crate::extractors::{parse_id, AuthUser, Pagination, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// List the caller's chats
///
/// GET /chats
pub async fn list_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChatResponse>>> {
    let service = ChatService::new(state.service_context());
    let chats = service.list_chats(auth.user_id).await?;
    Ok(Json(chats))
}

/// Find or create a direct chat
///
/// POST /chats
pub async fn create_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let service = ChatService::new(state.service_context());
    let chat = service.start_direct_chat(auth.user_id, request).await?;
    Ok(Json(chat))
}

/// Whether the caller may open a chat. A denial is a normal 200 answer.
///
/// GET /chats/{chat_id}/access
pub async fn get_access(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<String>,
) -> ApiResult<Json<AccessResponse>> {
    let chat_id = parse_id(&chat_id, "chat_id")?;

    let service = AccessService::new(state.service_context());
    let decision = service.open_chat(auth.user_id, chat_id).await?;
    Ok(Json(AccessResponse::new(chat_id, decision)))
}

/// Whether any message in the chat is flagged
///
/// GET /chats/{chat_id}/flagged
pub async fn has_flagged_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<String>,
) -> ApiResult<Json<FlaggedResponse>> {
    let chat_id = parse_id(&chat_id, "chat_id")?;

    let service = AccessService::new(state.service_context());
    let has_flagged_messages = service.has_flagged_messages(chat_id, auth.user_id).await?;
    Ok(Json(FlaggedResponse {
        chat_id: chat_id.to_string(),
        has_flagged_messages,
    }))
}

/// Message history with flags, newest first
///
/// GET /chats/{chat_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<String>,
    pagination: Pagination,
) -> ApiResult<Json<PaginatedResponse<MessageResponse>>> {
    let chat_id = parse_id(&chat_id, "chat_id")?;

    let service = ChatService::new(state.service_context());
    let page = service
        .list_messages(auth.user_id, chat_id, pagination.into())
        .await?;
    Ok(Json(page))
}
