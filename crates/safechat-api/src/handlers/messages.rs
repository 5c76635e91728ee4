//! Message handlers
//!
//! Endpoints for sending messages and managing their flags.

use axum::{
    extract::{Path, State},
    Json,
};
use safechat_service::dto::{
    ClearFlagsResponse, CreateFlagRequest, CreateMessageRequest, FlagResponse, MessageResponse,
};
use safechat_service::{FlagService, MessageService};

use crate::extractors::{parse_id, AuthUser, OptionalValidatedJson, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Send a message
///
/// POST /chats/{chat_id}/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let chat_id = parse_id(&chat_id, "chat_id")?;

    let service = MessageService::new(state.service_context());
    let response = service.send_message(chat_id, auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// Flag a message. The body is optional.
///
/// POST /messages/{message_id}/flags
pub async fn flag_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
    OptionalValidatedJson(request): OptionalValidatedJson<CreateFlagRequest>,
) -> ApiResult<Created<Json<FlagResponse>>> {
    let message_id = parse_id(&message_id, "message_id")?;

    let service = FlagService::new(state.service_context());
    let flag = service
        .flag_message(message_id, auth.user_id, request.unwrap_or_default())
        .await?;
    Ok(Created(Json(flag)))
}

/// Clear every flag on a message
///
/// DELETE /messages/{message_id}/flags
pub async fn clear_flags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
) -> ApiResult<Json<ClearFlagsResponse>> {
    let message_id = parse_id(&message_id, "message_id")?;

    let service = FlagService::new(state.service_context());
    let cleared = service.clear_flags(message_id, auth.user_id).await?;
    Ok(Json(cleared))
}
