//! Contact request handlers
//!
//! Endpoints for asking, accepting and declining child-to-child contact.

use axum::{
    extract::{Path, State},
    Json,
};
use safechat_service::dto::{ContactRequestResponse, ContactResponse, CreateContactRequest};
use safechat_service::ContactService;

use crate::extractors::{parse_id, AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Ask for the caller's child to be connected with another child
///
/// POST /contact-requests
pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateContactRequest>,
) -> ApiResult<Created<Json<ContactRequestResponse>>> {
    let service = ContactService::new(state.service_context());
    let pending = service.request_contact(auth.user_id, request).await?;
    Ok(Created(Json(pending)))
}

/// Requests waiting on the caller
///
/// GET /contact-requests
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ContactRequestResponse>>> {
    let service = ContactService::new(state.service_context());
    Ok(Json(service.list_incoming_requests(auth.user_id).await?))
}

/// Accept a request; both directions are approved
///
/// POST /contact-requests/{request_id}/accept
pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> ApiResult<Json<Vec<ContactResponse>>> {
    let request_id = parse_id(&request_id, "request_id")?;

    let service = ContactService::new(state.service_context());
    let approvals = service.accept_request(auth.user_id, request_id).await?;
    Ok(Json(approvals.into()))
}

/// Decline a request
///
/// DELETE /contact-requests/{request_id}
pub async fn decline_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> ApiResult<NoContent> {
    let request_id = parse_id(&request_id, "request_id")?;

    ContactService::new(state.service_context())
        .decline_request(auth.user_id, request_id)
        .await?;
    Ok(NoContent)
}
