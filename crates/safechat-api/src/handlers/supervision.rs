//! Supervision handlers
//!
//! Parent-side endpoints for children, surveillance levels and approved
//! contacts.

use axum::{
    extract::{Path, State},
    Json,
};
use safechat_service::dto::{ChildResponse, ContactResponse, UpdateSurveillanceRequest};
use safechat_service::{ContactService, SupervisionService};

use crate::extractors::{parse_id, AuthUser, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// GET /children
pub async fn list_children(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChildResponse>>> {
    let service = SupervisionService::new(state.service_context());
    Ok(Json(service.list_children(auth.user_id).await?))
}

/// PUT /children/{child_id}/surveillance
pub async fn update_surveillance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(child_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateSurveillanceRequest>,
) -> ApiResult<Json<ChildResponse>> {
    let child_id = parse_id(&child_id, "child_id")?;

    let service = SupervisionService::new(state.service_context());
    let child = service
        .set_surveillance_level(auth.user_id, child_id, request)
        .await?;
    Ok(Json(child))
}

/// DELETE /children/{child_id}
pub async fn unlink_child(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(child_id): Path<String>,
) -> ApiResult<NoContent> {
    let child_id = parse_id(&child_id, "child_id")?;

    SupervisionService::new(state.service_context())
        .unlink(auth.user_id, child_id)
        .await?;
    Ok(NoContent)
}

/// GET /children/{child_id}/contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(child_id): Path<String>,
) -> ApiResult<Json<Vec<ContactResponse>>> {
    let child_id = parse_id(&child_id, "child_id")?;

    let service = ContactService::new(state.service_context());
    Ok(Json(service.list_contacts(auth.user_id, child_id).await?))
}

/// DELETE /children/{child_id}/contacts/{contact_id}
pub async fn revoke_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((child_id, contact_id)): Path<(String, String)>,
) -> ApiResult<NoContent> {
    let child_id = parse_id(&child_id, "child_id")?;
    let contact_id = parse_id(&contact_id, "contact_id")?;

    ContactService::new(state.service_context())
        .revoke_contact(auth.user_id, child_id, contact_id)
        .await?;
    Ok(NoContent)
}
