//! Internal moderation handlers
//!
//! Entry points for other services to queue a stored child message for
//! scanning. Authenticated with the internal key, answered with 202.

use axum::{extract::State, Json};
use safechat_service::dto::{ScanAcceptedResponse, ScanImageRequest, ScanTextRequest};
use safechat_service::ScanService;

use crate::extractors::{InternalCaller, ValidatedJson};
use crate::response::{Accepted, ApiResult};
use crate::state::AppState;

/// POST /internal/moderation/scan-text
pub async fn scan_text(
    State(state): State<AppState>,
    _caller: InternalCaller,
    ValidatedJson(request): ValidatedJson<ScanTextRequest>,
) -> ApiResult<Accepted<Json<ScanAcceptedResponse>>> {
    let service = ScanService::new(state.service_context());
    Ok(Accepted(Json(service.submit_text(request).await?)))
}

/// POST /internal/moderation/scan-image
pub async fn scan_image(
    State(state): State<AppState>,
    _caller: InternalCaller,
    ValidatedJson(request): ValidatedJson<ScanImageRequest>,
) -> ApiResult<Accepted<Json<ScanAcceptedResponse>>> {
    let service = ScanService::new(state.service_context());
    Ok(Accepted(Json(service.submit_image(request).await?)))
}
