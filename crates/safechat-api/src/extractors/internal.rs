//! Internal caller extractor
//!
//! Guards the moderation entry points with the shared `x-internal-key`
//! header instead of a user token. With no key configured the endpoints
//! refuse every caller.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use safechat_common::AppError;

use crate::response::ApiError;
use crate::state::AppState;

/// Header carrying the internal API key
pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

/// A request that presented the configured internal key
#[derive(Debug, Clone, Copy)]
pub struct InternalCaller;

#[async_trait]
impl<S> FromRequestParts<S> for InternalCaller
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Some(expected) = app_state.config().moderation.internal_api_key.as_deref() else {
            tracing::warn!("INTERNAL_API_KEY not set, internal endpoint refused");
            return Err(AppError::InvalidInternalKey.into());
        };

        let presented = parts
            .headers
            .get(INTERNAL_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if !presented.is_some_and(|key| keys_match(key, expected)) {
            tracing::warn!(uri = %parts.uri, "Rejected internal call");
            return Err(AppError::InvalidInternalKey.into());
        }

        Ok(InternalCaller)
    }
}

/// Compare SHA-256 digests of both keys in constant time, so neither the
/// content nor the length of the configured key leaks through timing.
fn keys_match(presented: &str, expected: &str) -> bool {
    use sha2::{Digest, Sha256};
    use subtle::ConstantTimeEq;

    Sha256::digest(presented.as_bytes())
        .ct_eq(&Sha256::digest(expected.as_bytes()))
        .into()
}
