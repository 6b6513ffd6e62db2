use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::backend::ExamBackend;
use crate::core::state::AppState;

/// Backend handle scoped to the caller's `Authorization: Bearer` token.
///
/// Requests without the header fall back to the configured service token.
pub(crate) struct ExamClient(pub(crate) Arc<dyn ExamBackend>);

#[async_trait]
impl FromRequestParts<AppState> for ExamClient {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = match parts.headers.get(header::AUTHORIZATION) {
            None => None,
            Some(value) => {
                let token = value
                    .to_str()
                    .ok()
                    .and_then(|raw| raw.strip_prefix("Bearer "))
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;
                Some(token)
            }
        };

        Ok(ExamClient(state.backend().with_bearer(bearer)))
    }
}
