use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::services::forward_auth::{Identity, RequestVars};
use crate::state::AppState;

/// Extractor for the per-request variable namespace.
/// Assumes the forward-auth middleware already put `RequestVars` into
/// request.extensions(); answers 401 otherwise (middleware not applied).
pub struct AuthVarsExtractor(pub RequestVars);

impl FromRequestParts<AppState> for AuthVarsExtractor
where
    AppState: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestVars>()
            .cloned()
            .map(AuthVarsExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Typed identity facts, same contract as `AuthVarsExtractor`.
pub struct IdentityExtractor(pub Identity);

impl FromRequestParts<AppState> for IdentityExtractor
where
    AppState: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(IdentityExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
