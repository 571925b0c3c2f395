/*
 * Responsibility
 * - GET /api/v1/whoami
 * - Echo the variable namespace filled in by forward-auth (the stage after the gate)
 */
use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::api::v1::extractors::{AuthVarsExtractor, IdentityExtractor};

pub async fn whoami(
    AuthVarsExtractor(vars): AuthVarsExtractor,
    IdentityExtractor(identity): IdentityExtractor,
) -> impl IntoResponse {
    tracing::debug!(user = %identity.user, "whoami");
    Json(json!({ "vars": vars, "identity": identity }))
}
