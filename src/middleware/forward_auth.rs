//! Forward-auth gate: ask the authentication service about every request
//! before the rest of the pipeline sees it.
//!
//! - allow: identity vars go into the request extensions, then `next`
//! - explicit rejection: the auth service's own response goes back as-is
//! - success without identity / transport failure: `AppError` (5xx)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::services::forward_auth::{Denial, HttpInbound, RequestVars, Verdict};
use crate::state::AppState;

/// Put every route of `router` behind forward-auth.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::forward_auth::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, forward_auth_middleware))
}

async fn forward_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let verify_req = state.forward_auth.prepare(&HttpInbound::new(&req));

    // A client disconnect drops this future, which aborts the outbound call.
    let verdict = match state.forward_auth.verify(verify_req).await {
        Ok(verdict) => verdict,
        Err(err) => {
            tracing::warn!(error = %err, "forward auth verification failed");
            return Err(err.into());
        }
    };

    match verdict {
        Verdict::Allow(identity) => {
            tracing::info!(user = %identity.user, "forward auth allowed");

            let extensions = req.extensions_mut();
            match extensions.get_mut::<RequestVars>() {
                Some(vars) => identity.apply_to(vars),
                None => {
                    let mut vars = RequestVars::new();
                    identity.apply_to(&mut vars);
                    extensions.insert(vars);
                }
            }
            extensions.insert(identity);

            Ok(next.run(req).await)
        }
        Verdict::Deny(Denial::Mirror(mirror)) => {
            tracing::debug!(status = %mirror.status, "forward auth denied, mirroring response");
            Ok(mirror.into_response())
        }
        Verdict::Deny(Denial::InvalidIdentity) => {
            tracing::warn!("authentication service answered success without a valid user");
            Err(AppError::InvalidIdentity)
        }
    }
}
