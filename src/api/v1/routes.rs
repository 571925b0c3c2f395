/*
 * Responsibility
 * - URL structure of v1 (everything here sits behind forward-auth)
 * - The forward-auth layer itself is applied by app::build_router
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::whoami::whoami;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/whoami", get(whoami))
}
