/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - the forward-auth service: immutable target + shared connection pool
 * - Meant to be cloned per request (Arc inside, cheap)
 */
use std::sync::Arc;

use crate::services::forward_auth::ForwardAuth;

#[derive(Clone, Debug)]
pub struct AppState {
    pub forward_auth: Arc<ForwardAuth>,
}

impl AppState {
    pub fn new(forward_auth: Arc<ForwardAuth>) -> Self {
        Self { forward_auth }
    }
}
