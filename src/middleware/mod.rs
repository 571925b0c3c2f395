/*
 * Responsibility
 * - Public interface of the middleware layer (re-export)
 * - forward_auth::apply(...) for protected routes, http::apply(...) for the edge
 */
pub mod forward_auth;
pub mod http;
