/*!
 * Authenticated-user extractors
 *
 * Responsibility:
 * - Hand the identity facts / variable namespace set by forward-auth to handlers
 * - The types themselves live in services::forward_auth::identity
 *
 * Public API:
 * - AuthVarsExtractor
 * - IdentityExtractor
 */

mod core;

pub use core::{AuthVarsExtractor, IdentityExtractor};
