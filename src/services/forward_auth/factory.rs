/// Factory: build `ForwardAuth` from the validated settings.
use std::sync::Arc;

use crate::config::ForwardAuthSettings;
use crate::services::forward_auth::{ForwardAuth, ForwardAuthError, HttpVerifyClient, VerifyTarget};

pub fn build_forward_auth(settings: &ForwardAuthSettings) -> Result<Arc<ForwardAuth>, ForwardAuthError> {
    let target = VerifyTarget::new(settings)?;
    let client = HttpVerifyClient::new(settings.timeout)?;

    tracing::info!(
        target_url = %target.url(),
        timeout_seconds = settings.timeout.as_secs_f64(),
        "forward auth configured"
    );

    Ok(Arc::new(ForwardAuth::new(target, Arc::new(client))))
}
