//! Unfinished: idea board. Disabled by the leading underscore on `_drafts`.

use trellis_core::handler::{HandlerRequest, HandlerResult, Reply};

/// Lists ideas.
pub async fn list(_req: HandlerRequest) -> HandlerResult {
    Ok(Reply::json(serde_json::json!([])))
}
