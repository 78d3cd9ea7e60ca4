//! Greeting endpoint.

use serde_json::json;
use trellis_core::handler::{HandlerRequest, HandlerResult, Reply};
use trellis_core::platform::logger::{self, Logger};

const LOG: Logger = logger::scoped("hello", "hello");

/// Greets `?name=` (default `world`) in a few languages.
pub async fn list(req: HandlerRequest) -> HandlerResult {
    let name = req
        .query
        .get("name")
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or("world");
    LOG.debug(&format!("greeting {}", name));

    Ok(Reply::json(json!([
        format!("Hello, {}!", name),
        format!("Bonjour, {} !", name),
        format!("Hallo, {}!", name),
    ])))
}
