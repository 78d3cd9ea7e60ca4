//! Audit trail of todo lifecycle events.

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Once;
use trellis_core::handler::{HandlerError, HandlerRequest, HandlerResult, Reply};
use trellis_core::platform::events;

const CAPACITY: usize = 100;

static TRAIL: Mutex<VecDeque<Value>> = Mutex::new(VecDeque::new());
static SUBSCRIBED: Once = Once::new();

fn record(event: &str, todo: &Value) {
    let mut trail = TRAIL.lock();
    if trail.len() == CAPACITY {
        trail.pop_front();
    }
    trail.push_back(json!({ "event": event, "todo": todo }));
}

/// Attaches the audit listeners to the process event bus. Idempotent.
pub(crate) fn subscribe() {
    SUBSCRIBED.call_once(|| {
        let bus = events::bus();
        bus.on("todo.created", |todo| record("todo.created", todo));
        bus.on("todo.deleted", |todo| record("todo.deleted", todo));
    });
}

/// Recorded events, oldest first. `?limit=N` keeps only the newest `N`.
pub async fn recent(req: HandlerRequest) -> HandlerResult {
    let limit = match req.query.get("limit") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| HandlerError::BadRequest(format!("invalid limit `{}`", raw)))?,
        None => CAPACITY,
    };

    let trail = TRAIL.lock();
    let skip = trail.len().saturating_sub(limit);
    let newest: Vec<&Value> = trail.iter().skip(skip).collect();
    Ok(Reply::json(json!(newest)))
}
