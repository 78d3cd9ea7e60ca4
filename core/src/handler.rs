#![deny(missing_docs)]

//! # Handler Model
//!
//! Request/reply types seen by feature handlers, and the explicit dispatch
//! tables that map contract function names to compiled handler functions.
//!
//! A handler is any `Fn(HandlerRequest) -> impl Future<Output = HandlerResult>`,
//! which includes plain `pub async fn` items:
//!
//! ```
//! use trellis_core::handler::{HandlerRegistry, HandlerRequest, HandlerResult, HandlerTable, Reply};
//!
//! async fn list(_req: HandlerRequest) -> HandlerResult {
//!     Ok(Reply::json(serde_json::json!(["a", "b"])))
//! }
//!
//! let registry = HandlerRegistry::new()
//!     .with_endpoint("hello", "hello", HandlerTable::new().with("list", list));
//! assert!(registry.table("hello", "hello").unwrap().get("list").is_some());
//! ```

use derive_more::Display;
use futures_util::future::{FutureExt, LocalBoxFuture};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

/// A request as handed to a feature handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerRequest {
    /// HTTP method.
    pub method: String,
    /// Request path as received.
    pub path: String,
    /// Values captured by `:param` segments.
    pub params: HashMap<String, String>,
    /// Query string pairs.
    pub query: HashMap<String, String>,
    /// JSON body, `Null` when the request had none.
    pub body: Value,
}

impl HandlerRequest {
    /// A bodyless request.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Adds a path parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// A path parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A path parameter, or `400` when absent.
    pub fn require_param(&self, name: &str) -> Result<&str, HandlerError> {
        self.param(name)
            .ok_or_else(|| HandlerError::BadRequest(format!("missing path parameter `{}`", name)))
    }

    /// Deserializes the body, mapping failures to `400`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.body.clone()).map_err(HandlerError::from)
    }
}

/// A successful handler outcome: a status and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// JSON body; `None` sends an empty body.
    pub body: Option<Value>,
}

impl Reply {
    /// `200 OK` with a JSON body.
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    /// `201 Created` with a JSON body.
    pub fn created(body: Value) -> Self {
        Self {
            status: 201,
            body: Some(body),
        }
    }

    /// `204 No Content`.
    pub fn empty() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    /// Overrides the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Failures a handler reports, converted to structured error responses.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Malformed input.
    #[display("Bad Request: {_0}")]
    BadRequest(String),

    /// Unknown resource.
    #[display("Not Found: {_0}")]
    NotFound(String),

    /// State conflict.
    #[display("Conflict: {_0}")]
    Conflict(String),

    /// Anything else, including panics inside the handler.
    #[display("Internal Error: {_0}")]
    Internal(String),
}

impl std::error::Error for HandlerError {}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        HandlerError::BadRequest(format!("invalid JSON body: {}", e))
    }
}

impl HandlerError {
    /// HTTP status code for this failure.
    pub fn status(&self) -> u16 {
        match self {
            HandlerError::BadRequest(_) => 400,
            HandlerError::NotFound(_) => 404,
            HandlerError::Conflict(_) => 409,
            HandlerError::Internal(_) => 500,
        }
    }

    /// The message without its category prefix.
    pub fn message(&self) -> &str {
        match self {
            HandlerError::BadRequest(m)
            | HandlerError::NotFound(m)
            | HandlerError::Conflict(m)
            | HandlerError::Internal(m) => m,
        }
    }

    /// `{"error": {"status": .., "message": ..}}`
    pub fn to_body(&self) -> Value {
        json!({
            "error": {
                "status": self.status(),
                "message": self.message(),
            }
        })
    }
}

/// Result type returned by handlers.
pub type HandlerResult = Result<Reply, HandlerError>;

/// A callable request handler.
pub trait Handler: Send + Sync + 'static {
    /// Starts handling `req`.
    fn call(&self, req: HandlerRequest) -> LocalBoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(HandlerRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + 'static,
{
    fn call(&self, req: HandlerRequest) -> LocalBoxFuture<'static, HandlerResult> {
        (self)(req).boxed_local()
    }
}

/// A named, type-erased handler, cheap to clone across router workers.
#[derive(Clone)]
pub struct BoundHandler {
    name: Arc<str>,
    inner: Arc<dyn Handler>,
}

impl fmt::Debug for BoundHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHandler").field("name", &self.name).finish()
    }
}

impl BoundHandler {
    /// Wraps `handler` under `name`.
    pub fn new(name: &str, handler: impl Handler) -> Self {
        Self {
            name: Arc::from(name),
            inner: Arc::new(handler),
        }
    }

    /// The function name the handler was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the handler. Every failure, including a panic, comes back as a
    /// [`HandlerError`] and is logged here.
    pub async fn invoke(&self, req: HandlerRequest) -> HandlerResult {
        let started = catch_unwind(AssertUnwindSafe(|| self.inner.call(req)));
        let outcome = match started {
            Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
            Err(panic) => Err(panic),
        };

        let result = outcome.unwrap_or_else(|panic| {
            Err(HandlerError::Internal(format!(
                "handler `{}` panicked: {}",
                self.name,
                panic_message(panic.as_ref())
            )))
        });

        if let Err(e) = &result {
            if e.status() >= 500 {
                error!(handler = %self.name, error = %e, "handler failed");
            } else {
                warn!(handler = %self.name, error = %e, "handler rejected request");
            }
        }
        result
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The export table of one endpoint: function name to handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    handlers: IndexMap<String, BoundHandler>,
}

impl HandlerTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`.
    pub fn with(mut self, name: &str, handler: impl Handler) -> Self {
        self.handlers
            .insert(name.to_string(), BoundHandler::new(name, handler));
        self
    }

    /// Looks up a handler by function name.
    pub fn get(&self, name: &str) -> Option<&BoundHandler> {
        self.handlers.get(name)
    }

    /// Registered function names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Export tables for every compiled endpoint, keyed by `(feature, endpoint)`.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    tables: IndexMap<(String, String), HandlerTable>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the table of `feature/endpoint`.
    pub fn with_endpoint(mut self, feature: &str, endpoint: &str, table: HandlerTable) -> Self {
        self.tables
            .insert((feature.to_string(), endpoint.to_string()), table);
        self
    }

    /// The table of `feature/endpoint`, if compiled in.
    pub fn table(&self, feature: &str, endpoint: &str) -> Option<&HandlerTable> {
        self.tables
            .get(&(feature.to_string(), endpoint.to_string()))
    }

    /// Registered `(feature, endpoint)` pairs.
    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables
            .keys()
            .map(|(feature, endpoint)| (feature.as_str(), endpoint.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    async fn echo(req: HandlerRequest) -> HandlerResult {
        Ok(Reply::json(json!({ "id": req.require_param("id")? })))
    }

    async fn missing(_req: HandlerRequest) -> HandlerResult {
        Err(HandlerError::NotFound("no such todo".into()))
    }

    async fn explode(_req: HandlerRequest) -> HandlerResult {
        panic!("boom");
    }

    #[tokio::test]
    async fn test_invoke_ok() {
        let handler = BoundHandler::new("echo", echo);
        let reply = handler
            .invoke(HandlerRequest::new("GET", "/x/7").with_param("id", "7"))
            .await
            .unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, Some(json!({ "id": "7" })));
    }

    #[tokio::test]
    async fn test_invoke_error_passes_through() {
        let handler = BoundHandler::new("missing", missing);
        let err = handler.invoke(HandlerRequest::default()).await.unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(
            err.to_body(),
            json!({ "error": { "status": 404, "message": "no such todo" } })
        );
    }

    #[tokio::test]
    async fn test_missing_param_is_bad_request() {
        let handler = BoundHandler::new("echo", echo);
        let err = handler.invoke(HandlerRequest::default()).await.unwrap_err();
        assert!(matches!(err, HandlerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let handler = BoundHandler::new("explode", explode);
        let err = handler.invoke(HandlerRequest::default()).await.unwrap_err();
        assert_eq!(err.status(), 500);
        assert!(err.message().contains("boom"));
        assert!(err.message().contains("explode"));
    }

    #[test]
    fn test_json_body_decoding() {
        #[derive(Deserialize)]
        struct Input {
            title: String,
        }

        let req = HandlerRequest::new("POST", "/todos").with_body(json!({ "title": "x" }));
        let input: Input = req.json().unwrap();
        assert_eq!(input.title, "x");

        let bad = HandlerRequest::new("POST", "/todos").with_body(json!(42));
        assert!(matches!(bad.json::<Input>(), Err(HandlerError::BadRequest(_))));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = HandlerRegistry::new().with_endpoint(
            "todo",
            "items",
            HandlerTable::new().with("show", echo).with("missing", missing),
        );
        let table = registry.table("todo", "items").unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["show", "missing"]);
        assert_eq!(table.get("show").unwrap().name(), "show");
        assert!(registry.table("todo", "audit").is_none());
        assert_eq!(registry.endpoints().collect::<Vec<_>>(), vec![("todo", "items")]);
    }

    #[test]
    fn test_reply_constructors() {
        assert_eq!(Reply::empty().status, 204);
        assert_eq!(Reply::created(json!({})).status, 201);
        assert_eq!(Reply::json(json!(1)).with_status(202).status, 202);
    }
}
