#![deny(missing_docs)]

//! # Route Binding
//!
//! Turns the routes of a validated contract into router registrations. Each
//! contract function name is resolved against the endpoint's compiled
//! [`HandlerTable`]; the contract path is prefixed with the API root; the
//! result is handed to a [`RouteSink`].
//!
//! Problems here skip a single route and never abort: validation has already
//! gated startup, so anything found now is drift between the two passes. A
//! route whose method and path are already taken, possibly by another
//! endpoint, is skipped too: the router would only ever serve the first.

use crate::contract::{Contract, HttpMethod, RouteKey};
use crate::discovery::FeatureEndpoint;
use crate::handler::{BoundHandler, HandlerTable};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// A route ready for the router.
#[derive(Debug, Clone)]
pub struct RegisteredRoute {
    /// HTTP method.
    pub method: HttpMethod,
    /// Externally visible path, `:param` syntax (e.g. `/api/todos/:id`).
    pub path: String,
    /// The resolved handler.
    pub handler: BoundHandler,
    /// Owning feature.
    pub feature: String,
    /// Owning endpoint.
    pub endpoint: String,
}

impl RegisteredRoute {
    /// The path in `{param}` syntax, as actix-style routers expect.
    pub fn router_path(&self) -> String {
        router_path(&self.path)
    }
}

/// The router seam. Implementors accept `(method, path, handler)` registrations.
pub trait RouteSink {
    /// Registers one route.
    fn register(&mut self, route: RegisteredRoute);

    /// The route already serving `method` on `path`, if any. Paths that only
    /// differ in parameter names are the same route.
    fn registered(&self, method: HttpMethod, path: &str) -> Option<&RegisteredRoute>;
}

/// Router-agnostic collection of registered routes.
///
/// Built once at startup and mounted into each router instance; read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RegisteredRoute>,
}

impl RouteTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes grouped by path, preserving first-registration order, so a
    /// router can mount one resource per path with one route per method.
    pub fn by_path(&self) -> IndexMap<&str, Vec<&RegisteredRoute>> {
        let mut grouped: IndexMap<&str, Vec<&RegisteredRoute>> = IndexMap::new();
        for route in &self.routes {
            grouped.entry(route.path.as_str()).or_default().push(route);
        }
        grouped
    }

    /// Looks up a route by method and external path.
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<&RegisteredRoute> {
        self.routes
            .iter()
            .find(|r| r.method == method && r.path == path)
    }
}

impl RouteSink for RouteTable {
    fn register(&mut self, route: RegisteredRoute) {
        self.routes.push(route);
    }

    fn registered(&self, method: HttpMethod, path: &str) -> Option<&RegisteredRoute> {
        let shape = route_shape(path);
        self.routes
            .iter()
            .find(|r| r.method == method && route_shape(&r.path) == shape)
    }
}

/// Outcome counts of binding one endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindOutcome {
    /// Routes handed to the sink.
    pub registered: usize,
    /// Routes skipped (malformed key, unsupported method, unresolved function
    /// or a method and path that is already bound).
    pub skipped: usize,
}

/// Binds contract routes under a fixed API root.
#[derive(Debug, Clone)]
pub struct RouteBinder {
    api_root: String,
}

impl RouteBinder {
    /// A binder for `api_root` (leading/trailing slashes are ignored).
    pub fn new(api_root: &str) -> Self {
        Self {
            api_root: api_root.trim_matches('/').to_string(),
        }
    }

    /// `/<api_root><path>`, identical for every endpoint shape.
    ///
    /// ```
    /// use trellis_core::binder::RouteBinder;
    ///
    /// let binder = RouteBinder::new("api");
    /// assert_eq!(binder.external_path("/todos/:id"), "/api/todos/:id");
    /// assert_eq!(binder.external_path("/"), "/api");
    /// ```
    pub fn external_path(&self, path: &str) -> String {
        let path = path.trim();
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        if self.api_root.is_empty() {
            return path;
        }
        if path == "/" {
            return format!("/{}", self.api_root);
        }
        format!("/{}{}", self.api_root, path)
    }

    /// Resolves and registers every route of one validated endpoint.
    ///
    /// `table` is the endpoint's compiled export table; `None` means the
    /// endpoint has no compiled handlers, which skips every route.
    pub fn bind_endpoint(
        &self,
        endpoint: &FeatureEndpoint,
        contract: &Contract,
        table: Option<&HandlerTable>,
        sink: &mut dyn RouteSink,
    ) -> BindOutcome {
        let mut outcome = BindOutcome::default();

        for (key, function) in &contract.routes {
            let route = match RouteKey::parse(key) {
                Ok(route) => route,
                Err(reason) => {
                    error!(endpoint = %endpoint.id(), route = %key, %reason, "malformed route key");
                    outcome.skipped += 1;
                    continue;
                }
            };

            let Some(method) = route.http_method() else {
                warn!(
                    endpoint = %endpoint.id(),
                    route = %key,
                    method = %route.method,
                    "unsupported HTTP method, route skipped"
                );
                outcome.skipped += 1;
                continue;
            };

            let Some(handler) = table.and_then(|t| t.get(function)) else {
                error!(
                    endpoint = %endpoint.id(),
                    route = %key,
                    function = %function,
                    "handler function is not registered, route skipped"
                );
                outcome.skipped += 1;
                continue;
            };

            let path = self.external_path(&route.path);
            if let Some(existing) = sink.registered(method, &path) {
                error!(
                    endpoint = %endpoint.id(),
                    route = %key,
                    bound_by = %format!("{}/{}", existing.feature, existing.endpoint),
                    bound_path = %existing.path,
                    "route already bound, skipped"
                );
                outcome.skipped += 1;
                continue;
            }

            sink.register(RegisteredRoute {
                method,
                path,
                handler: handler.clone(),
                feature: endpoint.feature.clone(),
                endpoint: endpoint.endpoint.clone(),
            });
            outcome.registered += 1;
        }

        info!(
            endpoint = %endpoint.id(),
            registered = outcome.registered,
            skipped = outcome.skipped,
            "routes bound"
        );
        outcome
    }
}

/// Converts `:param` segments to `{param}`.
///
/// ```
/// use trellis_core::binder::router_path;
///
/// assert_eq!(router_path("/api/todos/:id"), "/api/todos/{id}");
/// ```
pub fn router_path(path: &str) -> String {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    let re = PARAM_RE
        .get_or_init(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex constant"));
    re.replace_all(path, "{$1}").into_owned()
}

/// `path` with every `:param` name erased, so `/todos/:id` and `/todos/:key`
/// compare equal.
fn route_shape(path: &str) -> String {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    let re = PARAM_RE
        .get_or_init(|| Regex::new(r":[A-Za-z_][A-Za-z0-9_]*").expect("Invalid regex constant"));
    re.replace_all(path.trim_end_matches('/'), ":").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerRequest, HandlerResult, Reply};
    use std::path::PathBuf;

    async fn ok(_req: HandlerRequest) -> HandlerResult {
        Ok(Reply::empty())
    }

    fn endpoint() -> FeatureEndpoint {
        endpoint_named("todo", "items")
    }

    fn endpoint_named(feature: &str, name: &str) -> FeatureEndpoint {
        FeatureEndpoint {
            feature: feature.into(),
            endpoint: name.into(),
            contract_path: PathBuf::from(format!("{}.contract.yaml", name)),
            handler_path: PathBuf::from(format!("{}.logic.rs", name)),
        }
    }

    #[test]
    fn test_binds_all_resolved_routes() {
        let contract = Contract::new()
            .with_route("GET /todos", "list")
            .with_route("POST /todos", "create")
            .with_route("GET /todos/:id", "show");
        let table = HandlerTable::new()
            .with("list", ok)
            .with("create", ok)
            .with("show", ok);

        let mut routes = RouteTable::new();
        let outcome = RouteBinder::new("api").bind_endpoint(
            &endpoint(),
            &contract,
            Some(&table),
            &mut routes,
        );

        assert_eq!(outcome, BindOutcome { registered: 3, skipped: 0 });
        let show = routes.find(HttpMethod::Get, "/api/todos/:id").unwrap();
        assert_eq!(show.handler.name(), "show");
        assert_eq!(show.router_path(), "/api/todos/{id}");

        let grouped = routes.by_path();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["/api/todos"].len(), 2);
    }

    #[test]
    fn test_unresolved_function_skips_only_that_route() {
        let contract = Contract::new()
            .with_route("GET /todos", "list")
            .with_route("DELETE /todos/:id", "remove");
        let table = HandlerTable::new().with("list", ok);

        let mut routes = RouteTable::new();
        let outcome = RouteBinder::new("api").bind_endpoint(
            &endpoint(),
            &contract,
            Some(&table),
            &mut routes,
        );
        assert_eq!(outcome, BindOutcome { registered: 1, skipped: 1 });
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_unsupported_method_and_malformed_key_are_skipped() {
        let contract = Contract::new()
            .with_route("OPTIONS /todos", "list")
            .with_route("/todos", "list")
            .with_route("get /todos", "list");
        let table = HandlerTable::new().with("list", ok);

        let mut routes = RouteTable::new();
        let outcome = RouteBinder::new("api").bind_endpoint(
            &endpoint(),
            &contract,
            Some(&table),
            &mut routes,
        );
        assert_eq!(outcome, BindOutcome { registered: 1, skipped: 2 });
        assert_eq!(routes.routes()[0].method, HttpMethod::Get);
    }

    #[test]
    fn test_same_method_and_path_binds_once() {
        let contract = Contract::new()
            .with_route("GET /todos", "list")
            .with_route("get /todos", "other")
            .with_route("GET /todos/:id", "show")
            .with_route("GET /todos/:key", "other");
        let table = HandlerTable::new()
            .with("list", ok)
            .with("show", ok)
            .with("other", ok);

        let mut routes = RouteTable::new();
        let outcome = RouteBinder::new("api").bind_endpoint(
            &endpoint(),
            &contract,
            Some(&table),
            &mut routes,
        );
        assert_eq!(outcome, BindOutcome { registered: 2, skipped: 2 });
        let names: Vec<_> = routes.routes().iter().map(|r| r.handler.name()).collect();
        assert_eq!(names, vec!["list", "show"]);
    }

    #[test]
    fn test_route_taken_by_another_endpoint_is_skipped() {
        let binder = RouteBinder::new("api");
        let table = HandlerTable::new().with("list", ok);
        let mut routes = RouteTable::new();

        let first = binder.bind_endpoint(
            &endpoint_named("a", "one"),
            &Contract::new().with_route("GET /x", "list"),
            Some(&table),
            &mut routes,
        );
        let second = binder.bind_endpoint(
            &endpoint_named("b", "two"),
            &Contract::new()
                .with_route("GET /x", "list")
                .with_route("POST /x", "list"),
            Some(&table),
            &mut routes,
        );

        assert_eq!(first, BindOutcome { registered: 1, skipped: 0 });
        assert_eq!(second, BindOutcome { registered: 1, skipped: 1 });
        let owner = routes.registered(HttpMethod::Get, "/api/x").unwrap();
        assert_eq!(owner.feature, "a");
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn test_missing_table_skips_everything() {
        let contract = Contract::new().with_route("GET /todos", "list");
        let mut routes = RouteTable::new();
        let outcome =
            RouteBinder::new("api").bind_endpoint(&endpoint(), &contract, None, &mut routes);
        assert_eq!(outcome, BindOutcome { registered: 0, skipped: 1 });
        assert!(routes.is_empty());
    }

    #[test]
    fn test_external_path_prefixing() {
        let binder = RouteBinder::new("/api/");
        assert_eq!(binder.external_path("/hello"), "/api/hello");
        assert_eq!(binder.external_path("hello"), "/api/hello");
        assert_eq!(binder.external_path("/"), "/api");
        assert_eq!(binder.external_path("/index"), "/api/index");

        let bare = RouteBinder::new("");
        assert_eq!(bare.external_path("/hello"), "/hello");
        assert_eq!(bare.external_path("/"), "/");
    }

    #[test]
    fn test_router_path_rewrites_every_param() {
        assert_eq!(
            router_path("/api/:feature/items/:item_id"),
            "/api/{feature}/items/{item_id}"
        );
        assert_eq!(router_path("/api/plain"), "/api/plain");
    }
}
