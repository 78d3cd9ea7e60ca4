#![deny(missing_docs)]

//! # Actix Adapter
//!
//! Mounts a bound [`RouteTable`] into an actix-web `App`. Routes sharing a
//! path become one resource with one route per method. Every handler outcome,
//! including failures, is turned into a response here.

use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{get, web, App, HttpRequest, HttpResponse, HttpServer, Responder, Route};
use std::collections::HashMap;
use std::net::TcpListener;
use tracing::debug;
use trellis_core::binder::router_path;
use trellis_core::{BoundHandler, HandlerError, HandlerRequest, HttpMethod, Reply, RouteTable};

/// Fixed liveness probe outside the contract system.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Catch-all for unmatched requests.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    error_response(&HandlerError::NotFound(format!(
        "no route for {} {}",
        req.method(),
        req.path()
    )))
}

/// Registers every route of `table` on `cfg`.
pub fn mount(cfg: &mut web::ServiceConfig, table: &RouteTable) {
    for (path, routes) in table.by_path() {
        let mut resource = web::resource(router_path(path));
        for registered in routes {
            let handler = registered.handler.clone();
            resource = resource.route(method_route(registered.method).to(
                move |req: HttpRequest, body: web::Bytes| dispatch(handler.clone(), req, body),
            ));
        }
        cfg.service(resource);
    }
}

/// Builds the application server over `listener`.
pub fn build_server(listener: TcpListener, table: RouteTable) -> std::io::Result<Server> {
    Ok(HttpServer::new(move || {
        let table = table.clone();
        App::new()
            .service(health_check)
            .configure(move |cfg| mount(cfg, &table))
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run())
}

fn method_route(method: HttpMethod) -> Route {
    match method {
        HttpMethod::Get => web::get(),
        HttpMethod::Post => web::post(),
        HttpMethod::Put => web::put(),
        HttpMethod::Delete => web::delete(),
        HttpMethod::Patch => web::patch(),
    }
}

async fn dispatch(handler: BoundHandler, req: HttpRequest, body: web::Bytes) -> HttpResponse {
    debug!(handler = handler.name(), method = %req.method(), path = req.path(), "dispatching");

    let request = match to_handler_request(&req, &body) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match handler.invoke(request).await {
        Ok(reply) => reply_response(reply),
        Err(e) => error_response(&e),
    }
}

/// Converts an actix request into the framework's request shape.
pub fn to_handler_request(req: &HttpRequest, body: &[u8]) -> Result<HandlerRequest, HandlerError> {
    let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .map_err(|e| HandlerError::BadRequest(format!("invalid query string: {}", e)))?
        .into_inner();

    let body = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(body)?
    };

    let params = req
        .match_info()
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    Ok(HandlerRequest {
        method: req.method().to_string(),
        path: req.path().to_string(),
        params,
        query,
        body,
    })
}

fn reply_response(reply: Reply) -> HttpResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match reply.body {
        Some(body) => HttpResponse::build(status).json(body),
        None => HttpResponse::build(status).finish(),
    }
}

/// The structured error body with the matching status code.
pub fn error_response(error: &HandlerError) -> HttpResponse {
    let status = StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(error.to_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::{json, Value};
    use trellis_core::binder::RouteSink;
    use trellis_core::{HandlerResult, RegisteredRoute};

    async fn show(req: HandlerRequest) -> HandlerResult {
        let id = req.require_param("id")?;
        if id == "0" {
            return Err(HandlerError::NotFound(format!("todo {} not found", id)));
        }
        Ok(Reply::json(json!({ "id": id, "verbose": req.query.get("verbose") })))
    }

    async fn create(req: HandlerRequest) -> HandlerResult {
        Ok(Reply::created(req.body))
    }

    async fn crash(_req: HandlerRequest) -> HandlerResult {
        panic!("handler bug")
    }

    fn route(method: HttpMethod, path: &str, handler: BoundHandler) -> RegisteredRoute {
        RegisteredRoute {
            method,
            path: path.to_string(),
            handler,
            feature: "todo".into(),
            endpoint: "items".into(),
        }
    }

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table.register(route(
            HttpMethod::Get,
            "/api/todos/:id",
            BoundHandler::new("show", show),
        ));
        table.register(route(
            HttpMethod::Post,
            "/api/todos",
            BoundHandler::new("create", create),
        ));
        table.register(route(
            HttpMethod::Delete,
            "/api/todos/:id",
            BoundHandler::new("crash", crash),
        ));
        table
    }

    macro_rules! app {
        () => {{
            let table = table();
            test::init_service(
                App::new()
                    .service(health_check)
                    .configure(move |cfg| mount(cfg, &table))
                    .default_service(web::to(not_found)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert_eq!(body, "OK");
    }

    #[actix_web::test]
    async fn test_path_params_and_query_reach_handler() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/todos/7?verbose=yes")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "id": "7", "verbose": "yes" }));
    }

    #[actix_web::test]
    async fn test_handler_error_is_structured() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/todos/0").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["status"], 404);
        assert_eq!(body["error"]["message"], "todo 0 not found");
    }

    #[actix_web::test]
    async fn test_json_body_and_created_status() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/todos")
            .set_json(json!({ "title": "write docs" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], "write docs");
    }

    #[actix_web::test]
    async fn test_unparsable_body_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_empty_body_is_null() {
        let app = app!();
        let req = test::TestRequest::post().uri("/api/todos").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, Value::Null);
    }

    #[actix_web::test]
    async fn test_panicking_handler_is_internal_error() {
        let app = app!();
        let req = test::TestRequest::delete().uri("/api/todos/3").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["status"], 500);
    }

    #[actix_web::test]
    async fn test_unknown_route_is_structured_404() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["status"], 404);
    }

    #[actix_web::test]
    async fn test_unbound_method_on_known_path_is_not_ok() {
        let app = app!();
        let req = test::TestRequest::put().uri("/api/todos/3").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }

    #[actix_web::test]
    async fn test_build_server_start_stop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server = build_server(listener, table()).unwrap();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        handle.stop(true).await;
    }
}
