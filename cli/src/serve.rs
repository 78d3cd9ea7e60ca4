#![deny(missing_docs)]

//! # Serve Command
//!
//! Validates the features tree, prints the report, and only when every
//! endpoint passed binds the routes and runs the HTTP server.

use crate::error::CliResult;
use crate::features;
use crate::server::build_server;
use crate::settings::ConfigArgs;
use std::net::TcpListener;
use trellis_core::{
    bind_routes, print_report, validate_features, AppError, FrameworkConfig, HandlerRegistry,
    PipelineStats, RouteBinder, RouteTable,
};

/// Arguments for the serve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Features location and routing options.
    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Socket address to listen on.
    #[clap(long, env = "TRELLIS_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,
}

/// Runs the startup gate and returns the bound route table.
///
/// Prints the validation report. Fails without binding anything when any
/// endpoint is invalid.
pub fn prepare(config: &FrameworkConfig, registry: &HandlerRegistry) -> CliResult<RouteTable> {
    let mut stats = PipelineStats::new();
    let pass = validate_features(config, &mut stats)?;

    if !print_report(&pass.results()) {
        stats.log_summary();
        return Err(AppError::ValidationFailed(pass.invalid_count()).into());
    }

    let mut table = RouteTable::new();
    let binder = RouteBinder::new(&config.api_root);
    bind_routes(&pass, registry, &binder, &mut table, &mut stats)?;
    stats.log_summary();
    Ok(table)
}

/// Executes the serve command. Blocks until the server stops.
pub fn execute(args: &ServeArgs) -> CliResult<()> {
    let config = args.config.resolve()?;
    let table = prepare(&config, &features::registry())?;

    let listener = TcpListener::bind(&args.bind)?;
    println!(
        "Serving {} routes on http://{}",
        table.len(),
        listener.local_addr()?
    );

    actix_web::rt::System::new().block_on(async move { build_server(listener, table)?.await })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use trellis_core::{HandlerRequest, HandlerResult, HandlerTable, HttpMethod, Reply};

    async fn list(_req: HandlerRequest) -> HandlerResult {
        Ok(Reply::json(serde_json::json!([])))
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(dir: &Path) -> FrameworkConfig {
        FrameworkConfig {
            features_dir: dir.to_path_buf(),
            ..FrameworkConfig::default()
        }
    }

    #[test]
    fn test_prepare_binds_valid_tree() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "hello/hello/hello.contract.yaml",
            "contract:\n  routes:\n    \"GET /hello\": list\n",
        );
        write(dir.path(), "hello/hello/hello.logic.rs", "pub async fn list() {}\n");

        let registry = HandlerRegistry::new()
            .with_endpoint("hello", "hello", HandlerTable::new().with("list", list));
        let table = prepare(&config(dir.path()), &registry).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.find(HttpMethod::Get, "/api/hello").is_some());
    }

    #[test]
    fn test_prepare_refuses_invalid_tree() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "hello/hello/hello.contract.yaml",
            "contract:\n  routes:\n    \"GET /hello\": list\n",
        );
        write(dir.path(), "hello/hello/hello.logic.rs", "pub async fn list_all() {}\n");

        let err = prepare(&config(dir.path()), &HandlerRegistry::new()).unwrap_err();
        assert!(matches!(err, CliError::Core(AppError::ValidationFailed(1))));
    }
}
