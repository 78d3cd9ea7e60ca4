#![deny(missing_docs)]

//! # Startup Pipeline
//!
//! Discovery → contract load → validation → (gate) → binding, run
//! sequentially over the discovered endpoints. Counters live in a
//! [`PipelineStats`] passed explicitly through every stage.

use crate::binder::{RouteBinder, RouteSink};
use crate::config::FrameworkConfig;
use crate::contract::{load_contract, Contract};
use crate::discovery::{FeatureDiscoverer, FeatureEndpoint};
use crate::error::{AppError, AppResult};
use crate::handler::HandlerRegistry;
use crate::parser::{analyze_file, SurfaceOptions};
use crate::validation::{validate_endpoint, ValidationResult};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Complete endpoints yielded by discovery.
    pub endpoints_discovered: usize,
    /// Endpoint directories holding only one of the two files.
    pub incomplete_endpoints: usize,
    /// Endpoints whose contract or handler could not be loaded.
    pub load_failures: usize,
    /// Endpoints that passed validation.
    pub endpoints_valid: usize,
    /// Endpoints that failed validation.
    pub endpoints_invalid: usize,
    /// Total validation errors.
    pub errors: usize,
    /// Total validation warnings.
    pub warnings: usize,
    /// Routes handed to the router.
    pub routes_bound: usize,
    /// Routes skipped at bind time.
    pub routes_skipped: usize,
}

impl PipelineStats {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, result: &ValidationResult) {
        if result.is_valid() {
            self.endpoints_valid += 1;
        } else {
            self.endpoints_invalid += 1;
        }
        self.errors += result.errors().len();
        self.warnings += result.warnings().len();
    }

    /// Emits the counters as one structured log line.
    pub fn log_summary(&self) {
        info!(
            discovered = self.endpoints_discovered,
            incomplete = self.incomplete_endpoints,
            load_failures = self.load_failures,
            valid = self.endpoints_valid,
            invalid = self.endpoints_invalid,
            errors = self.errors,
            warnings = self.warnings,
            routes_bound = self.routes_bound,
            routes_skipped = self.routes_skipped,
            "pipeline finished"
        );
    }
}

/// An endpoint after validation, with its contract when it loaded.
#[derive(Debug, Clone)]
pub struct ValidatedEndpoint {
    /// The discovered endpoint.
    pub endpoint: FeatureEndpoint,
    /// The loaded contract; `None` on load failure.
    pub contract: Option<Contract>,
    /// Validation outcome.
    pub result: ValidationResult,
}

/// Outcome of validating every discovered endpoint.
#[derive(Debug, Clone, Default)]
pub struct ValidationPass {
    endpoints: Vec<ValidatedEndpoint>,
}

impl ValidationPass {
    /// Validated endpoints in discovery order.
    pub fn endpoints(&self) -> &[ValidatedEndpoint] {
        &self.endpoints
    }

    /// The per-endpoint results, in discovery order.
    pub fn results(&self) -> Vec<ValidationResult> {
        self.endpoints.iter().map(|e| e.result.clone()).collect()
    }

    /// Number of endpoints that failed.
    pub fn invalid_count(&self) -> usize {
        self.endpoints
            .iter()
            .filter(|e| !e.result.is_valid())
            .count()
    }

    /// True when every endpoint passed (vacuously true when none were found).
    pub fn all_valid(&self) -> bool {
        self.invalid_count() == 0
    }
}

/// Loads and validates one endpoint. Load failures become an invalid result.
pub fn validate_one(
    endpoint: FeatureEndpoint,
    options: &SurfaceOptions,
    stats: &mut PipelineStats,
) -> ValidatedEndpoint {
    let loaded = load_contract(&endpoint.contract_path).and_then(|contract| {
        let surface = analyze_file(&endpoint.handler_path, options)?;
        Ok((contract, surface))
    });

    let (contract, result) = match loaded {
        Ok((contract, surface)) => {
            let result = validate_endpoint(&endpoint, &contract, &surface);
            (Some(contract), result)
        }
        Err(e) => {
            error!(endpoint = %endpoint.id(), error = %e, "failed to load endpoint");
            stats.load_failures += 1;
            let result =
                ValidationResult::load_failure(&endpoint.feature, &endpoint.endpoint, e.to_string());
            (None, result)
        }
    };

    if result.is_valid() {
        debug!(
            endpoint = %endpoint.id(),
            routes = result.route_count(),
            warnings = result.warnings().len(),
            "endpoint valid"
        );
    } else {
        warn!(
            endpoint = %endpoint.id(),
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "endpoint failed validation"
        );
    }

    stats.record(&result);
    ValidatedEndpoint {
        endpoint,
        contract,
        result,
    }
}

/// Discovers and validates every enabled endpoint under `config.features_dir`.
///
/// Only an unreadable features root is an `Err`; everything else is captured
/// in the returned pass.
pub fn validate_features(
    config: &FrameworkConfig,
    stats: &mut PipelineStats,
) -> AppResult<ValidationPass> {
    let options = SurfaceOptions::from_config(config);
    let mut discovered = FeatureDiscoverer::new(config).discover()?;
    let mut pass = ValidationPass::default();

    for endpoint in discovered.by_ref() {
        stats.endpoints_discovered += 1;
        pass.endpoints.push(validate_one(endpoint, &options, stats));
    }
    stats.incomplete_endpoints += discovered.incomplete().len();

    info!(
        endpoints = pass.endpoints.len(),
        invalid = pass.invalid_count(),
        "validation complete"
    );
    Ok(pass)
}

/// Binds the routes of every endpoint in `pass`.
///
/// Refuses with [`AppError::ValidationFailed`] when any endpoint is invalid,
/// so no route is registered from a failed pass.
pub fn bind_routes(
    pass: &ValidationPass,
    registry: &HandlerRegistry,
    binder: &RouteBinder,
    sink: &mut dyn RouteSink,
    stats: &mut PipelineStats,
) -> AppResult<usize> {
    let invalid = pass.invalid_count();
    if invalid > 0 {
        error!(invalid, "refusing to bind routes");
        return Err(AppError::ValidationFailed(invalid));
    }

    let mut total = 0;
    for validated in &pass.endpoints {
        let Some(contract) = &validated.contract else {
            continue;
        };
        let endpoint = &validated.endpoint;
        let table = registry.table(&endpoint.feature, &endpoint.endpoint);
        let outcome = binder.bind_endpoint(endpoint, contract, table, sink);
        stats.routes_bound += outcome.registered;
        stats.routes_skipped += outcome.skipped;
        total += outcome.registered;
    }

    info!(routes = total, "route binding complete");
    Ok(total)
}
