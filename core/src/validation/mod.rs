#![deny(missing_docs)]

//! # Contract Validation
//!
//! Reconciles a [`Contract`] with the [`HandlerSurface`] of its handler module.
//! Three independent checks run on every endpoint, none short-circuiting the
//! others:
//!
//! 1. routes ↔ exported functions
//! 2. declared imports ↔ `use` items
//! 3. published/subscribed events ↔ literal emit/listen calls
//!
//! Forward misses (declared but absent) are errors. Reverse misses (present
//! but undeclared) are warnings and never affect validity.

mod events;
mod imports;
mod routes;

use crate::contract::Contract;
use crate::discovery::FeatureEndpoint;
use crate::parser::HandlerSurface;
use serde::Serialize;

/// Errors and warnings accumulated by the checks, in the order found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    /// Contract violations.
    pub errors: Vec<String>,
    /// Contract drift.
    pub warnings: Vec<String>,
}

impl Findings {
    pub(crate) fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub(crate) fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Outcome of validating one endpoint.
///
/// `valid` always equals `errors.is_empty()`; the fields are private so the
/// two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    feature: String,
    endpoint: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    route_count: usize,
}

impl ValidationResult {
    /// Builds a result from the findings of a completed validation.
    pub fn new(
        feature: impl Into<String>,
        endpoint: impl Into<String>,
        route_count: usize,
        findings: Findings,
    ) -> Self {
        Self {
            feature: feature.into(),
            endpoint: endpoint.into(),
            valid: findings.errors.is_empty(),
            errors: findings.errors,
            warnings: findings.warnings,
            route_count,
        }
    }

    /// An invalid result for an endpoint whose contract or handler could not be loaded.
    pub fn load_failure(
        feature: impl Into<String>,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let findings = Findings {
            errors: vec![message.into()],
            warnings: Vec::new(),
        };
        Self::new(feature, endpoint, 0, findings)
    }

    /// Feature name.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Endpoint name.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `feature/endpoint`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.feature, self.endpoint)
    }

    /// True when no errors were found.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Contract violations.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Contract drift.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of routes the contract declares.
    pub fn route_count(&self) -> usize {
        self.route_count
    }
}

/// Runs all three reconciliations and returns every finding.
pub fn validate_contract(contract: &Contract, surface: &HandlerSurface) -> Findings {
    let mut findings = Findings::default();

    if let Some(first) = surface.syntax_errors.first() {
        findings.error(format!("Handler source has syntax errors: {}", first));
    }

    routes::check_routes(contract, surface, &mut findings);
    imports::check_imports(contract, surface, &mut findings);
    events::check_events(contract, surface, &mut findings);

    findings
}

/// Validates one endpoint and packages the outcome.
pub fn validate_endpoint(
    endpoint: &FeatureEndpoint,
    contract: &Contract,
    surface: &HandlerSurface,
) -> ValidationResult {
    let findings = validate_contract(contract, surface);
    ValidationResult::new(
        endpoint.feature.clone(),
        endpoint.endpoint.clone(),
        contract.routes.len(),
        findings,
    )
}
