//! # Route ↔ Function Reconciliation
//!
//! Forward: every route must name a function the handler exports exactly once.
//! Reverse: exports no route mentions are reported as warnings.
//! Two keys that bind the same method and path are an error.

use super::Findings;
use crate::contract::{Contract, HttpMethod, RouteKey};
use crate::parser::HandlerSurface;
use std::collections::hash_map::{Entry, HashMap};

/// Checks declared routes against the handler's exports.
pub(crate) fn check_routes(contract: &Contract, surface: &HandlerSurface, findings: &mut Findings) {
    let mut bound: HashMap<(HttpMethod, String), &str> = HashMap::new();

    for (key, function) in &contract.routes {
        let route = match RouteKey::parse(key) {
            Ok(route) => route,
            Err(reason) => {
                findings.error(format!("Malformed route key \"{}\": {}", key, reason));
                continue;
            }
        };

        match route.http_method() {
            Some(method) => {
                if route.method != method.as_str() {
                    findings.warning(format!(
                        "Route \"{}\" should spell its method in uppercase (\"{}\")",
                        key, method
                    ));
                }
                match bound.entry((method, route.path)) {
                    Entry::Occupied(first) => findings.error(format!(
                        "Route \"{}\" binds the same method and path as route \"{}\"",
                        key,
                        first.get()
                    )),
                    Entry::Vacant(slot) => {
                        slot.insert(key);
                    }
                }
            }
            None => findings.warning(format!(
                "Route \"{}\" uses unsupported method \"{}\" and will not be registered",
                key, route.method
            )),
        }

        match surface.export_count(function) {
            0 => findings.error(format!(
                "Route \"{}\" is declared but function \"{}\" is not exported",
                key, function
            )),
            1 => {}
            n => findings.error(format!(
                "Function \"{}\" for route \"{}\" is exported {} times",
                function, key, n
            )),
        }
    }

    for name in surface.exported_names() {
        if !contract.declares_function(name) {
            findings.warning(format!(
                "Function \"{}\" is exported but not declared in any route",
                name
            ));
        }
    }
}
