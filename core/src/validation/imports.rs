//! # Import Reconciliation
//!
//! Platform capabilities and external crates are checked separately. Missing
//! declared imports are errors; imports the contract does not mention are
//! warnings. External names compare with `-` folded to `_`.

use super::Findings;
use crate::contract::Contract;
use crate::parser::{HandlerSurface, ImportKind};
use indexmap::IndexSet;

/// Checks declared imports against the handler's `use` items.
pub(crate) fn check_imports(contract: &Contract, surface: &HandlerSurface, findings: &mut Findings) {
    let platform: IndexSet<&str> = surface.imports_of(ImportKind::Platform).collect();
    let external: IndexSet<String> = surface
        .imports_of(ImportKind::External)
        .map(crate_ident)
        .collect();
    let declared_external: IndexSet<String> = contract
        .imports
        .external
        .iter()
        .map(|m| crate_ident(m))
        .collect();

    for capability in &contract.imports.platform {
        if !platform.contains(capability.as_str()) {
            findings.error(format!(
                "Platform capability \"{}\" is declared but not imported",
                capability
            ));
        }
    }

    for module in &contract.imports.external {
        if !external.contains(&crate_ident(module)) {
            findings.error(format!(
                "External module \"{}\" is declared but not imported",
                module
            ));
        }
    }

    for capability in &platform {
        if !contract.imports.platform.contains(*capability) {
            findings.warning(format!(
                "Platform capability \"{}\" is imported but not declared in imports.platform",
                capability
            ));
        }
    }

    for module in surface.imports_of(ImportKind::External) {
        if !declared_external.contains(&crate_ident(module)) {
            findings.warning(format!(
                "External module \"{}\" is imported but not declared in imports.external",
                module
            ));
        }
    }
}

/// `serde-json` and `serde_json` name the same crate.
fn crate_ident(name: &str) -> String {
    name.trim().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{analyze_source, SurfaceOptions};

    fn check(contract: &Contract, code: &str) -> Findings {
        let surface = analyze_source(code, &SurfaceOptions::default());
        let mut findings = Findings::default();
        check_imports(contract, &surface, &mut findings);
        findings
    }

    #[test]
    fn test_matching_imports() {
        let contract = Contract::new()
            .with_platform_import("logger")
            .with_external_import("serde_json");
        let code = "use trellis_core::platform::logger;\nuse serde_json::json;";
        let findings = check(&contract, code);
        assert!(findings.errors.is_empty());
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn test_missing_platform_import_is_error() {
        let contract = Contract::new().with_platform_import("logger");
        let findings = check(&contract, "// use trellis_core::platform::logger;");
        assert_eq!(
            findings.errors,
            vec!["Platform capability \"logger\" is declared but not imported"]
        );
    }

    #[test]
    fn test_missing_external_import_is_error() {
        let contract = Contract::new().with_external_import("reqwest");
        let findings = check(&contract, "use serde_json::json;");
        assert_eq!(
            findings.errors,
            vec!["External module \"reqwest\" is declared but not imported"]
        );
        assert_eq!(
            findings.warnings,
            vec!["External module \"serde_json\" is imported but not declared in imports.external"]
        );
    }

    #[test]
    fn test_undeclared_platform_import_is_warning() {
        let findings = check(&Contract::new(), "use trellis_core::platform::events;");
        assert!(findings.errors.is_empty());
        assert_eq!(findings.warnings.len(), 1);
        assert!(findings.warnings[0].contains("\"events\""));
    }

    #[test]
    fn test_hyphenated_crate_names() {
        let contract = Contract::new().with_external_import("serde-json");
        let findings = check(&contract, "use serde_json::Value;");
        assert!(findings.errors.is_empty());
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn test_name_inside_string_is_not_an_import() {
        let contract = Contract::new().with_external_import("chrono");
        let findings = check(&contract, r#"const S: &str = "use chrono::Utc;";"#);
        assert_eq!(findings.errors.len(), 1);
    }

    #[test]
    fn test_capability_must_be_named_in_the_use_path() {
        let contract = Contract::new().with_platform_import("logger");
        let code = r#"
use trellis_core::platform;

pub fn list() {
    platform::logger::scoped("todo");
}
"#;
        let findings = check(&contract, code);
        assert_eq!(
            findings.errors,
            vec!["Platform capability \"logger\" is declared but not imported"]
        );
        assert!(findings.warnings.is_empty());
    }
}
