#![deny(missing_docs)]

//! # Validation Report
//!
//! Aggregates per-endpoint results into a single pass/fail decision plus a
//! human-readable (or JSON) summary. Rendering is pure; only
//! [`print_report`] writes to stdout.

use crate::validation::ValidationResult;
use serde::Serialize;
use std::fmt::Write;

/// Aggregate counts over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Endpoints validated.
    pub endpoints: usize,
    /// Endpoints without errors.
    pub passed: usize,
    /// Endpoints with at least one error.
    pub failed: usize,
    /// Total errors.
    pub errors: usize,
    /// Total warnings.
    pub warnings: usize,
    /// True when `failed == 0`.
    pub valid: bool,
}

impl ReportSummary {
    /// Counts `results`.
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let passed = results.iter().filter(|r| r.is_valid()).count();
        let failed = results.len() - passed;
        Self {
            endpoints: results.len(),
            passed,
            failed,
            errors: results.iter().map(|r| r.errors().len()).sum(),
            warnings: results.iter().map(|r| r.warnings().len()).sum(),
            valid: failed == 0,
        }
    }
}

/// Results together with their summary, the shape of the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport<'a> {
    /// Per-endpoint results.
    pub results: &'a [ValidationResult],
    /// Aggregate counts.
    pub summary: ReportSummary,
}

impl<'a> ValidationReport<'a> {
    /// Builds the report for `results`.
    pub fn new(results: &'a [ValidationResult]) -> Self {
        Self {
            results,
            summary: ReportSummary::from_results(results),
        }
    }

    /// True when every endpoint passed.
    pub fn all_valid(&self) -> bool {
        self.summary.valid
    }

    /// Plain-text rendering.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Contract validation");
        let _ = writeln!(out, "===================");

        for result in self.results {
            let status = if result.is_valid() { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "[{}] {} ({} routes)",
                status,
                result.id(),
                result.route_count()
            );
            for error in result.errors() {
                let _ = writeln!(out, "    error: {}", error);
            }
            for warning in result.warnings() {
                let _ = writeln!(out, "    warning: {}", warning);
            }
        }

        let s = &self.summary;
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Summary: {} endpoints, {} passed, {} failed, {} errors, {} warnings",
            s.endpoints, s.passed, s.failed, s.errors, s.warnings
        );
        out
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Prints the text report to stdout and returns whether every endpoint passed.
pub fn print_report(results: &[ValidationResult]) -> bool {
    let report = ValidationReport::new(results);
    print!("{}", report.to_text());
    report.all_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Findings;
    use pretty_assertions::assert_eq;

    fn results() -> Vec<ValidationResult> {
        vec![
            ValidationResult::new("hello", "hello", 1, Findings::default()),
            ValidationResult::new(
                "todo",
                "items",
                2,
                Findings {
                    errors: vec![
                        "Route \"GET /todos\" is declared but function \"list\" is not exported"
                            .into(),
                    ],
                    warnings: vec![
                        "Function \"list_all\" is exported but not declared in any route".into(),
                    ],
                },
            ),
        ]
    }

    #[test]
    fn test_text_report() {
        let results = results();
        let report = ValidationReport::new(&results);
        let expected = "\
Contract validation
===================
[PASS] hello/hello (1 routes)
[FAIL] todo/items (2 routes)
    error: Route \"GET /todos\" is declared but function \"list\" is not exported
    warning: Function \"list_all\" is exported but not declared in any route

Summary: 2 endpoints, 1 passed, 1 failed, 1 errors, 1 warnings
";
        assert_eq!(report.to_text(), expected);
        assert!(!report.all_valid());
    }

    #[test]
    fn test_summary_counts() {
        let results = results();
        let summary = ReportSummary::from_results(&results);
        assert_eq!(
            summary,
            ReportSummary {
                endpoints: 2,
                passed: 1,
                failed: 1,
                errors: 1,
                warnings: 1,
                valid: false,
            }
        );
    }

    #[test]
    fn test_empty_report_is_valid() {
        assert!(print_report(&[]));
        let report = ValidationReport::new(&[]);
        assert!(report.to_text().ends_with("Summary: 0 endpoints, 0 passed, 0 failed, 0 errors, 0 warnings\n"));
    }

    #[test]
    fn test_warnings_only_pass() {
        let results = vec![ValidationResult::new(
            "hello",
            "hello",
            1,
            Findings {
                errors: vec![],
                warnings: vec!["drift".into()],
            },
        )];
        assert!(print_report(&results));
    }

    #[test]
    fn test_json_report_shape() {
        let results = results();
        let json: serde_json::Value =
            serde_json::from_str(&ValidationReport::new(&results).to_json().unwrap()).unwrap();
        assert_eq!(json["results"][0]["feature"], "hello");
        assert_eq!(json["results"][0]["route_count"], 1);
        assert_eq!(json["results"][1]["valid"], false);
        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["summary"]["valid"], false);
    }
}
