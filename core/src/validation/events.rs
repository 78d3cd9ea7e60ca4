//! # Event Reconciliation
//!
//! `publishes` is matched against emit-style calls, `subscribes` against
//! listen-style calls. Declared but absent is an error; present but undeclared
//! is a warning.

use super::Findings;
use crate::contract::Contract;
use crate::parser::HandlerSurface;
use indexmap::IndexSet;

/// Checks declared events against literal event names in the handler.
pub(crate) fn check_events(contract: &Contract, surface: &HandlerSurface, findings: &mut Findings) {
    reconcile(
        &contract.publishes,
        &surface.emits,
        Direction::Publish,
        findings,
    );
    reconcile(
        &contract.subscribes,
        &surface.listens,
        Direction::Subscribe,
        findings,
    );
}

#[derive(Clone, Copy)]
enum Direction {
    Publish,
    Subscribe,
}

impl Direction {
    fn list(self) -> &'static str {
        match self {
            Direction::Publish => "publishes",
            Direction::Subscribe => "subscribes",
        }
    }

    fn action(self) -> &'static str {
        match self {
            Direction::Publish => "emitted",
            Direction::Subscribe => "listened for",
        }
    }
}

fn reconcile(
    declared: &IndexSet<String>,
    found: &IndexSet<String>,
    direction: Direction,
    findings: &mut Findings,
) {
    for event in declared {
        if !found.contains(event) {
            findings.error(format!(
                "Event \"{}\" is declared in {} but never {}",
                event,
                direction.list(),
                direction.action()
            ));
        }
    }

    for event in found {
        if !declared.contains(event) {
            findings.warning(format!(
                "Event \"{}\" is {} but not declared in {}",
                event,
                direction.action(),
                direction.list()
            ));
        }
    }
}
