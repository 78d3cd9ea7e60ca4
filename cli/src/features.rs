//! # Bundled Features
//!
//! The handler modules of the bundled `features/` tree, compiled in, and the
//! dispatch table that exposes them to the route binder. A function missing
//! here is skipped at bind time even when its contract validates.

use trellis_core::{HandlerRegistry, HandlerTable};

/// `hello/hello`
#[path = "../../features/hello/hello/hello.logic.rs"]
pub mod hello;

/// `todo/items`
#[path = "../../features/todo/items/items.logic.rs"]
pub mod todo_items;

/// `todo/audit`
#[path = "../../features/todo/audit/audit.logic.rs"]
pub mod todo_audit;

/// Default features directory of this workspace.
pub const FEATURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../features");

/// Dispatch tables for every bundled endpoint. Also attaches the event
/// listeners bundled endpoints rely on.
pub fn registry() -> HandlerRegistry {
    todo_audit::subscribe();

    HandlerRegistry::new()
        .with_endpoint("hello", "hello", HandlerTable::new().with("list", hello::list))
        .with_endpoint(
            "todo",
            "items",
            HandlerTable::new()
                .with("list", todo_items::list)
                .with("create", todo_items::create)
                .with("show", todo_items::show)
                .with("update", todo_items::update)
                .with("remove", todo_items::remove),
        )
        .with_endpoint(
            "todo",
            "audit",
            HandlerTable::new().with("recent", todo_audit::recent),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_bundled_endpoints() {
        let registry = registry();
        let endpoints: Vec<_> = registry.endpoints().collect();
        assert_eq!(
            endpoints,
            vec![("hello", "hello"), ("todo", "items"), ("todo", "audit")]
        );
        assert_eq!(registry.table("todo", "items").unwrap().len(), 5);
    }
}
