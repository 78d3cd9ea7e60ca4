//! # Event Extraction
//!
//! Finds event names passed as string literals to emit-style and listen-style
//! calls, either as methods (`bus.emit("x", ..)`) or as paths (`events::emit("x")`).

use indexmap::IndexSet;
use ra_ap_syntax::ast::{self, HasArgList};
use ra_ap_syntax::{AstNode, SourceFile, SyntaxNode};

/// Collects literal event names from calls whose callee name is in `methods`.
pub(crate) fn collect_events(file: &SourceFile, methods: &[String]) -> IndexSet<String> {
    file.syntax()
        .descendants()
        .filter_map(|node| event_name(node, methods))
        .collect()
}

fn event_name(node: SyntaxNode, methods: &[String]) -> Option<String> {
    let is_event_call = |name: &str| methods.iter().any(|m| m == name);

    if let Some(call) = ast::MethodCallExpr::cast(node.clone()) {
        let name = call.name_ref()?.text().to_string();
        if !is_event_call(&name) {
            return None;
        }
        return first_literal(call.arg_list()?);
    }

    let call = ast::CallExpr::cast(node)?;
    let ast::Expr::PathExpr(callee) = call.expr()? else {
        return None;
    };
    let name = callee.path()?.segment()?.name_ref()?.text().to_string();
    if !is_event_call(&name) {
        return None;
    }
    first_literal(call.arg_list()?)
}

/// The decoded value of the first argument when it is a string literal, plain
/// or raw. Byte strings, C strings and literals with invalid escapes yield nothing.
fn first_literal(args: ast::ArgList) -> Option<String> {
    let ast::Expr::Literal(lit) = args.args().next()? else {
        return None;
    };
    match lit.kind() {
        ast::LiteralKind::String(s) => s.value().ok().map(|v| v.into_owned()),
        _ => None,
    }
}
