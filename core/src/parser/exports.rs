//! # Export Extraction
//!
//! Finds the top-level items a handler module exposes as callable handlers.

use crate::parser::models::{Export, ExportKind};
use ra_ap_syntax::ast::{self, HasModuleItem, HasName, HasVisibility};
use ra_ap_syntax::{AstNode, SourceFile};

/// Collects public functions and function-valued constants/statics.
///
/// Only plain `pub` counts; restricted visibilities and items inside inline
/// modules are not part of the module's export table.
pub(crate) fn collect_exports(file: &SourceFile) -> Vec<Export> {
    file.items()
        .filter_map(|item| match item {
            ast::Item::Fn(f) if is_exported(&f) => {
                let kind = if f.async_token().is_some() {
                    ExportKind::AsyncFn
                } else {
                    ExportKind::Fn
                };
                export(f.name(), kind)
            }
            ast::Item::Const(c) if is_exported(&c) && binds_function(c.ty(), c.body()) => {
                export(c.name(), ExportKind::Const)
            }
            ast::Item::Static(s) if is_exported(&s) && binds_function(s.ty(), s.body()) => {
                export(s.name(), ExportKind::Static)
            }
            _ => None,
        })
        .collect()
}

fn export(name: Option<ast::Name>, kind: ExportKind) -> Option<Export> {
    name.map(|n| Export {
        name: n.text().to_string(),
        kind,
    })
}

fn is_exported(item: &impl HasVisibility) -> bool {
    item.visibility()
        .is_some_and(|v| v.syntax().text().to_string() == "pub")
}

/// A value item binds a function when typed as `fn(..)` or initialized with a closure.
fn binds_function(ty: Option<ast::Type>, body: Option<ast::Expr>) -> bool {
    matches!(ty, Some(ast::Type::FnPtrType(_))) || matches!(body, Some(ast::Expr::ClosureExpr(_)))
}
