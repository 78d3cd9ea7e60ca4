//! # Import Extraction
//!
//! Flattens `use` trees into full paths and sorts each path into a platform
//! capability, an external crate, or neither.

use crate::parser::models::{Import, ImportKind};
use indexmap::IndexSet;
use ra_ap_syntax::ast;
use ra_ap_syntax::{AstNode, SourceFile};

/// Path roots that never name a third-party crate.
const LOCAL_ROOTS: [&str; 6] = ["crate", "self", "super", "std", "core", "alloc"];

/// Collects every import target in the module, including `use` items nested
/// in function bodies and `extern crate` declarations.
pub(crate) fn collect_imports(file: &SourceFile, namespace: &[String]) -> Vec<Import> {
    let mut seen = IndexSet::new();

    for node in file.syntax().descendants() {
        if let Some(use_item) = ast::Use::cast(node.clone()) {
            let Some(tree) = use_item.use_tree() else {
                continue;
            };
            let mut paths = Vec::new();
            flatten(&tree, &[], &mut paths);
            seen.extend(paths.iter().filter_map(|p| classify(p, namespace)));
        } else if let Some(extern_crate) = ast::ExternCrate::cast(node) {
            if let Some(name) = extern_crate.name_ref() {
                let path = vec![name.text().to_string()];
                seen.extend(classify(&path, namespace));
            }
        }
    }

    seen.into_iter().collect()
}

/// Expands `a::{b, c::{d, e}}` into `a::b`, `a::c::d`, `a::c::e`.
fn flatten(tree: &ast::UseTree, prefix: &[String], out: &mut Vec<Vec<String>>) {
    let mut segments = prefix.to_vec();
    if let Some(path) = tree.path() {
        segments.extend(path_segments(&path));
    }

    match tree.use_tree_list() {
        Some(list) => {
            for child in list.use_trees() {
                flatten(&child, &segments, out);
            }
        }
        None => out.push(segments),
    }
}

fn path_segments(path: &ast::Path) -> Vec<String> {
    path.syntax()
        .text()
        .to_string()
        .split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn classify(path: &[String], namespace: &[String]) -> Option<Import> {
    let mut path: Vec<&str> = path.iter().map(String::as_str).collect();
    // `a::{self}` names `a` itself
    if path.len() > 1 && path.last() == Some(&"self") {
        path.pop();
    }

    let in_namespace = !namespace.is_empty()
        && path.len() >= namespace.len()
        && path.iter().zip(namespace).all(|(a, b)| *a == b.as_str());
    if in_namespace {
        return path.get(namespace.len()).map(|capability| Import {
            kind: ImportKind::Platform,
            name: capability.to_string(),
        });
    }

    let first = *path.first()?;
    if LOCAL_ROOTS.contains(&first) || namespace.first().is_some_and(|root| root == first) {
        return None;
    }

    Some(Import {
        kind: ImportKind::External,
        name: first.to_string(),
    })
}
