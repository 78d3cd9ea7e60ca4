//! # Data Models
//!
//! The surface of a handler module as seen by the contract validator:
//! what it exports, what it imports, and which events it names literally.

use indexmap::IndexSet;

/// How an exported handler candidate is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// `pub fn`.
    Fn,
    /// `pub async fn`.
    AsyncFn,
    /// `pub const` bound to a closure or function pointer.
    Const,
    /// `pub static` bound to a closure or function pointer.
    Static,
}

/// A public, function-valued top-level item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Item name.
    pub name: String,
    /// Declaration form.
    pub kind: ExportKind,
}

/// Classification of an import target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// A capability under the platform namespace.
    Platform,
    /// A third-party crate.
    External,
}

/// A single import target, deduplicated per module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Import {
    /// Platform or external.
    pub kind: ImportKind,
    /// Capability or crate name as written in the source.
    pub name: String,
}

/// Everything the validator needs to know about one handler module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSurface {
    /// Exports in source order. Duplicates are kept.
    pub exports: Vec<Export>,
    /// Imports in first-seen order.
    pub imports: Vec<Import>,
    /// Event names passed literally to emit-style calls.
    pub emits: IndexSet<String>,
    /// Event names passed literally to listen-style calls.
    pub listens: IndexSet<String>,
    /// Parser diagnostics, empty for well-formed sources.
    pub syntax_errors: Vec<String>,
}

impl HandlerSurface {
    /// Distinct export names in source order.
    pub fn exported_names(&self) -> IndexSet<&str> {
        self.exports.iter().map(|e| e.name.as_str()).collect()
    }

    /// How many exports carry `name`.
    pub fn export_count(&self, name: &str) -> usize {
        self.exports.iter().filter(|e| e.name == name).count()
    }

    /// Imported names of the given kind, in first-seen order.
    pub fn imports_of(&self, kind: ImportKind) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .filter(move |i| i.kind == kind)
            .map(|i| i.name.as_str())
    }
}
