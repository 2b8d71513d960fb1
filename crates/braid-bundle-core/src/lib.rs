//! Braid Bundle Core - shared types for the bundler pipeline
//!
//! This crate defines the vocabulary every pipeline stage speaks: the
//! ordered module map, the reserved export names, and the diagnostic
//! values stages hand back instead of logging on their own.

#![warn(missing_docs)]

use indexmap::IndexMap;

/// Reserved names used in export sets and usage maps.
pub mod names {
    /// Synthetic export name that pins a module even when no real export
    /// of it is used.
    pub const SIDE_EFFECTS: &str = "__side_effects__";
    /// Reserved export name for `export default`.
    pub const DEFAULT: &str = "default";
    /// Reserved export name for `export *`.
    pub const WILDCARD: &str = "*";
    /// Identifier of the shared module table in emitted bundles.
    pub const MODULES_TABLE: &str = "__modules__";
    /// Identifier the emitted bundle binds the entry module to.
    pub const ENTRY_BINDING: &str = "__entry__";
}

/// Ordered mapping from module id to source text.
///
/// Iteration order is insertion order; callers rely on it for
/// deterministic output. Module ids are the literal specifier strings
/// used in imports, quotes stripped, with no path normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMap {
    entries: IndexMap<String, String>,
}

impl ModuleMap {
    /// Create an empty module map.
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Insert a module. A repeated id replaces the source but keeps the
    /// original position.
    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<String>) {
        self.entries.insert(id.into(), source.into());
    }

    /// Look up a module's source by id.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Whether the map defines `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(id, source)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate module ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ModuleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (id, source) in iter {
            map.insert(id, source);
        }
        map
    }
}

/// A diagnostic produced by a pipeline stage.
///
/// Stages never write to a logger themselves; they return these and the
/// host decides on a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Modules found on a back edge during dependency traversal. The
    /// bundle is still emitted; cycle participants appear in
    /// first-encountered depth-first order.
    Cycle {
        /// Module ids encountered on a back edge.
        participants: Vec<String>,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Cycle { participants } => {
                write!(f, "dependency cycle through: {}", participants.join(", "))
            }
        }
    }
}
