//! Braid Bundle Graph - the module dependency graph
//!
//! A pure directed graph over module ids. Nodes carry only strings, so
//! no ownership cycles arise; an id table plus adjacency sets is the
//! whole representation. An edge `m -> dep` exists iff `m`'s source
//! contains a static import whose specifier equals `dep`.

use braid_bundle_core::{names, ModuleMap};
use braid_bundle_lex::{Token, TokenCache, TokenKind};
use braid_bundle_module::{find_module_syntax, ExportKind};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Per-module graph entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleNode {
    /// Static import specifiers, first-seen order, deduplicated.
    pub imports: Vec<String>,
    /// Exported names; `default` and `*` are reserved names.
    pub exports: HashSet<String>,
    /// Sources re-exported from, first-seen order, deduplicated.
    pub reexports: Vec<String>,
    /// Conservative effect flag; false negatives would erase observable
    /// behavior, so the test errs toward true.
    pub has_side_effects: bool,
}

impl ModuleNode {
    /// Dependencies in ordering-relevant order: imports, then re-export
    /// sources.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .chain(self.reexports.iter())
            .map(String::as_str)
    }
}

/// Dependency graph over every module in a map.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, ModuleNode>,
}

/// Result of ordering the graph for emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopoOrder {
    /// Every defined module exactly once, dependencies before
    /// importers except inside cycles.
    pub order: Vec<String>,
    /// Back-edge targets in first-encountered depth-first order.
    pub cycles: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Visiting,
    Done,
}

impl DependencyGraph {
    /// Build the graph, tokenizing every module.
    pub fn build(modules: &ModuleMap) -> Self {
        Self::build_with_cache(modules, &mut TokenCache::new())
    }

    /// Build the graph, reusing token streams from `cache`.
    pub fn build_with_cache(modules: &ModuleMap, cache: &mut TokenCache) -> Self {
        let mut nodes = IndexMap::new();
        for (id, source) in modules.iter() {
            let tokens = cache.tokens(source);
            nodes.insert(id.to_string(), analyze(&tokens));
        }
        Self { nodes }
    }

    /// Graph entry for `id`.
    pub fn node(&self, id: &str) -> Option<&ModuleNode> {
        self.nodes.get(id)
    }

    /// Module ids in module-map order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no modules.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first dependencies-first order starting at `entry`, then
    /// any remaining modules in insertion order. Back edges are
    /// recorded, not fatal; imports that name no defined module are
    /// skipped.
    pub fn topological_order(&self, entry: &str) -> TopoOrder {
        let count = self.nodes.len();
        let adjacency: Vec<Vec<usize>> = self
            .nodes
            .values()
            .map(|node| {
                node.dependencies()
                    .filter_map(|dep| self.nodes.get_index_of(dep))
                    .collect()
            })
            .collect();

        let mut marks = vec![Mark::New; count];
        let mut order_idx = Vec::with_capacity(count);
        let mut cycle_idx = Vec::new();

        if let Some(entry_idx) = self.nodes.get_index_of(entry) {
            dfs(entry_idx, &adjacency, &mut marks, &mut order_idx, &mut cycle_idx);
        }
        for idx in 0..count {
            dfs(idx, &adjacency, &mut marks, &mut order_idx, &mut cycle_idx);
        }

        let id_at = |idx: usize| self.nodes.get_index(idx).map(|(id, _)| id.clone()).unwrap();
        TopoOrder {
            order: order_idx.into_iter().map(id_at).collect(),
            cycles: cycle_idx.into_iter().map(id_at).collect(),
        }
    }
}

/// Iterative post-order walk. A `Visiting` target is a back edge and is
/// recorded without descent.
fn dfs(
    root: usize,
    adjacency: &[Vec<usize>],
    marks: &mut [Mark],
    order: &mut Vec<usize>,
    cycles: &mut Vec<usize>,
) {
    if marks[root] != Mark::New {
        return;
    }
    marks[root] = Mark::Visiting;
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

    while let Some((node, cursor)) = stack.last_mut() {
        let node = *node;
        if *cursor < adjacency[node].len() {
            let child = adjacency[node][*cursor];
            *cursor += 1;
            match marks[child] {
                Mark::New => {
                    marks[child] = Mark::Visiting;
                    stack.push((child, 0));
                }
                Mark::Visiting => {
                    if !cycles.contains(&child) {
                        cycles.push(child);
                    }
                }
                Mark::Done => {}
            }
        } else {
            marks[node] = Mark::Done;
            order.push(node);
            stack.pop();
        }
    }
}

/// Extract one module's graph entry from its tokens.
fn analyze(tokens: &[Token]) -> ModuleNode {
    let syntax = find_module_syntax(tokens);
    let mut node = ModuleNode::default();

    for import in &syntax.imports {
        push_unique(&mut node.imports, &import.source);
    }
    for export in &syntax.exports {
        match export.kind {
            ExportKind::Default => {
                node.exports.insert(names::DEFAULT.to_string());
            }
            ExportKind::All => match &export.source {
                Some(source) => push_unique(&mut node.reexports, source),
                None => {
                    node.exports.insert(names::WILDCARD.to_string());
                }
            },
            ExportKind::Named => {
                for name in &export.names {
                    node.exports.insert(name.clone());
                }
                if let Some(source) = &export.source {
                    push_unique(&mut node.reexports, source);
                }
            }
        }
    }

    node.has_side_effects = tokens.iter().any(|t| {
        matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword) && t.value == "new"
    });
    node
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Live export names per module. `__side_effects__` pins a module body
/// even when no real export is referenced.
#[derive(Debug, Clone, Default)]
pub struct UsageMap {
    used: HashMap<String, HashSet<String>>,
}

impl UsageMap {
    /// Create an empty usage map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one export of `module` as live.
    pub fn mark(&mut self, module: &str, name: &str) {
        self.used
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string());
    }

    /// Merge a set of export names into `module`'s live set.
    pub fn mark_all<'a>(&mut self, module: &str, exported: impl IntoIterator<Item = &'a str>) {
        let entry = self.used.entry(module.to_string()).or_default();
        for name in exported {
            entry.insert(name.to_string());
        }
    }

    /// Whether any export of `module` is live.
    pub fn is_used(&self, module: &str) -> bool {
        self.used.get(module).is_some_and(|set| !set.is_empty())
    }

    /// The live set for `module`, if any name was marked.
    pub fn used_names(&self, module: &str) -> Option<&HashSet<String>> {
        self.used.get(module)
    }
}
