//! Braid Bundle Concat - flatten a module map into one artifact
//!
//! Orders modules dependencies-first, wraps each body in the runtime
//! scaffold, and joins everything with blank lines. Bodies are inserted
//! verbatim; import/export rewriting belongs to upstream consumers or
//! to the CommonJS fallback already present in the body. Cycles are
//! reported as diagnostics and never abort emission.

use braid_bundle_core::{names, Diagnostic, ModuleMap};
use braid_bundle_graph::DependencyGraph;
use braid_bundle_lex::TokenCache;

/// Emitted bundle plus the diagnostics gathered while ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutput {
    /// The whole artifact as one string.
    pub code: String,
    /// Cycle reports; the host decides where they go.
    pub diagnostics: Vec<Diagnostic>,
}

/// Bundle `modules` with `entry` as the root of the dependency order.
pub fn bundle(modules: &ModuleMap, entry: &str) -> BundleOutput {
    bundle_with_cache(modules, entry, &mut TokenCache::new())
}

/// Like [`bundle`], reusing token streams from `cache`.
pub fn bundle_with_cache(
    modules: &ModuleMap,
    entry: &str,
    cache: &mut TokenCache,
) -> BundleOutput {
    let graph = DependencyGraph::build_with_cache(modules, cache);
    let topo = graph.topological_order(entry);

    let mut parts = Vec::with_capacity(topo.order.len() + 2);
    parts.push(format!("var {} = {{}};", names::MODULES_TABLE));
    for id in &topo.order {
        // Ordered ids come from the map itself; imports that name no
        // defined module were already skipped while ordering.
        let body = modules.get(id).unwrap_or_default();
        parts.push(wrap_module(id, body));
    }
    parts.push(format!(
        "var {} = {}['{}'];",
        names::ENTRY_BINDING,
        names::MODULES_TABLE,
        entry
    ));

    let diagnostics = if topo.cycles.is_empty() {
        Vec::new()
    } else {
        vec![Diagnostic::Cycle {
            participants: topo.cycles,
        }]
    };

    BundleOutput {
        code: parts.join("\n\n"),
        diagnostics,
    }
}

/// The runtime scaffold around one module body. `require`, `module`,
/// and `exports` are formal parameters of the inner function, so the
/// body references them without leaking; the finished exports land in
/// the shared table under the module id.
fn wrap_module(id: &str, body: &str) -> String {
    format!(
        "/* Module: {id} */\n\
         (function (modules, moduleName) {{\n\
         \u{20} var module = {{ exports: {{}} }};\n\
         \u{20} var exports = module.exports;\n\
         \u{20} (function (require, module, exports) {{\n\
         {body}\n\
         \u{20} }})(function (id) {{ return modules[id]; }}, module, exports);\n\
         \u{20} modules[moduleName] = module.exports;\n\
         }})({table}, '{id}');",
        table = names::MODULES_TABLE,
    )
}
