//! Braid Bundle Tree Shake - reachability-based elimination
//!
//! Coarse by policy: reaching a module marks its complete export set as
//! used, so an unused named export never drops a module some importer
//! reaches. Elimination only ever replaces whole unreachable,
//! effect-free module bodies with empty source; everything else passes
//! through verbatim.

use braid_bundle_core::{names, ModuleMap};
use braid_bundle_graph::{DependencyGraph, UsageMap};
use braid_bundle_lex::TokenCache;
use std::collections::{HashSet, VecDeque};

/// Shake `modules` from `entry`. Returns a new map in the input's
/// iteration order: unreachable effect-free modules become empty
/// source, all others keep their text, the entry always does.
pub fn shake(modules: &ModuleMap, entry: &str) -> ModuleMap {
    shake_with_cache(modules, entry, &mut TokenCache::new())
}

/// Like [`shake`], reusing token streams from `cache`.
pub fn shake_with_cache(modules: &ModuleMap, entry: &str, cache: &mut TokenCache) -> ModuleMap {
    let graph = DependencyGraph::build_with_cache(modules, cache);
    let usage = live_usage(&graph, entry);

    modules
        .iter()
        .map(|(id, source)| {
            if id == entry {
                return (id, source);
            }
            let keep = usage.is_used(id)
                || graph.node(id).is_some_and(|node| node.has_side_effects);
            (id, if keep { source } else { "" })
        })
        .collect()
}

/// Worklist reachability from the entry. Imported and re-exported
/// modules have their whole export set marked used; visited modules
/// with effects get the side-effect sentinel.
fn live_usage(graph: &DependencyGraph, entry: &str) -> UsageMap {
    let mut usage = UsageMap::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    if graph.node(entry).is_some() {
        visited.insert(entry);
        queue.push_back(entry);
    }

    while let Some(id) = queue.pop_front() {
        let Some(node) = graph.node(id) else { continue };
        for dep in node.imports.iter().chain(node.reexports.iter()) {
            // A specifier with no defined module has no exports and
            // nothing to visit.
            let Some(dep_node) = graph.node(dep) else { continue };
            usage.mark_all(dep, dep_node.exports.iter().map(String::as_str));
            if visited.insert(dep) {
                queue.push_back(dep);
            }
        }
    }

    for id in &visited {
        if graph.node(id).is_some_and(|node| node.has_side_effects) {
            usage.mark(id, names::SIDE_EFFECTS);
        }
    }
    usage
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> ModuleMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn unreachable_pure_module_is_emptied() {
        let modules = map(&[
            ("./index.js", "import { a } from './a.js'; a();"),
            ("./a.js", "export const a = () => 1;"),
            ("./orphan.js", "export const unused = 2;"),
        ]);
        let shaken = shake(&modules, "./index.js");
        assert_eq!(shaken.get("./orphan.js"), Some(""));
        assert_eq!(shaken.get("./a.js"), Some("export const a = () => 1;"));
    }

    #[test]
    fn entry_is_always_preserved() {
        let modules = map(&[("./index.js", "const quiet = 1;")]);
        let shaken = shake(&modules, "./index.js");
        assert_eq!(shaken.get("./index.js"), Some("const quiet = 1;"));
    }

    #[test]
    fn unreachable_module_with_effects_is_kept() {
        let modules = map(&[
            ("./index.js", "export const x = 1;"),
            ("./tracker.js", "const t = new Tracker();"),
        ]);
        let shaken = shake(&modules, "./index.js");
        assert_eq!(shaken.get("./tracker.js"), Some("const t = new Tracker();"));
    }

    #[test]
    fn side_effect_import_keeps_the_dependency() {
        let modules = map(&[
            ("./index.js", "import './boot.js';"),
            ("./boot.js", "const app = new App();"),
        ]);
        let shaken = shake(&modules, "./index.js");
        assert_eq!(shaken.get("./boot.js"), Some("const app = new App();"));
    }

    #[test]
    fn reexport_chain_stays_alive() {
        let modules = map(&[
            ("./index.js", "export * from './mid.js';"),
            ("./mid.js", "export * from './leaf.js';"),
            ("./leaf.js", "export const leaf = 1;"),
        ]);
        let shaken = shake(&modules, "./index.js");
        assert_eq!(shaken.get("./mid.js"), Some("export * from './leaf.js';"));
        assert_eq!(shaken.get("./leaf.js"), Some("export const leaf = 1;"));
    }

    #[test]
    fn missing_dependency_is_tolerated() {
        let modules = map(&[("./index.js", "import { gone } from './gone.js';")]);
        let shaken = shake(&modules, "./index.js");
        assert_eq!(shaken.len(), 1);
        assert_eq!(
            shaken.get("./index.js"),
            Some("import { gone } from './gone.js';")
        );
    }

    #[test]
    fn output_preserves_map_order() {
        let modules = map(&[
            ("./z.js", "export const z = 1;"),
            ("./index.js", "import { z } from './z.js';"),
            ("./a.js", "export const a = 1;"),
        ]);
        let shaken = shake(&modules, "./index.js");
        let ids: Vec<&str> = shaken.ids().collect();
        assert_eq!(ids, vec!["./z.js", "./index.js", "./a.js"]);
        assert_eq!(shaken.get("./a.js"), Some(""));
    }

    #[test]
    fn unused_named_exports_do_not_drop_a_reached_module() {
        // Coarse usage: importing one name keeps the whole dependency.
        let modules = map(&[
            ("./index.js", "import { one } from './both.js';"),
            ("./both.js", "export const one = 1; export const two = 2;"),
        ]);
        let shaken = shake(&modules, "./index.js");
        assert_eq!(
            shaken.get("./both.js"),
            Some("export const one = 1; export const two = 2;")
        );
    }
}
