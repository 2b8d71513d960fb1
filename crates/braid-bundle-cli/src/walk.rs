//! Materialize the module map from a source directory.
//!
//! Ids are the `./`-relative paths of the files under the root, with
//! forward slashes on every platform, so they line up with the literal
//! specifiers relative imports use. The walk is sorted for
//! deterministic map order.

use anyhow::{Context, Result};
use braid_bundle_core::ModuleMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

const MODULE_EXTENSIONS: &[&str] = &["js", "mjs"];

/// Read every module file under `root` into a module map.
pub fn collect_modules(root: &Path) -> Result<ModuleMap> {
    let mut map = ModuleMap::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !is_module_file(path) {
            continue;
        }
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read module {}", path.display()))?;
        map.insert(module_id(root, path), source);
    }
    Ok(map)
}

fn is_module_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MODULE_EXTENSIONS.contains(&ext))
}

/// `./`-prefixed relative id with `/` separators, no normalization.
fn module_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut id = String::from(".");
    for component in relative.components() {
        id.push('/');
        id.push_str(&component.as_os_str().to_string_lossy());
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_js_files_with_relative_ids() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.js"), "import './util/math.js';").unwrap();
        fs::create_dir(dir.path().join("util")).unwrap();
        fs::write(dir.path().join("util/math.js"), "export const pi = 3;").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a module").unwrap();

        let map = collect_modules(dir.path()).unwrap();
        let ids: Vec<&str> = map.ids().collect();
        assert_eq!(ids, vec!["./index.js", "./util/math.js"]);
        assert_eq!(map.get("./util/math.js"), Some("export const pi = 3;"));
    }

    #[test]
    fn walk_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.js", "a.js", "c.mjs"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let map = collect_modules(dir.path()).unwrap();
        let ids: Vec<&str> = map.ids().collect();
        assert_eq!(ids, vec!["./a.js", "./b.js", "./c.mjs"]);
    }
}
