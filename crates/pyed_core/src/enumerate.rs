use log::{debug, trace, warn};
use std::{
    collections::HashSet,
    fs,
    path::Path,
    time::{Duration, Instant},
};

use crate::constants::{BUILTIN_MODULES, MODULE_SUFFIXES, PACKAGE_MARKERS, ROOT_SCAN_TIMEOUT, is_identifier};
use crate::pypath::SearchPaths;
use crate::resolver;
use crate::types::ModuleCache;

/// Names importable directly under `namespace`, fully unqualified.
///
/// For a module that is `__all__` plus its public top-level symbols; for a
/// package additionally everything a one-level directory scan turns up.
/// Failures resolving the namespace degrade to an empty set.
pub fn list_candidates(
    paths: &SearchPaths,
    namespace: &str,
    cache: &ModuleCache,
) -> HashSet<String> {
    if namespace.is_empty() {
        return root_modules(paths);
    }
    let Some(module) = resolver::import_module(paths, namespace, cache) else {
        debug!("Namespace '{}' does not resolve, no candidates", namespace);
        return HashSet::new();
    };

    let mut names: HashSet<String> = module
        .symbols
        .iter()
        .map(|s| s.name.clone())
        .filter(|n| !(n.starts_with("__") && n.ends_with("__")))
        .collect();
    names.extend(module.exports.iter().cloned());
    if module.is_package && let Some(dir) = module.file.parent() {
        names.extend(module_list(dir));
    }
    names.remove("__init__");
    trace!("{} candidates under '{}'", names.len(), namespace);
    names
}

/// Every name importable at the top level: interpreter builtins plus a scan
/// of each search root, bounded by a wall-clock budget.
pub fn root_modules(paths: &SearchPaths) -> HashSet<String> {
    root_modules_within(paths, ROOT_SCAN_TIMEOUT)
}

fn root_modules_within(paths: &SearchPaths, budget: Duration) -> HashSet<String> {
    let mut names: HashSet<String> = BUILTIN_MODULES.iter().map(|s| s.to_string()).collect();
    let start = Instant::now();
    for root in paths.roots() {
        names.extend(module_list(root));
        // Availability over completeness: roots can hold thousands of
        // entries, so give up between scans rather than hang.
        if start.elapsed() > budget {
            warn!("Root enumeration is taking too long, giving up early");
            break;
        }
    }
    names
}

/// Module and package names found directly in `dir`. Descends exactly one
/// level: files with a module suffix, and immediate subdirectories carrying
/// a package marker. Unreadable directories yield nothing.
pub fn module_list(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Cannot read {}: {}", dir.display(), err);
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        // is_dir() follows symlinks, so linked packages enumerate the same
        // way resolve_module finds them
        if entry.path().is_dir() {
            if is_identifier(file_name)
                && PACKAGE_MARKERS.iter().any(|m| entry.path().join(m).is_file())
            {
                names.push(file_name.to_string());
            }
        } else if let Some(name) = module_file_name(file_name) {
            names.push(name.to_string());
        }
    }
    names.retain(|n| n != "__init__");
    names.sort();
    names.dedup();
    names
}

/// The import name a module filename provides, if any. Handles both plain
/// suffixes (`json.py`) and tagged extension modules
/// (`_ssl.cpython-311-x86_64-linux-gnu.so`).
fn module_file_name(file_name: &str) -> Option<&str> {
    let name = file_name.split('.').next()?;
    if !is_identifier(name) {
        return None;
    }
    let rest = &file_name[name.len()..];
    MODULE_SUFFIXES
        .iter()
        .any(|s| rest.ends_with(s) && !rest.is_empty())
        .then_some(name)
}
