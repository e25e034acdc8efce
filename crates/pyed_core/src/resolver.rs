use log::{debug, trace};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::constants::{PACKAGE_MARKERS, SOURCE_SUFFIXES};
use crate::error::ResolveError;
use crate::parser;
use crate::pypath::SearchPaths;
use crate::types::{Entity, ModuleCache, ModuleIndex};

/// A dotted path resolved to a concrete file. Packages resolve to their
/// `__init__` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    pub path: PathBuf,
    pub is_package: bool,
}

/// Resolve a dotted import path to a module file by walking the search
/// roots. `module.Class` and `module.submodule` are indistinguishable by
/// syntax, so callers try this on the whole path first and split afterwards.
pub fn resolve_module(paths: &SearchPaths, dotted: &str) -> Option<ModuleFile> {
    let mut segments = dotted.split('.');
    let first = segments.next()?;
    if first.is_empty() {
        return None;
    }

    let mut current = paths.roots().find_map(|root| find_in_dir(root, first))?;
    for segment in segments {
        if !current.is_package {
            trace!(
                "Cannot descend into '{}': parent of '{}' is a plain module",
                segment, dotted
            );
            return None;
        }
        let dir = current.path.parent()?;
        current = find_in_dir(dir, segment)?;
    }
    trace!("Resolved '{}' to {:?}", dotted, current.path);
    Some(current)
}

fn find_in_dir(dir: &Path, segment: &str) -> Option<ModuleFile> {
    if segment.is_empty() {
        return None;
    }
    let package_dir = dir.join(segment);
    for marker in PACKAGE_MARKERS {
        let init = package_dir.join(marker);
        if init.is_file() {
            return Some(ModuleFile {
                path: init,
                is_package: true,
            });
        }
    }
    for suffix in SOURCE_SUFFIXES {
        let candidate = dir.join(format!("{segment}{suffix}"));
        if candidate.is_file() {
            return Some(ModuleFile {
                path: candidate,
                is_package: false,
            });
        }
    }
    None
}

/// Resolve and index a module, through the registry. Repeated imports of one
/// path within a process observe the same index.
pub fn import_module(
    paths: &SearchPaths,
    dotted: &str,
    cache: &ModuleCache,
) -> Option<Arc<ModuleIndex>> {
    if let Some(cached) = cache.get(dotted) {
        trace!("Cache hit for module '{}'", dotted);
        return Some(cached.clone());
    }
    let module = resolve_module(paths, dotted)?;
    let index = Arc::new(parser::index_module(dotted, &module));
    cache.insert(dotted.to_string(), index.clone());
    Some(index)
}

/// Import a dotted path as a module or, failing that, as an attribute of its
/// parent module.
pub fn import_object(
    paths: &SearchPaths,
    ipath: &str,
    cache: &ModuleCache,
) -> Result<Entity, ResolveError> {
    if let Some(module) = import_module(paths, ipath, cache) {
        return Ok(Entity {
            path: ipath.to_string(),
            module,
            symbol: None,
        });
    }

    let Some((parent, leaf)) = ipath.rsplit_once('.') else {
        return Err(ResolveError::NotFound {
            input: ipath.to_string(),
        });
    };
    let Some(module) = import_module(paths, parent, cache) else {
        debug!("Neither '{}' nor its parent '{}' resolve", ipath, parent);
        return Err(ResolveError::NotFound {
            input: ipath.to_string(),
        });
    };
    match module.symbol(leaf).cloned() {
        Some(symbol) => Ok(Entity {
            path: ipath.to_string(),
            symbol: Some(symbol),
            module,
        }),
        None => Err(ResolveError::AttributeNotFound {
            module: parent.to_string(),
            attr: leaf.to_string(),
        }),
    }
}
