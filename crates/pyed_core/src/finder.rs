use log::trace;
use std::{collections::HashSet, env, path::PathBuf};

use crate::constants::{MAX_LINK_HOPS, PACKAGE_MARKERS};
use crate::pypath::SearchPaths;
use crate::resolver;
use crate::types::{Entity, Link, ModuleCache, SymbolKind};

/// When set, packages resolve to their directory instead of the `__init__`
/// file, for directory-oriented editors.
pub const OPEN_DIRECTORIES_ENV: &str = "PYED_OPEN_DIRECTORIES";

/// Follow alias and re-export links to a fixed point so that a wrapped or
/// re-exported name reports the code actually written. Bounded, with a
/// cycle guard; a link that fails to resolve stops the walk at the last
/// resolved entity.
fn follow_links(paths: &SearchPaths, entity: &Entity, cache: &ModuleCache) -> Entity {
    let mut current = entity.clone();
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(current.path.clone());

    for _ in 0..MAX_LINK_HOPS {
        let Some(symbol) = &current.symbol else { break };
        let SymbolKind::Binding { link: Some(link) } = &symbol.kind else {
            break;
        };
        let next = match link {
            Link::Alias(target) => {
                let qualified = format!("{}.{}", current.module.name, target);
                if !seen.insert(qualified.clone()) {
                    trace!("Link cycle at '{}', stopping", qualified);
                    break;
                }
                match current.module.symbol(target).cloned() {
                    Some(symbol) => Entity {
                        path: qualified,
                        module: current.module.clone(),
                        symbol: Some(symbol),
                    },
                    None => break,
                }
            }
            Link::Import { module, name } => {
                let dotted = match name {
                    Some(name) => format!("{module}.{name}"),
                    None => module.clone(),
                };
                if !seen.insert(dotted.clone()) {
                    trace!("Link cycle at '{}', stopping", dotted);
                    break;
                }
                match resolver::import_object(paths, &dotted, cache) {
                    Ok(entity) => entity,
                    Err(err) => {
                        trace!("Link target '{}' does not resolve: {}", dotted, err);
                        break;
                    }
                }
            }
            // an instance introspects as its class, handled below
            Link::Instance(_) => break,
        };
        current = next;
    }
    current
}

/// For an instance binding, the entity of the class (or factory) it was
/// constructed from, if that resolves.
fn class_entity(paths: &SearchPaths, entity: &Entity, cache: &ModuleCache) -> Option<Entity> {
    let symbol = entity.symbol.as_ref()?;
    let SymbolKind::Binding {
        link: Some(Link::Instance(class_name)),
    } = &symbol.kind
    else {
        return None;
    };
    let class_symbol = entity.module.symbol(class_name).cloned()?;
    let class = Entity {
        path: format!("{}.{}", entity.module.name, class_name),
        module: entity.module.clone(),
        symbol: Some(class_symbol),
    };
    Some(follow_links(paths, &class, cache))
}

/// Absolute path to the file where the entity's definition lives.
pub fn find_file(paths: &SearchPaths, entity: &Entity, cache: &ModuleCache) -> Option<PathBuf> {
    let resolved = follow_links(paths, entity, cache);
    let resolved = class_entity(paths, &resolved, cache).unwrap_or(resolved);

    let mut file = resolved.module.file.clone();
    if env::var_os(OPEN_DIRECTORIES_ENV).is_some()
        && resolved.module.is_package
        && file
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| PACKAGE_MARKERS.contains(&n))
        && let Some(dir) = file.parent()
    {
        // open the package as a whole instead of its __init__ file
        file = dir.to_path_buf();
    }
    Some(file)
}

/// 1-indexed line where the entity is defined, or `None` for whole modules
/// and anything else with no single discoverable line.
pub fn find_source_line(
    paths: &SearchPaths,
    entity: &Entity,
    cache: &ModuleCache,
) -> Option<usize> {
    let resolved = follow_links(paths, entity, cache);
    if let Some(class) = class_entity(paths, &resolved, cache) {
        return class.symbol.map(|s| s.line);
    }
    resolved.symbol.map(|s| s.line)
}
