use log::{debug, trace};
use std::cmp::Ordering;

use crate::constants::FUZZY_CUTOFF;
use crate::enumerate;
use crate::pypath::SearchPaths;
use crate::types::ModuleCache;

/// Fully-qualified candidates a partial path could complete to. Only the
/// last path level is completed; everything before the final dot must
/// already be importable.
fn possible_modules(paths: &SearchPaths, partial: &str, cache: &ModuleCache) -> Vec<String> {
    let mut candidates: Vec<String> = match partial.rsplit_once('.') {
        None => enumerate::root_modules(paths).into_iter().collect(),
        Some((prefix, _leaf)) => enumerate::list_candidates(paths, prefix, cache)
            .into_iter()
            .map(|name| format!("{prefix}.{name}"))
            .collect(),
    };
    // deterministic tie-breaking regardless of set iteration order
    candidates.sort();
    candidates
}

/// Best-guess full import paths for a partial one, best match first.
///
/// Candidates are scored with Jaro-Winkler similarity against the whole
/// partial path and kept above a fixed cutoff; an exact match scores 1.0 and
/// therefore always ranks first.
///
/// Example: `guess_module("argparse.Argu")` ranks
/// `argparse.ArgumentParser` among its results.
pub fn guess_module(paths: &SearchPaths, partial: &str, cache: &ModuleCache) -> Vec<String> {
    let mut scored: Vec<(f64, String)> = possible_modules(paths, partial, cache)
        .into_iter()
        .map(|candidate| (strsim::jaro_winkler(partial, &candidate), candidate))
        .filter(|(score, _)| *score >= FUZZY_CUTOFF)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    trace!(
        "{} candidates above cutoff for '{}'",
        scored.len(),
        partial
    );
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Exact prefix completions for shell completion: every fully-qualified
/// candidate literally starting with `partial`, unscored.
pub fn names_with_prefix(paths: &SearchPaths, partial: &str, cache: &ModuleCache) -> Vec<String> {
    let names: Vec<String> = possible_modules(paths, partial, cache)
        .into_iter()
        .filter(|name| name.starts_with(partial))
        .collect();
    debug!("{} completions for '{}'", names.len(), partial);
    names
}
