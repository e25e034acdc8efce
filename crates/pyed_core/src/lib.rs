//! Core resolution pipeline for pyed.
//!
//! This crate turns a user-supplied, possibly partial, Python import path
//! into a concrete source file location:
//! - Resolving dotted import paths against filesystem search roots
//! - Indexing top-level symbols of Python modules
//! - Enumerating importable names under a namespace
//! - Fuzzy-matching partial paths against candidate import paths
//! - Locating the file and defining line of a resolved object

mod constants;
mod enumerate;
mod error;
mod finder;
mod guess;
mod parser;
mod pipeline;
mod pypath;
mod resolver;
mod types;

// Re-export public API
pub use constants::{BUILTIN_MODULES, FUZZY_CUTOFF, MODULE_SUFFIXES, ROOT_SCAN_TIMEOUT};
pub use enumerate::{list_candidates, module_list, root_modules};
pub use error::ResolveError;
pub use finder::{find_file, find_source_line};
pub use guess::{guess_module, names_with_prefix};
pub use pipeline::{Info, get_info};
pub use pypath::SearchPaths;
pub use resolver::{ModuleFile, import_module, import_object, resolve_module};
pub use types::{Entity, Link, ModuleCache, ModuleIndex, Symbol, SymbolKind};
