//! Constants for module filename suffixes and resolution limits.

use std::time::Duration;

/// Filename suffixes a module file may carry. Extension modules are
/// enumerable by name but carry no indexable source.
pub const MODULE_SUFFIXES: &[&str] = &[
    ".py",  // source
    ".pyi", // stub
    ".pyw", // windowed source
    ".so",  // extension module (also matches cpython-tagged names)
    ".pyd", // windows extension module
];

/// Suffixes the indexer can actually parse.
pub const SOURCE_SUFFIXES: &[&str] = &[".py", ".pyi", ".pyw"];

/// Marker files that make a directory importable as a package.
pub const PACKAGE_MARKERS: &[&str] = &["__init__.py", "__init__.pyi"];

/// Modules compiled into the interpreter. These have no file on any search
/// root but still complete at the top level.
pub const BUILTIN_MODULES: &[&str] = &[
    "_abc",
    "_ast",
    "_codecs",
    "_collections",
    "_functools",
    "_imp",
    "_io",
    "_locale",
    "_operator",
    "_signal",
    "_sre",
    "_stat",
    "_string",
    "_symtable",
    "_thread",
    "_warnings",
    "_weakref",
    "atexit",
    "builtins",
    "errno",
    "faulthandler",
    "gc",
    "itertools",
    "marshal",
    "posix",
    "sys",
    "time",
];

/// Wall-clock budget for enumerating every search root. Checked between
/// successive roots, not mid-scan.
pub const ROOT_SCAN_TIMEOUT: Duration = Duration::from_secs(20);

/// Minimum Jaro-Winkler similarity for a fuzzy candidate to be accepted.
pub const FUZZY_CUTOFF: f64 = 0.75;

/// Upper bound when following alias/re-export links to the real definition.
pub const MAX_LINK_HOPS: usize = 16;

/// True when `name` is a valid Python identifier (and hence a valid import
/// path segment).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
