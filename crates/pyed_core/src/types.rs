use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Parsed modules keyed by dotted import path. This is the module registry:
/// populated lazily by the importer, owned by the caller, never torn down
/// within one invocation.
pub type ModuleCache = DashMap<String, Arc<ModuleIndex>>;

/// A parsed module: its file, package flag, and top-level symbol table.
#[derive(Debug, Clone)]
pub struct ModuleIndex {
    /// Dotted import path this module was resolved as.
    pub name: String,
    pub file: PathBuf,
    pub is_package: bool,
    /// Top-level bindings in source order. Python rebinding semantics apply,
    /// so lookups take the last match.
    pub symbols: Vec<Symbol>,
    /// Names the module advertises via `__all__`.
    pub exports: Vec<String>,
}

impl ModuleIndex {
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().rev().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// 1-indexed line of the `def`/`class`/assignment itself, past any
    /// decorator lines.
    pub line: usize,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Function,
    /// A plain top-level binding. When the right-hand side names something we
    /// can chase, the link records it.
    Binding { link: Option<Link> },
}

/// What a binding points at. Links are followed to a fixed point before
/// introspection so aliases and re-exports report the real definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// `name = other_name` in the same module.
    Alias(String),
    /// `name = Callee(...)`: an instance; its location is the callee's.
    Instance(String),
    /// `import module` / `from module import name`.
    Import {
        module: String,
        name: Option<String>,
    },
}

/// The object an import path resolves to: a module, or one symbol within it.
///
/// Carries the parsed module it came from, so the location finder observes
/// exactly what the importer resolved.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Full dotted path the entity was reached by.
    pub path: String,
    pub module: Arc<ModuleIndex>,
    /// `None` means the module itself.
    pub symbol: Option<Symbol>,
}

impl Entity {
    pub fn is_module(&self) -> bool {
        self.symbol.is_none()
    }
}
