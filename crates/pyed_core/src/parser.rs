use log::{debug, trace};
use rustpython_parser::{Parse, ast};
use std::{fs, path::Path};

use crate::constants::SOURCE_SUFFIXES;
use crate::resolver::ModuleFile;
use crate::types::{Link, ModuleIndex, Symbol, SymbolKind};

/// Build the top-level symbol table for a resolved module file.
///
/// Unreadable or unparseable files (and extension modules, which have no
/// source at all) degrade to an index with no symbols; the file itself is
/// still a valid resolution target.
pub(crate) fn index_module(name: &str, module: &ModuleFile) -> ModuleIndex {
    let mut index = ModuleIndex {
        name: name.to_string(),
        file: module.path.clone(),
        is_package: module.is_package,
        symbols: Vec::new(),
        exports: Vec::new(),
    };
    if !is_source_file(&module.path) {
        trace!("Not an indexable source file: {}", module.path.display());
        return index;
    }
    let source = match fs::read_to_string(&module.path) {
        Ok(source) => source,
        Err(err) => {
            debug!("Failed to read {}: {}", module.path.display(), err);
            return index;
        }
    };
    let suite = match ast::Suite::parse(&source, &module.path.display().to_string()) {
        Ok(suite) => suite,
        Err(err) => {
            debug!("Failed to parse {}: {}", module.path.display(), err);
            return index;
        }
    };
    let map = SourceMap::new(&source);
    collect(
        &suite,
        name,
        module.is_package,
        &map,
        &mut index.symbols,
        &mut index.exports,
    );
    trace!(
        "Indexed {} top-level symbols in {}",
        index.symbols.len(),
        module.path.display()
    );
    index
}

fn is_source_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| SOURCE_SUFFIXES.iter().any(|s| n.ends_with(s)))
}

/// Maps byte offsets from the parser back to 1-indexed source lines.
struct SourceMap<'a> {
    starts: Vec<usize>,
    lines: Vec<&'a str>,
}

impl<'a> SourceMap<'a> {
    fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        SourceMap {
            starts,
            lines: source.lines().collect(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }

    /// Line of the `def`/`class` header itself. Statement ranges may start at
    /// the first decorator; a decorated definition must report where the code
    /// is actually written.
    fn header_line(&self, offset: usize, keywords: &[&str]) -> usize {
        let first = self.line_of(offset);
        for lineno in first..=self.lines.len() {
            let text = self.lines[lineno - 1].trim_start();
            if keywords.iter().any(|k| text.starts_with(k)) {
                return lineno;
            }
        }
        first
    }
}

fn collect(
    stmts: &[ast::Stmt],
    module_name: &str,
    is_package: bool,
    map: &SourceMap,
    symbols: &mut Vec<Symbol>,
    exports: &mut Vec<String>,
) {
    for stmt in stmts {
        match stmt {
            ast::Stmt::FunctionDef(def) => symbols.push(Symbol {
                name: def.name.as_str().to_string(),
                line: map.header_line(def.range.start().to_usize(), &["def "]),
                kind: SymbolKind::Function,
            }),
            ast::Stmt::AsyncFunctionDef(def) => symbols.push(Symbol {
                name: def.name.as_str().to_string(),
                line: map.header_line(def.range.start().to_usize(), &["async def ", "def "]),
                kind: SymbolKind::Function,
            }),
            ast::Stmt::ClassDef(def) => symbols.push(Symbol {
                name: def.name.as_str().to_string(),
                line: map.header_line(def.range.start().to_usize(), &["class "]),
                kind: SymbolKind::Class,
            }),
            ast::Stmt::Assign(assign) => {
                let line = map.line_of(assign.range.start().to_usize());
                let link = link_for(&assign.value);
                for target in &assign.targets {
                    match target {
                        ast::Expr::Name(name) if name.id.as_str() == "__all__" => {
                            exports.extend(string_list(&assign.value));
                        }
                        ast::Expr::Name(name) => symbols.push(Symbol {
                            name: name.id.as_str().to_string(),
                            line,
                            kind: SymbolKind::Binding { link: link.clone() },
                        }),
                        ast::Expr::Tuple(tuple) => {
                            for elt in &tuple.elts {
                                if let ast::Expr::Name(name) = elt {
                                    symbols.push(Symbol {
                                        name: name.id.as_str().to_string(),
                                        line,
                                        kind: SymbolKind::Binding { link: None },
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            ast::Stmt::AnnAssign(assign) => {
                if let ast::Expr::Name(name) = assign.target.as_ref() {
                    let link = assign.value.as_deref().and_then(link_for);
                    symbols.push(Symbol {
                        name: name.id.as_str().to_string(),
                        line: map.line_of(assign.range.start().to_usize()),
                        kind: SymbolKind::Binding { link },
                    });
                }
            }
            ast::Stmt::AugAssign(assign) => {
                // __all__ += [...] extends the export list
                if let ast::Expr::Name(name) = assign.target.as_ref()
                    && name.id.as_str() == "__all__"
                {
                    exports.extend(string_list(&assign.value));
                }
            }
            ast::Stmt::Import(import) => {
                let line = map.line_of(import.range.start().to_usize());
                for alias in &import.names {
                    let module = alias.name.as_str();
                    let (bound, target) = match &alias.asname {
                        Some(asname) => (asname.as_str().to_string(), module.to_string()),
                        None => {
                            // `import x.y` binds the top-level name only
                            let top = module.split('.').next().unwrap_or(module);
                            (top.to_string(), top.to_string())
                        }
                    };
                    symbols.push(Symbol {
                        name: bound,
                        line,
                        kind: SymbolKind::Binding {
                            link: Some(Link::Import {
                                module: target,
                                name: None,
                            }),
                        },
                    });
                }
            }
            ast::Stmt::ImportFrom(import) => {
                let line = map.line_of(import.range.start().to_usize());
                let level = import.level.as_ref().map_or(0, |l| l.to_u32());
                let source = import_source(
                    module_name,
                    is_package,
                    level,
                    import.module.as_ref().map(|m| m.as_str()),
                );
                for alias in &import.names {
                    let imported = alias.name.as_str();
                    if imported == "*" {
                        continue;
                    }
                    let bound = alias.asname.as_ref().map_or(imported, |a| a.as_str());
                    let link = source.as_ref().map(|m| Link::Import {
                        module: m.clone(),
                        name: Some(imported.to_string()),
                    });
                    symbols.push(Symbol {
                        name: bound.to_string(),
                        line,
                        kind: SymbolKind::Binding { link },
                    });
                }
            }
            // Bindings made inside conditional, guarded, or looping statements
            // at the top level still land in the module namespace.
            ast::Stmt::If(stmt) => {
                collect(&stmt.body, module_name, is_package, map, symbols, exports);
                collect(&stmt.orelse, module_name, is_package, map, symbols, exports);
            }
            ast::Stmt::For(stmt) => {
                if let ast::Expr::Name(name) = stmt.target.as_ref() {
                    symbols.push(Symbol {
                        name: name.id.as_str().to_string(),
                        line: map.line_of(stmt.range.start().to_usize()),
                        kind: SymbolKind::Binding { link: None },
                    });
                }
                collect(&stmt.body, module_name, is_package, map, symbols, exports);
                collect(&stmt.orelse, module_name, is_package, map, symbols, exports);
            }
            ast::Stmt::While(stmt) => {
                collect(&stmt.body, module_name, is_package, map, symbols, exports);
                collect(&stmt.orelse, module_name, is_package, map, symbols, exports);
            }
            ast::Stmt::With(stmt) => {
                collect(&stmt.body, module_name, is_package, map, symbols, exports);
            }
            ast::Stmt::Try(stmt) => {
                collect(&stmt.body, module_name, is_package, map, symbols, exports);
                collect(&stmt.orelse, module_name, is_package, map, symbols, exports);
                collect(&stmt.finalbody, module_name, is_package, map, symbols, exports);
                for handler in &stmt.handlers {
                    let ast::ExceptHandler::ExceptHandler(handler) = handler;
                    collect(&handler.body, module_name, is_package, map, symbols, exports);
                }
            }
            ast::Stmt::TryStar(stmt) => {
                collect(&stmt.body, module_name, is_package, map, symbols, exports);
                collect(&stmt.orelse, module_name, is_package, map, symbols, exports);
                collect(&stmt.finalbody, module_name, is_package, map, symbols, exports);
                for handler in &stmt.handlers {
                    let ast::ExceptHandler::ExceptHandler(handler) = handler;
                    collect(&handler.body, module_name, is_package, map, symbols, exports);
                }
            }
            _ => {}
        }
    }
}

/// Absolute dotted path a `from ... import` pulls from, or `None` when a
/// relative import escapes the top of the package tree.
fn import_source(
    module_name: &str,
    is_package: bool,
    level: u32,
    module: Option<&str>,
) -> Option<String> {
    if level == 0 {
        return module.map(str::to_string);
    }
    let mut base: Vec<&str> = module_name.split('.').collect();
    if !is_package {
        base.pop();
    }
    for _ in 1..level {
        if base.is_empty() {
            return None;
        }
        base.pop();
    }
    if let Some(module) = module {
        base.extend(module.split('.'));
    }
    if base.is_empty() {
        None
    } else {
        Some(base.join("."))
    }
}

fn link_for(value: &ast::Expr) -> Option<Link> {
    match value {
        ast::Expr::Name(name) => Some(Link::Alias(name.id.as_str().to_string())),
        ast::Expr::Call(call) => match call.func.as_ref() {
            ast::Expr::Name(name) => Some(Link::Instance(name.id.as_str().to_string())),
            _ => None,
        },
        _ => None,
    }
}

fn string_list(value: &ast::Expr) -> Vec<String> {
    let elts = match value {
        ast::Expr::List(list) => &list.elts,
        ast::Expr::Tuple(tuple) => &tuple.elts,
        _ => return Vec::new(),
    };
    elts.iter()
        .filter_map(|e| match e {
            ast::Expr::Constant(c) => match &c.value {
                ast::Constant::Str(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn index_source(source: &str) -> ModuleIndex {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mod.py");
        fs::write(&path, source).expect("Failed to write test file");
        index_module(
            "mod",
            &ModuleFile {
                path,
                is_package: false,
            },
        )
    }

    fn symbol<'a>(index: &'a ModuleIndex, name: &str) -> &'a Symbol {
        index.symbol(name).expect("symbol should exist")
    }

    #[test]
    fn test_function_and_class_lines() {
        let index = index_source("x = 1\n\ndef func():\n    pass\n\nclass Thing:\n    pass\n");
        assert_eq!(symbol(&index, "func").line, 3);
        assert_eq!(symbol(&index, "func").kind, SymbolKind::Function);
        assert_eq!(symbol(&index, "Thing").line, 6);
        assert_eq!(symbol(&index, "Thing").kind, SymbolKind::Class);
        assert_eq!(symbol(&index, "x").line, 1);
    }

    #[test]
    fn test_decorated_def_reports_def_line() {
        let index = index_source("import functools\n\n@functools.cache\n@other\ndef slow():\n    pass\n");
        assert_eq!(symbol(&index, "slow").line, 5);
    }

    #[test]
    fn test_decorated_class_reports_class_line() {
        let index = index_source("@register\nclass Widget:\n    pass\n");
        assert_eq!(symbol(&index, "Widget").line, 2);
    }

    #[test]
    fn test_async_def() {
        let index = index_source("@wraps\nasync def fetch():\n    pass\n");
        assert_eq!(symbol(&index, "fetch").line, 2);
        assert_eq!(symbol(&index, "fetch").kind, SymbolKind::Function);
    }

    #[test]
    fn test_dunder_all_exports() {
        let index = index_source("__all__ = [\"one\", \"two\"]\n__all__ += (\"three\",)\n");
        assert_eq!(index.exports, vec!["one", "two", "three"]);
        assert!(index.symbol("__all__").is_none());
    }

    #[test]
    fn test_alias_link() {
        let index = index_source("def real():\n    pass\n\npublic = real\n");
        assert_eq!(
            symbol(&index, "public").kind,
            SymbolKind::Binding {
                link: Some(Link::Alias("real".to_string()))
            }
        );
    }

    #[test]
    fn test_instance_link() {
        let index = index_source("class Config:\n    pass\n\nsettings = Config()\n");
        assert_eq!(
            symbol(&index, "settings").kind,
            SymbolKind::Binding {
                link: Some(Link::Instance("Config".to_string()))
            }
        );
    }

    #[test]
    fn test_import_links() {
        let index = index_source("import os.path\nimport json as j\nfrom collections import deque as dq\n");
        assert_eq!(
            symbol(&index, "os").kind,
            SymbolKind::Binding {
                link: Some(Link::Import {
                    module: "os".to_string(),
                    name: None
                })
            }
        );
        assert_eq!(
            symbol(&index, "j").kind,
            SymbolKind::Binding {
                link: Some(Link::Import {
                    module: "json".to_string(),
                    name: None
                })
            }
        );
        assert_eq!(
            symbol(&index, "dq").kind,
            SymbolKind::Binding {
                link: Some(Link::Import {
                    module: "collections".to_string(),
                    name: Some("deque".to_string())
                })
            }
        );
        assert!(index.symbol("deque").is_none());
    }

    #[test]
    fn test_wildcard_import_binds_nothing() {
        let index = index_source("from os import *\n");
        assert!(index.symbols.is_empty());
    }

    #[test]
    fn test_conditional_and_guarded_bindings() {
        let index = index_source(
            "try:\n    import ujson as json\nexcept ImportError:\n    import json\n\nif True:\n    flag = 1\nelse:\n    flag = 2\n",
        );
        assert!(index.symbol("json").is_some());
        assert!(index.symbol("flag").is_some());
    }

    #[test]
    fn test_loop_and_with_bindings() {
        let index = index_source(
            "for item in load():\n    latest = item\nelse:\n    done = 1\n\nwhile pending():\n    count = 1\n\nwith lock():\n    guarded = 2\n",
        );
        assert!(index.symbol("item").is_some());
        assert!(index.symbol("latest").is_some());
        assert!(index.symbol("done").is_some());
        assert!(index.symbol("count").is_some());
        assert!(index.symbol("guarded").is_some());
    }

    #[test]
    fn test_rebinding_takes_last() {
        let index = index_source("name = 1\nname = 2\n");
        assert_eq!(symbol(&index, "name").line, 2);
    }

    #[test]
    fn test_relative_import_source() {
        assert_eq!(
            import_source("pkg", true, 1, Some("sibling")),
            Some("pkg.sibling".to_string())
        );
        assert_eq!(
            import_source("pkg.mod", false, 1, Some("sibling")),
            Some("pkg.sibling".to_string())
        );
        assert_eq!(import_source("pkg.sub", true, 2, None), Some("pkg".to_string()));
        assert_eq!(import_source("top", false, 2, Some("x")), None);
        assert_eq!(
            import_source("anything", false, 0, Some("os.path")),
            Some("os.path".to_string())
        );
    }

    #[test]
    fn test_unparseable_source_degrades_to_empty() {
        let index = index_source("def broken(:\n");
        assert!(index.symbols.is_empty());
        assert!(index.exports.is_empty());
    }

    #[test]
    fn test_extension_module_has_no_symbols() {
        let temp_dir = TempDir::new().unwrap();
        let path: PathBuf = temp_dir.path().join("speedups.so");
        fs::write(&path, b"\x7fELF").unwrap();
        let index = index_module(
            "speedups",
            &ModuleFile {
                path,
                is_package: false,
            },
        );
        assert!(index.symbols.is_empty());
    }
}
