use log::debug;
use std::path::PathBuf;

use crate::error::ResolveError;
use crate::finder;
use crate::guess;
use crate::pypath::SearchPaths;
use crate::resolver;
use crate::types::ModuleCache;

/// The resolved name, its file, and the defining line when one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub name: String,
    pub file: PathBuf,
    pub line: Option<usize>,
}

/// Resolve an import path, possibly partial, to a source location.
///
/// Exact import first; on failure the best fuzzy guess gets exactly one
/// retry. A second failure is fatal, since the guess already was the best
/// available completion. The located file/line always belong to the entity
/// that was resolved here.
pub fn get_info(paths: &SearchPaths, cache: &ModuleCache, ipath: &str) -> Result<Info, ResolveError> {
    let mut name = ipath.to_string();
    let entity = match resolver::import_object(paths, ipath, cache) {
        Ok(entity) => entity,
        Err(err) => {
            debug!("Exact import of '{}' failed ({}), guessing", ipath, err);
            let guessed = guess::guess_module(paths, ipath, cache);
            match guessed.first() {
                Some(best) => {
                    debug!("Best guess for '{}' is '{}'", ipath, best);
                    name = best.clone();
                    resolver::import_object(paths, best, cache)?
                }
                None => {
                    return Err(ResolveError::NotFound {
                        input: ipath.to_string(),
                    });
                }
            }
        }
    };

    let Some(file) = finder::find_file(paths, &entity, cache) else {
        // a resolution without any file is itself not found
        return Err(ResolveError::NotFound {
            input: ipath.to_string(),
        });
    };
    let line = finder::find_source_line(paths, &entity, cache);
    Ok(Info { name, file, line })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn fixture() -> (TempDir, SearchPaths) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(
            root,
            "argparse.py",
            "class ArgumentError(Exception):\n    pass\n\nclass ArgumentParser:\n    def parse_args(self):\n        pass\n",
        );
        let paths = SearchPaths::new(vec![root.to_path_buf()]);
        (temp_dir, paths)
    }

    #[test]
    fn test_exact_resolution() {
        let (dir, paths) = fixture();
        let cache = ModuleCache::new();
        let info = get_info(&paths, &cache, "argparse.ArgumentParser").unwrap();
        assert_eq!(info.name, "argparse.ArgumentParser");
        assert_eq!(info.file, dir.path().join("argparse.py"));
        assert_eq!(info.line, Some(4));
    }

    #[test]
    fn test_fuzzy_fallback_resolves_partial_name() {
        let (dir, paths) = fixture();
        let cache = ModuleCache::new();
        let info = get_info(&paths, &cache, "argparse.ArgumentPars").unwrap();
        assert_eq!(info.name, "argparse.ArgumentParser");
        assert_eq!(info.file, dir.path().join("argparse.py"));
        assert_eq!(info.line, Some(4));
    }

    #[test]
    fn test_module_resolution_has_no_line() {
        let (dir, paths) = fixture();
        let cache = ModuleCache::new();
        let info = get_info(&paths, &cache, "argparse").unwrap();
        assert_eq!(info.name, "argparse");
        assert_eq!(info.file, dir.path().join("argparse.py"));
        assert_eq!(info.line, None);
    }

    #[test]
    fn test_nothing_matches_anywhere() {
        let (_dir, paths) = fixture();
        let cache = ModuleCache::new();
        let err = get_info(&paths, &cache, "qzqzqzqz").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                input: "qzqzqzqz".to_string()
            }
        );
        assert!(err.to_string().contains("qzqzqzqz"));
    }
}
