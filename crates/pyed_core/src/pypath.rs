use log::{debug, trace};
use path_clean::clean;
use std::{
    collections::HashSet,
    env,
    path::{Path, PathBuf},
    process::Command,
};

/// Ordered filesystem roots that top-level modules and packages are resolved
/// against. The static stand-in for an interpreter's `sys.path`.
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    roots: Vec<PathBuf>,
}

impl SearchPaths {
    /// Normalize and deduplicate, keeping first-seen order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let mut seen = HashSet::new();
        let roots = roots
            .into_iter()
            .map(|p| clean(&p))
            .filter(|p| seen.insert(p.clone()))
            .collect();
        SearchPaths { roots }
    }

    /// Assemble search roots for this invocation: explicit entries first,
    /// then `PYED_PATH`, `PYTHONPATH`, the current directory, and finally a
    /// best-effort probe of the environment's interpreter `sys.path`.
    pub fn from_environment(extra: &[PathBuf]) -> Self {
        let mut roots: Vec<PathBuf> = extra.to_vec();
        for key in ["PYED_PATH", "PYTHONPATH"] {
            if let Some(value) = env::var_os(key) {
                roots.extend(env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()));
            }
        }
        if let Ok(cwd) = env::current_dir() {
            roots.push(cwd);
        }
        roots.extend(interpreter_sys_path());
        let paths = Self::new(roots);
        debug!("Assembled {} search roots", paths.roots.len());
        paths
    }

    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Ask whatever `python3`/`python` is on PATH for its `sys.path`, so pyed
/// can be installed in its own environment and still resolve the caller's.
/// Failures are silently an empty list.
fn interpreter_sys_path() -> Vec<PathBuf> {
    for exe in ["python3", "python"] {
        let output = Command::new(exe)
            .args(["-c", "import sys; print('\\n'.join(p for p in sys.path if p))"])
            .output();
        match output {
            Ok(output) if output.status.success() => {
                let paths: Vec<PathBuf> = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .map(PathBuf::from)
                    .collect();
                trace!("{} reported {} sys.path entries", exe, paths.len());
                return paths;
            }
            Ok(_) => trace!("{} exited non-zero while probing sys.path", exe),
            Err(err) => trace!("Could not run {}: {}", exe, err),
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dedupes_and_cleans() {
        let paths = SearchPaths::new(vec![
            PathBuf::from("/lib/python/./site-packages"),
            PathBuf::from("/lib/python/site-packages"),
            PathBuf::from("/other"),
        ]);
        let roots: Vec<&Path> = paths.roots().collect();
        assert_eq!(
            roots,
            vec![
                Path::new("/lib/python/site-packages"),
                Path::new("/other")
            ]
        );
    }

    #[test]
    fn test_empty() {
        assert!(SearchPaths::new(Vec::new()).is_empty());
        assert!(!SearchPaths::new(vec![PathBuf::from("/x")]).is_empty());
    }
}
