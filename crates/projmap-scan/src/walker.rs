use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use projmap_core::{ProjmapError, Result, ScanConfig};

/// Discovers candidate source files under a project root.
///
/// A file is a candidate when its extension is one of the configured
/// extensions. Directories whose name is on the deny-list are pruned with
/// their whole subtree.
///
/// # Examples
///
/// ```
/// use projmap_scan::walker::Scanner;
///
/// let scanner = Scanner::new(vec!["py".into()], vec![".git".into()]);
/// assert!(scanner.matches(std::path::Path::new("pkg/mod.py")));
/// assert!(!scanner.matches(std::path::Path::new("README.md")));
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
    respect_gitignore: bool,
}

impl Scanner {
    /// Create a scanner for the given extensions (without dots) and
    /// directory deny-list. `.gitignore` files are honored by default.
    pub fn new(extensions: Vec<String>, exclude_dirs: Vec<String>) -> Self {
        Self {
            extensions,
            exclude_dirs,
            respect_gitignore: true,
        }
    }

    /// Build a scanner from the `[scan]` configuration section.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.effective_extensions(), config.exclude_dirs.clone())
            .respect_gitignore(config.respect_gitignore)
    }

    /// Toggle `.gitignore` handling.
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.respect_gitignore = yes;
        self
    }

    /// Whether `path` passes the extension inclusion rule.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }

    /// Start a walk at `root`.
    ///
    /// The root is canonicalized, so every yielded path is absolute.
    /// Siblings are visited in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`ProjmapError::PathNotFound`] if `root` does not exist,
    /// [`ProjmapError::NotADirectory`] if it is not a directory, and
    /// [`ProjmapError::Io`] if it cannot be canonicalized.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use projmap_scan::walker::Scanner;
    ///
    /// let scanner = Scanner::new(vec!["py".into()], Vec::new());
    /// for path in scanner.scan(Path::new(".")).unwrap() {
    ///     println!("{}", path.display());
    /// }
    /// ```
    pub fn scan(&self, root: &Path) -> Result<SourceWalk> {
        if !root.exists() {
            return Err(ProjmapError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ProjmapError::NotADirectory(root.to_path_buf()));
        }
        let root = std::fs::canonicalize(root)?;

        let excluded: HashSet<OsString> = self.exclude_dirs.iter().map(OsString::from).collect();
        let inner = ignore::WalkBuilder::new(&root)
            .standard_filters(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .parents(self.respect_gitignore)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && excluded.contains(entry.file_name()))
            })
            .build();

        Ok(SourceWalk {
            root,
            inner,
            scanner: self.clone(),
        })
    }
}

/// A lazy, single-pass walk over candidate files.
///
/// Produced by [`Scanner::scan`]; once exhausted it yields nothing more.
pub struct SourceWalk {
    root: PathBuf,
    inner: ignore::Walk,
    scanner: Scanner,
}

impl SourceWalk {
    /// The canonical root this walk started from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for SourceWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            // Links are not followed while walking, so a linked file shows
            // up as a symlink. Keep it when its target is a regular file.
            if file_type.is_symlink() {
                if !entry.path().is_file() {
                    tracing::debug!(
                        path = %entry.path().display(),
                        "skipping symlink to non-file"
                    );
                    continue;
                }
            } else if !file_type.is_file() {
                continue;
            }

            if self.scanner.matches(entry.path()) {
                return Some(entry.into_path());
            }
        }
    }
}
