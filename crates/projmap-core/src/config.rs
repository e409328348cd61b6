use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProjmapError;
use crate::Result;
use crate::types::Language;

/// Top-level configuration loaded from `.projmap.toml`.
///
/// Resolution order: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use projmap_core::{Language, ProjmapConfig};
///
/// let config = ProjmapConfig::default();
/// assert_eq!(config.scan.language, Language::Python);
/// assert!(config.scan.exclude_dirs.iter().any(|d| d == ".git"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjmapConfig {
    /// Directory scanning and parsing settings.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl ProjmapConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjmapError::Io`] if the file cannot be read, or
    /// [`ProjmapError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use projmap_core::ProjmapConfig;
    /// use std::path::Path;
    ///
    /// let config = ProjmapConfig::from_file(Path::new(".projmap.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ProjmapError::Toml`] if parsing fails, or
    /// [`ProjmapError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use projmap_core::{Language, ProjmapConfig};
    ///
    /// let toml = r#"
    /// [scan]
    /// language = "javascript"
    /// jobs = 2
    /// "#;
    /// let config = ProjmapConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.scan.language, Language::JavaScript);
    /// assert_eq!(config.scan.jobs, Some(2));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.scan.validate()?;
        Ok(config)
    }
}

/// Scanner and worker-pool settings.
///
/// # Examples
///
/// ```
/// use projmap_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.effective_extensions(), vec!["py".to_string()]);
/// assert!(config.respect_gitignore);
/// assert_eq!(config.jobs, None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Language whose parser adapter is used.
    #[serde(default)]
    pub language: Language,
    /// File extensions to include. Empty means the language's defaults.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Directory names pruned from the walk, at any depth below the root.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    /// Honor `.gitignore` files while walking.
    #[serde(default = "default_respect_gitignore")]
    pub respect_gitignore: bool,
    /// Worker threads for parsing. `None` uses one per CPU.
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Stop the scan after this many seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        ".venv",
        "venv",
        "env",
        "__pycache__",
        "node_modules",
        ".tox",
        ".mypy_cache",
        ".pytest_cache",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_respect_gitignore() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            extensions: Vec::new(),
            exclude_dirs: default_exclude_dirs(),
            respect_gitignore: default_respect_gitignore(),
            jobs: None,
            timeout_secs: None,
        }
    }
}

impl ScanConfig {
    /// Extensions the scanner matches, without leading dots.
    pub fn effective_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            self.language
                .default_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect()
        } else {
            self.extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect()
        }
    }

    /// Reject values that cannot drive a scan.
    ///
    /// # Errors
    ///
    /// Returns [`ProjmapError::Config`] for a zero `jobs` or `timeout_secs`,
    /// or an empty extension entry.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == Some(0) {
            return Err(ProjmapError::Config("scan.jobs must be at least 1".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(ProjmapError::Config(
                "scan.timeout_secs must be at least 1".into(),
            ));
        }
        if self
            .extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').is_empty())
        {
            return Err(ProjmapError::Config(
                "scan.extensions must not contain empty entries".into(),
            ));
        }
        Ok(())
    }
}
