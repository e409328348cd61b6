use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The aggregated document describing every successfully parsed file.
///
/// Field order is the serialization order: `project_name`,
/// `analysis_timestamp`, `files`. `files` is an ordered map, so identical
/// inputs always serialize to identical bytes apart from the timestamp.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use projmap_core::{FileEntities, ProjectMap};
///
/// let mut files = BTreeMap::new();
/// files.insert("/work/app/m.py".to_string(), FileEntities::default());
/// let map = ProjectMap {
///     project_name: "app".into(),
///     analysis_timestamp: "2024-01-01T00:00:00Z".into(),
///     files,
/// };
/// assert_eq!(map.files.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMap {
    /// Base name of the scanned root directory.
    pub project_name: String,
    /// ISO-8601 UTC instant captured when the scan started.
    pub analysis_timestamp: String,
    /// Absolute file path to that file's entities.
    pub files: BTreeMap<String, FileEntities>,
}

/// Structural facts extracted from one source file.
///
/// All three sequences are always serialized, empty or not.
///
/// # Examples
///
/// ```
/// use projmap_core::FileEntities;
///
/// let empty = FileEntities::default();
/// let json = serde_json::to_string(&empty).unwrap();
/// assert_eq!(json, r#"{"imports":[],"classes":[],"functions":[]}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntities {
    /// Import target names in source order, duplicates preserved.
    pub imports: Vec<String>,
    /// Classes declared at module scope, in source order.
    pub classes: Vec<ClassEntity>,
    /// Functions bound at module scope, in source order. Methods excluded.
    pub functions: Vec<String>,
}

impl FileEntities {
    /// Whether the file declared nothing we track.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.classes.is_empty() && self.functions.is_empty()
    }
}

/// A class and the methods declared directly in its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    pub methods: Vec<String>,
}

/// A file that was discovered but contributed no entities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParseFailure {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Human-readable cause.
    pub message: String,
}

/// Source language the scanner and parser adapters target.
///
/// # Examples
///
/// ```
/// use projmap_core::Language;
///
/// let lang: Language = "py".parse().unwrap();
/// assert_eq!(lang, Language::Python);
/// assert_eq!(lang.default_extensions(), &["py"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    JavaScript,
}

impl Language {
    /// Extensions (without the dot) scanned for this language by default.
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::JavaScript => &["js", "mjs", "cjs", "jsx"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::JavaScript => write!(f, "javascript"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::JavaScript),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}
