use std::path::PathBuf;

/// Errors that can occur while mapping a project.
///
/// Library crates return this type directly; the binary renders it through
/// miette and maps it to a process exit code with [`ProjmapError::exit_code`].
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use projmap_core::ProjmapError;
///
/// let err = ProjmapError::PathNotFound(PathBuf::from("/no/such/dir"));
/// assert!(err.to_string().contains("/no/such/dir"));
/// assert_eq!(err.exit_code(), 2);
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ProjmapError {
    /// The scan root does not exist.
    #[error("path not found: {}", .0.display())]
    #[diagnostic(
        code(projmap::path_not_found),
        help("pass an existing directory to `projmap analyze`")
    )]
    PathNotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    #[diagnostic(
        code(projmap::not_a_directory),
        help("`projmap analyze` expects a project directory, not a single file")
    )]
    NotADirectory(PathBuf),

    /// A single source file could not be parsed.
    #[error("parse error in {}: {message}", .path.display())]
    #[diagnostic(code(projmap::parse))]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Human-readable cause, usually with a line and column.
        message: String,
    },

    /// Not a single candidate file could be parsed.
    #[error("no parsable files: {failed} of {candidates} candidate files failed to parse")]
    #[diagnostic(
        code(projmap::no_parsable_files),
        help("check the language and extensions settings, and the exclude list")
    )]
    NoParsableFiles {
        /// Number of files the scanner discovered.
        candidates: usize,
        /// Number of those that failed to parse.
        failed: usize,
    },

    /// The project map could not be written to its destination.
    #[error("failed to write {target}: {source}")]
    #[diagnostic(code(projmap::write))]
    Write {
        /// Output file path, or `<stdout>`.
        target: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The scan was stopped before every candidate file was processed.
    #[error("analysis cancelled after {processed} of {total} files")]
    #[diagnostic(code(projmap::cancelled))]
    Cancelled {
        /// Files that finished before the stop signal.
        processed: usize,
        /// Candidate files discovered by the scanner.
        total: usize,
    },

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(projmap::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(projmap::config))]
    Config(String),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(projmap::serialization))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(projmap::toml))]
    Toml(#[from] toml::de::Error),
}

impl ProjmapError {
    /// Process exit code for this error.
    ///
    /// Every fatal kind gets its own non-zero code; ambient failures
    /// (configuration, I/O, serialization) share `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProjmapError::PathNotFound(_) => 2,
            ProjmapError::NotADirectory(_) => 3,
            ProjmapError::NoParsableFiles { .. } => 4,
            ProjmapError::Write { .. } => 5,
            ProjmapError::Cancelled { .. } => 130,
            ProjmapError::Parse { .. }
            | ProjmapError::Io(_)
            | ProjmapError::Config(_)
            | ProjmapError::Serialization(_)
            | ProjmapError::Toml(_) => 1,
        }
    }
}
