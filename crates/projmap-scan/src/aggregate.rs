use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use projmap_core::{FileEntities, ParseFailure, ProjectMap, ProjmapError, Result, ScanConfig};
use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::extract::extract_entities;
use crate::parser::{parser_for, StructureParser};
use crate::walker::Scanner;

/// Observer for per-file progress during a scan.
///
/// Calls to [`Progress::advance`] arrive from worker threads in completion
/// order.
pub trait Progress: Sync {
    fn start(&self, _total: usize) {}
    fn advance(&self, _path: &Path) {}
    fn finish(&self) {}
}

/// A [`Progress`] that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Result of a completed scan.
#[derive(Debug)]
pub struct Analysis {
    /// The document to serialize.
    pub map: ProjectMap,
    /// Files that contributed no entities, sorted by path.
    pub failures: Vec<ParseFailure>,
    /// Number of candidate files the scanner found.
    pub candidates: usize,
}

impl Analysis {
    /// Number of files present in the map.
    pub fn parsed(&self) -> usize {
        self.map.files.len()
    }
}

/// Accumulates per-file results into a [`ProjectMap`].
///
/// Insertion methods take `&self` and serialize access internally, so one
/// aggregator can be shared by every worker of a pool.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use chrono::Utc;
/// use projmap_core::FileEntities;
/// use projmap_scan::aggregate::MapAggregator;
///
/// let aggregator = MapAggregator::new("demo", Utc::now());
/// aggregator.insert(Path::new("/demo/a.py"), FileEntities::default());
/// let analysis = aggregator.finish(1).unwrap();
/// assert_eq!(analysis.map.project_name, "demo");
/// assert!(analysis.map.files.contains_key("/demo/a.py"));
/// ```
#[derive(Debug)]
pub struct MapAggregator {
    project_name: String,
    analysis_timestamp: String,
    files: Mutex<BTreeMap<String, FileEntities>>,
    failures: Mutex<Vec<ParseFailure>>,
    processed: AtomicUsize,
}

impl MapAggregator {
    pub fn new(project_name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            project_name: project_name.into(),
            analysis_timestamp: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            files: Mutex::new(BTreeMap::new()),
            failures: Mutex::new(Vec::new()),
            processed: AtomicUsize::new(0),
        }
    }

    /// Record the entities of a successfully parsed file.
    ///
    /// Map keys must be exact, so a path that is not valid UTF-8 is recorded
    /// as a failure instead.
    pub fn insert(&self, path: &Path, entities: FileEntities) {
        let Some(key) = path.to_str() else {
            self.record_failure(non_utf8_path(path));
            return;
        };
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entities);
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a file that failed to read or parse.
    pub fn record_failure(&self, failure: ParseFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure);
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    /// Files recorded so far, parsed or failed.
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Seal the map.
    ///
    /// Failures are sorted by path and logged at `warn`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjmapError::NoParsableFiles`] if no file was inserted.
    pub fn finish(self, candidates: usize) -> Result<Analysis> {
        let files = self
            .files
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut failures = self
            .failures
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        failures.sort();

        for failure in &failures {
            tracing::warn!(path = %failure.path.display(), "skipped: {}", failure.message);
        }
        for path in files.keys() {
            tracing::debug!(path = %path, "parsed");
        }

        if files.is_empty() {
            return Err(ProjmapError::NoParsableFiles {
                candidates,
                failed: failures.len(),
            });
        }

        Ok(Analysis {
            map: ProjectMap {
                project_name: self.project_name,
                analysis_timestamp: self.analysis_timestamp,
                files,
            },
            failures,
            candidates,
        })
    }
}

/// Map the project at `root`.
///
/// Scans for candidates, then parses and extracts each one on a bounded
/// worker pool. A file that fails to read or parse is recorded as a
/// [`ParseFailure`] and the run continues.
///
/// # Errors
///
/// - [`ProjmapError::PathNotFound`] / [`ProjmapError::NotADirectory`] for a bad root
/// - [`ProjmapError::Cancelled`] if `cancel` trips before every file was processed
/// - [`ProjmapError::NoParsableFiles`] if no file parsed
pub fn analyze_project(
    root: &Path,
    config: &ScanConfig,
    cancel: &CancelToken,
    progress: &dyn Progress,
) -> Result<Analysis> {
    let started_at = Utc::now();
    let walk = Scanner::from_config(config).scan(root)?;
    let aggregator = MapAggregator::new(project_name(walk.root()), started_at);
    tracing::info!(
        root = %walk.root().display(),
        language = %config.language,
        "analyzing directory"
    );

    let mut candidates = Vec::new();
    for path in walk {
        if cancel.is_cancelled() {
            return Err(ProjmapError::Cancelled {
                processed: 0,
                total: candidates.len(),
            });
        }
        candidates.push(path);
    }
    tracing::debug!(count = candidates.len(), "candidate files found");

    let parser = parser_for(config.language);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .thread_name(|i| format!("projmap-worker-{i}"))
        .build()
        .map_err(|e| ProjmapError::Config(format!("failed to start worker pool: {e}")))?;

    progress.start(candidates.len());
    pool.install(|| {
        candidates.par_iter().for_each(|path| {
            if cancel.is_cancelled() {
                return;
            }
            match analyze_file(parser.as_ref(), path) {
                Ok(entities) => aggregator.insert(path, entities),
                Err(err) => aggregator.record_failure(ParseFailure {
                    path: path.clone(),
                    message: failure_message(err),
                }),
            }
            progress.advance(path);
        });
    });
    progress.finish();

    let processed = aggregator.processed();
    if processed < candidates.len() {
        return Err(ProjmapError::Cancelled {
            processed,
            total: candidates.len(),
        });
    }

    aggregator.finish(candidates.len())
}

/// Read, parse and extract one file.
///
/// # Errors
///
/// Returns [`ProjmapError::Io`] if the file cannot be read, or
/// [`ProjmapError::Parse`] if its path or content is not UTF-8 or it fails
/// to parse.
pub fn analyze_file(parser: &dyn StructureParser, path: &Path) -> Result<FileEntities> {
    if path.to_str().is_none() {
        return Err(ProjmapError::Parse {
            path: path.to_path_buf(),
            message: non_utf8_path(path).message,
        });
    }
    let bytes = std::fs::read(path)?;
    let source = String::from_utf8(bytes).map_err(|e| ProjmapError::Parse {
        path: path.to_path_buf(),
        message: format!("invalid UTF-8: {e}"),
    })?;
    let source = source.strip_prefix('\u{feff}').unwrap_or(&source);
    let tree = parser.parse(source, path)?;
    Ok(extract_entities(&tree))
}

fn non_utf8_path(path: &Path) -> ParseFailure {
    ParseFailure {
        path: path.to_path_buf(),
        message: "path is not valid UTF-8".into(),
    }
}

fn failure_message(err: ProjmapError) -> String {
    match err {
        ProjmapError::Parse { message, .. } => message,
        other => other.to_string(),
    }
}

/// Base name of the scan root, or the whole path when it has none (`/`).
fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}
