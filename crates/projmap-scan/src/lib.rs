//! Project structure mapping via tree-sitter.
//!
//! Walks a project directory, parses every matching source file into a
//! parser-independent structural tree, extracts imports, classes with their
//! methods and top-level functions, and aggregates the results into one
//! [`ProjectMap`](projmap_core::ProjectMap). Uses the `ignore` crate for file
//! walking and rayon for file-level parallelism.

pub mod aggregate;
pub mod cancel;
pub mod extract;
pub mod output;
pub mod parser;
pub mod tree;
pub mod walker;

use std::path::Path;

use projmap_core::{Result, ScanConfig};

pub use aggregate::{analyze_project, Analysis, MapAggregator, NoProgress, Progress};
pub use cancel::CancelToken;

/// Map the project at `root` without cancellation or progress reporting.
///
/// # Errors
///
/// Returns [`ProjmapError`](projmap_core::ProjmapError) if the root cannot be scanned or no file parses.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use projmap_core::ScanConfig;
/// use projmap_scan::analyze;
///
/// let analysis = analyze(Path::new("."), &ScanConfig::default()).unwrap();
/// println!("{} files mapped", analysis.parsed());
/// ```
pub fn analyze(root: &Path, config: &ScanConfig) -> Result<Analysis> {
    analyze_project(root, config, &CancelToken::new(), &NoProgress)
}
