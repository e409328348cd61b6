use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use projmap_core::{ProjectMap, ProjmapError, Result};

/// Target label used in errors for the standard output stream.
pub const STDOUT_TARGET: &str = "<stdout>";

/// Serialize the map as pretty-printed JSON with a trailing newline.
///
/// Keys follow the schema order (`project_name`, `analysis_timestamp`,
/// `files`) and file paths are sorted, so identical maps give identical
/// bytes.
///
/// # Errors
///
/// Returns [`ProjmapError::Serialization`] if serialization fails.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use projmap_core::ProjectMap;
/// use projmap_scan::output::to_json;
///
/// let map = ProjectMap {
///     project_name: "demo".into(),
///     analysis_timestamp: "2024-01-01T00:00:00Z".into(),
///     files: BTreeMap::new(),
/// };
/// let json = to_json(&map).unwrap();
/// assert!(json.starts_with("{\n  \"project_name\": \"demo\""));
/// assert!(json.ends_with("}\n"));
/// ```
pub fn to_json(map: &ProjectMap) -> Result<String> {
    let mut json = serde_json::to_string_pretty(map)?;
    json.push('\n');
    Ok(json)
}

/// Write the map to `output`, or to stdout when `output` is `None`.
///
/// The file is created or truncated.
///
/// # Errors
///
/// Returns [`ProjmapError::Write`] naming the target if it cannot be
/// created or written.
pub fn write_map(map: &ProjectMap, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let target = path.display().to_string();
            let file = File::create(path).map_err(|source| ProjmapError::Write {
                target: target.clone(),
                source,
            })?;
            write_to(map, BufWriter::new(file), &target)
        }
        None => write_to(map, std::io::stdout().lock(), STDOUT_TARGET),
    }
}

/// Write the map to any sink. `target` names the sink in errors.
///
/// # Errors
///
/// Returns [`ProjmapError::Write`] if writing or flushing fails.
pub fn write_to<W: Write>(map: &ProjectMap, mut writer: W, target: &str) -> Result<()> {
    let json = to_json(map)?;
    writer
        .write_all(json.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|source| ProjmapError::Write {
            target: target.to_string(),
            source,
        })
}
