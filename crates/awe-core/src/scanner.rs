//! Directory scanner for discovering input tables

use crate::config::RunConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// List the input tables directly inside `dir`, sorted by path
///
/// The scan is not recursive. The run's own output file is skipped so that a
/// second run over the same directory does not read back its previous results.
/// Returns an empty list when nothing matches.
pub fn discover_tables<P: AsRef<Path>>(dir: P, config: &RunConfig) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            // The directory itself must be readable
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !has_extension(path, &config.extension) {
            continue;
        }
        if path.file_name().and_then(|name| name.to_str()) == Some(config.output_file_name.as_str())
        {
            debug!(path = %path.display(), "skipping previous output file");
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
