//! Workspace discovery
//!
//! A workspace is any directory that directly contains the marker file
//! (`lavish-rules` by default). The whole tree is walked depth-first in file
//! name order, so the same tree always yields the same sequence. Workspaces
//! nested inside other workspaces are reported on their own.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::errors::TraversalError;

/// A directory the compiler builds as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub path: PathBuf,
}

/// Find every workspace under `root` (including `root` itself).
#[tracing::instrument(skip_all, fields(root = %root.display(), marker = marker_file))]
pub fn locate_workspaces(root: &Path, marker_file: &str) -> Result<Vec<Workspace>, TraversalError> {
    let mut workspaces = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|err| TraversalError {
            path: err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            source: err.into(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if has_marker(entry.path(), marker_file)? {
            workspaces.push(Workspace {
                path: entry.into_path(),
            });
        }
    }

    tracing::debug!(count = workspaces.len(), "located workspaces");
    Ok(workspaces)
}

/// Whether `dir/marker_file` is a regular file (symlinks are followed).
///
/// Only a missing marker means "no"; any other metadata error is reported.
fn has_marker(dir: &Path, marker_file: &str) -> Result<bool, TraversalError> {
    let marker = dir.join(marker_file);
    match fs::metadata(&marker) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(TraversalError { path: marker, source }),
    }
}
