//! Fixture discovery
//!
//! A fixture is any immediate subdirectory of the fixtures root. Names are
//! returned in lexical order so every run processes fixtures identically.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::DiscoveryError;

/// A self-contained sample project used as codegen test input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Directory basename
    pub name: String,
    /// Read-only source tree under the fixtures root
    pub source: PathBuf,
}

impl Fixture {
    pub fn new(fixtures_dir: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: fixtures_dir.join(&name),
            name,
        }
    }
}

/// Enumerate the fixtures to run.
///
/// The fixtures root must exist either way. With a `filter`, the result is
/// exactly that one fixture without listing the root: a missing or malformed
/// fixture name surfaces later as a materialization failure.
#[tracing::instrument(skip_all, fields(root = %fixtures_dir.display(), filter = ?filter))]
pub fn discover_fixtures(fixtures_dir: &Path, filter: Option<&str>) -> Result<Vec<Fixture>, DiscoveryError> {
    if !fixtures_dir.exists() {
        return Err(DiscoveryError::MissingRoot {
            path: fixtures_dir.to_path_buf(),
        });
    }

    if let Some(name) = filter {
        return Ok(vec![Fixture::new(fixtures_dir, name)]);
    }

    let unreadable = |source| DiscoveryError::Unreadable {
        path: fixtures_dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(fixtures_dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        if !entry.file_type().map_err(unreadable)?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!(name = ?raw, "skipping fixture directory with a non UTF-8 name"),
        }
    }
    names.sort();

    tracing::debug!(count = names.len(), "discovered fixtures");
    Ok(names.into_iter().map(|name| Fixture::new(fixtures_dir, name)).collect())
}
