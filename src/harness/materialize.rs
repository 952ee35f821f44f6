//! Workspace materialization
//!
//! Each fixture runs inside `<harness_root>/<name>`. The harness root is removed
//! and recreated before every fixture, so nothing written by the previous
//! fixture (sources, generated code, rendered manifests) can leak into the next.

use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use super::errors::MaterializationError;

/// The scratch directory a fixture is copied into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSlot {
    root: PathBuf,
    path: PathBuf,
}

impl HarnessSlot {
    /// Slot for `fixture_name`, which must be a single plain path component.
    ///
    /// Anything else (`""`, `.`, `..`, `a/b`, an absolute path) would put the
    /// slot at or above the harness root.
    pub fn new(harness_root: &Path, fixture_name: &str) -> Result<Self, MaterializationError> {
        let mut components = Path::new(fixture_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == fixture_name => Ok(Self {
                root: harness_root.to_path_buf(),
                path: harness_root.join(fixture_name),
            }),
            _ => Err(MaterializationError::InvalidFixtureName {
                name: fixture_name.to_string(),
            }),
        }
    }

    /// The shared harness root this slot lives in
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the fixture is copied into
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the harness root with everything in it, then recreate it empty.
    pub fn reset(&self) -> Result<(), MaterializationError> {
        let reset_err = |source| MaterializationError::ResetSlot {
            path: self.root.clone(),
            source,
        };
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(reset_err)?;
        }
        fs::create_dir_all(&self.root).map_err(reset_err)
    }
}

/// Recursively copy `source` into `target`.
///
/// File contents and permission bits are preserved; symlinks are recreated as
/// symlinks on Unix. Returns the number of regular files copied.
#[tracing::instrument(skip_all, fields(source = %source.display(), target = %target.display()))]
pub fn materialize(source: &Path, target: &Path) -> Result<usize, MaterializationError> {
    let mut copied = 0;
    // Directory permissions are applied last so read-only dirs can still be filled.
    let mut dir_permissions = Vec::new();

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|err| walk_error(source, err))?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let dest = target.join(relative);
        let copy_err = |err| MaterializationError::Copy {
            from: entry.path().to_path_buf(),
            to: dest.clone(),
            source: err,
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&dest).map_err(copy_err)?;
            let metadata = entry.metadata().map_err(|err| walk_error(source, err))?;
            dir_permissions.push((dest.clone(), metadata.permissions()));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest).map_err(copy_err)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(copy_err)?;
            }
            fs::copy(entry.path(), &dest).map_err(copy_err)?;
            copied += 1;
        }
    }

    for (dir, permissions) in dir_permissions.into_iter().rev() {
        fs::set_permissions(&dir, permissions).map_err(|err| MaterializationError::Copy {
            from: source.to_path_buf(),
            to: dir.clone(),
            source: err,
        })?;
    }

    tracing::debug!(files = copied, "fixture materialized");
    Ok(copied)
}

fn walk_error(source: &Path, err: walkdir::Error) -> MaterializationError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
    MaterializationError::Walk { path, source: err }
}

#[cfg(unix)]
fn copy_symlink(link: &Path, dest: &Path) -> std::io::Result<()> {
    let target = fs::read_link(link)?;
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, dest: &Path) -> std::io::Result<()> {
    fs::copy(link, dest).map(|_| ())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join("src/main.rs"), "mod services;");
        write(&src.path().join("src/services/lavish-rules"), "target rust {}");
        write(&src.path().join("src/services/double.lavish"), "fn double");
        fs::create_dir_all(src.path().join("empty")).unwrap();

        let target = dst.path().join("double");
        let copied = materialize(src.path(), &target).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read_to_string(target.join("src/main.rs")).unwrap(), "mod services;");
        assert_eq!(
            fs::read_to_string(target.join("src/services/double.lavish")).unwrap(),
            "fn double"
        );
        assert!(target.join("empty").is_dir());
    }

    #[test]
    fn test_missing_source_fails() {
        let dst = tempfile::tempdir().unwrap();
        let err = materialize(&dst.path().join("nope"), &dst.path().join("out")).unwrap_err();
        assert!(matches!(err, MaterializationError::Walk { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_preserves_permissions_and_symlinks() {
        use std::os::unix::fs::PermissionsExt;

        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let script = src.path().join("run.sh");
        write(&script, "#!/bin/sh\n");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        std::os::unix::fs::symlink("run.sh", src.path().join("link.sh")).unwrap();

        let target = dst.path().join("copy");
        materialize(src.path(), &target).unwrap();

        let mode = fs::metadata(target.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(fs::read_link(target.join("link.sh")).unwrap(), Path::new("run.sh"));
    }

    #[test]
    fn test_reset_clears_previous_occupant() {
        let root = tempfile::tempdir().unwrap();
        let harness_root = root.path().join("harness");
        write(&harness_root.join("double/leftover.txt"), "stale");

        let slot = HarnessSlot::new(&harness_root, "triple").unwrap();
        slot.reset().unwrap();

        assert!(harness_root.is_dir());
        assert_eq!(fs::read_dir(&harness_root).unwrap().count(), 0);
        assert_eq!(slot.path(), harness_root.join("triple"));
        assert_eq!(slot.root(), harness_root);
    }

    #[test]
    fn test_reset_creates_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let slot = HarnessSlot::new(&root.path().join("tmp/harness"), "double").unwrap();
        slot.reset().unwrap();
        assert!(root.path().join("tmp/harness").is_dir());
    }

    #[test]
    fn test_slot_rejects_names_outside_the_harness_root() {
        let root = tempfile::tempdir().unwrap();
        for name in ["", ".", "..", "a/b", "double/", "/abs", "./double"] {
            let err = HarnessSlot::new(root.path(), name).unwrap_err();
            assert!(
                matches!(&err, MaterializationError::InvalidFixtureName { name: n } if n == name),
                "{name:?} gave {err:?}"
            );
        }
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_slot_accepts_plain_names() {
        let root = tempfile::tempdir().unwrap();
        for name in ["double", "deep-paths", "with.dot", "..hidden"] {
            let slot = HarnessSlot::new(root.path(), name).unwrap();
            assert_eq!(slot.path(), root.path().join(name));
        }
    }
}
