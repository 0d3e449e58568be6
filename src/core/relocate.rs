//! Moves the client's download out of the staging tree.
//!
//! icgc-get lays its output out as
//!
//! ```text
//! <staging>/
//!     <object folder>/
//!         logs/
//!         <payload file, or a folder holding it>
//! ```
//!
//! Staging entries with a `.` in their name are skipped, as are `logs`
//! folders. Entries are visited in name order.

use crate::error::Result;
use crate::utils::fs;
use std::path::{Path, PathBuf};

const LOGS_DIR: &str = "logs";

/// Copy the first payload file in `staging_dir` to `destination`.
///
/// Returns `Ok(false)` when the tree holds nothing to copy. Stops after the
/// first copy. Listing or copy failures are errors.
pub fn relocate(staging_dir: &Path, destination: &Path) -> Result<bool> {
    let Some(payload) = find_payload(staging_dir)? else {
        tracing::warn!(staging_dir = %staging_dir.display(), "No downloaded file found");
        return Ok(false);
    };

    fs::copy_file_replacing(&payload, destination).map_err(|e| {
        tracing::error!(error = %e, "Could not move input file");
        e
    })?;

    tracing::info!(
        from = %payload.display(),
        to = %destination.display(),
        "File copied to destination."
    );
    Ok(true)
}

/// Locate the file `relocate` would copy, without copying it.
pub fn find_payload(staging_dir: &Path) -> Result<Option<PathBuf>> {
    for object_folder in fs::read_dir_sorted(staging_dir)? {
        let name = object_folder.file_name();
        if name.to_string_lossy().contains('.') {
            tracing::debug!(entry = ?name, "Skipping hidden entry");
            continue;
        }

        let path = object_folder.path();
        if !path.is_dir() {
            continue;
        }

        if let Some(payload) = payload_in_object_folder(&path)? {
            return Ok(Some(payload));
        }
    }

    Ok(None)
}

fn payload_in_object_folder(object_folder: &Path) -> Result<Option<PathBuf>> {
    for entry in fs::read_dir_sorted(object_folder)? {
        if entry.file_name() == LOGS_DIR {
            continue;
        }

        let path = entry.path();
        if path.is_file() {
            return Ok(Some(path));
        }

        if path.is_dir() {
            let first_file = fs::read_dir_sorted(&path)?
                .into_iter()
                .map(|e| e.path())
                .find(|p| p.is_file());
            if first_file.is_some() {
                return Ok(first_file);
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn layout(files: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let staging = root.path().join("tmp");
        std::fs::create_dir_all(&staging).unwrap();
        for (relative, contents) in files {
            write(&staging, relative, contents);
        }
        let destination = root.path().join("out").join("data.bam");
        std::fs::create_dir_all(destination.parent().unwrap()).unwrap();
        (root, staging, destination)
    }

    #[test]
    fn test_relocate_payload_folder() {
        let (_root, staging, destination) = layout(&[
            ("FI509397/logs/run.log", "log"),
            ("FI509397/payload/data.bam", "BAM"),
        ]);

        assert!(relocate(&staging, &destination).unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "BAM");
    }

    #[test]
    fn test_relocate_payload_file_in_object_folder() {
        let (_root, staging, destination) = layout(&[
            ("FI509397/logs/run.log", "log"),
            ("FI509397/data.bam", "BAM"),
        ]);

        assert!(relocate(&staging, &destination).unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "BAM");
    }

    #[test]
    fn test_relocate_only_logs() {
        let (_root, staging, destination) = layout(&[("FI509397/logs/run.log", "log")]);

        assert!(!relocate(&staging, &destination).unwrap());
        assert!(!destination.exists());
    }

    #[test]
    fn test_relocate_empty_staging() {
        let (_root, staging, destination) = layout(&[]);
        assert!(!relocate(&staging, &destination).unwrap());
    }

    #[test]
    fn test_relocate_skips_dotted_folders() {
        let (_root, staging, destination) = layout(&[
            (".staging/payload/stale.bam", "stale"),
            ("FI1.partial/payload/half.bam", "half"),
        ]);

        assert!(!relocate(&staging, &destination).unwrap());
    }

    #[test]
    fn test_relocate_skips_only_exact_logs_name() {
        let (_root, staging, destination) = layout(&[
            ("FI1/logs/run.log", "log"),
            ("FI1/logs-archive/old.log", "archived"),
        ]);

        assert!(relocate(&staging, &destination).unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "archived");
    }

    #[test]
    fn test_relocate_continues_past_empty_object_folder() {
        let (_root, staging, destination) = layout(&[
            ("AAA/logs/run.log", "log"),
            ("BBB/payload/data.bam", "BAM"),
        ]);

        assert!(relocate(&staging, &destination).unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "BAM");
    }

    #[test]
    fn test_relocate_copies_only_first_candidate() {
        let (_root, staging, destination) = layout(&[
            ("FI1/payload/a.bam", "first"),
            ("FI1/payload/b.bam", "second"),
            ("FI2/payload/c.bam", "third"),
        ]);

        assert!(relocate(&staging, &destination).unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "first");
        assert_eq!(
            std::fs::read_dir(destination.parent().unwrap()).unwrap().count(),
            1
        );
    }

    #[test]
    fn test_relocate_overwrites_and_is_repeatable() {
        let (_root, staging, destination) = layout(&[("FI1/payload/data.bam", "fresh bytes")]);
        std::fs::write(&destination, "an older and much longer file").unwrap();

        assert!(relocate(&staging, &destination).unwrap());
        let first = std::fs::read(&destination).unwrap();
        assert!(relocate(&staging, &destination).unwrap());
        let second = std::fs::read(&destination).unwrap();

        assert_eq!(first, b"fresh bytes".to_vec());
        assert_eq!(first, second);
    }

    #[test]
    fn test_relocate_missing_staging_dir() {
        let root = tempfile::tempdir().unwrap();
        let err = relocate(&root.path().join("tmp"), &root.path().join("out")).unwrap_err();
        assert!(matches!(err, ProvisionError::FileSystem { .. }));
    }

    #[test]
    fn test_relocate_copy_failure_is_error() {
        let (_root, staging, destination) = layout(&[("FI1/payload/data.bam", "BAM")]);
        std::fs::create_dir_all(&destination).unwrap();

        let err = relocate(&staging, &destination).unwrap_err();
        assert!(matches!(err, ProvisionError::FileSystem { .. }));
    }

    #[test]
    fn test_find_payload() {
        let (_root, staging, _destination) = layout(&[("FI1/payload/data.bam", "BAM")]);
        assert_eq!(
            find_payload(&staging).unwrap(),
            Some(staging.join("FI1").join("payload").join("data.bam"))
        );
    }
}
