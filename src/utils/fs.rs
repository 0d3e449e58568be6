use crate::error::{ProvisionError, Result};
use std::fs::DirEntry;
use std::path::Path;

/// Lists the immediate children of `path`, sorted by file name.
pub fn read_dir_sorted(path: &Path) -> Result<Vec<DirEntry>> {
    let mut entries = std::fs::read_dir(path)
        .map_err(|e| ProvisionError::file_system(path, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| ProvisionError::file_system(path, e))?;

    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

/// Copies `from` onto `to`, replacing whatever file is already there.
pub fn copy_file_replacing(from: &Path, to: &Path) -> Result<u64> {
    std::fs::copy(from, to).map_err(|e| ProvisionError::file_system(to, e))
}

pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(windows)]
    {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("exe"))
            .unwrap_or(false)
    }
}
