use crate::error::{ProvisionError, Result};
use std::path::{Path, PathBuf};

/// Name of the scratch directory created next to the destination.
pub const STAGING_DIR_NAME: &str = "tmp";

/// Outcome of preparing the staging directory.
#[derive(Debug)]
pub enum DirCreation {
    Created,
    AlreadyExisted,
    Failed(std::io::Error),
}

impl DirCreation {
    pub fn is_usable(&self) -> bool {
        !matches!(self, DirCreation::Failed(_))
    }
}

/// `<absolute parent of destination>/tmp`
///
/// Two requests whose destinations share a parent directory share this
/// staging directory as well.
pub fn staging_dir_for(destination: &Path) -> Result<PathBuf> {
    let parent = match destination.parent() {
        Some(parent) if parent.as_os_str().is_empty() => std::env::current_dir()?,
        Some(parent) => {
            std::path::absolute(parent).map_err(|e| ProvisionError::file_system(parent, e))?
        }
        None => {
            return Err(ProvisionError::config_error(format!(
                "Destination {} has no parent directory",
                destination.display()
            )))
        }
    };

    Ok(parent.join(STAGING_DIR_NAME))
}

/// Create the staging directory (and any missing parents) if needed.
///
/// Never fails: a directory that cannot be created is reported and left for
/// the client to trip over.
pub fn create_staging_dir(path: &Path) -> DirCreation {
    if path.is_dir() {
        tracing::info!(staging_dir = %path.display(), "Tmp directory already exists.");
        return DirCreation::AlreadyExisted;
    }

    match std::fs::create_dir_all(path) {
        Ok(()) => {
            tracing::info!(staging_dir = %path.display(), "Tmp directory created.");
            DirCreation::Created
        }
        Err(e) => {
            tracing::error!(staging_dir = %path.display(), error = %e, "Could not create tmp directory");
            DirCreation::Failed(e)
        }
    }
}
