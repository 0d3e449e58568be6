//! Helpers for tests that run fake icgc-get clients.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serializes writing and spawning scripts so a concurrent fork cannot hold
/// a freshly written script open (ETXTBSY).
pub(crate) fn spawn_guard() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Writes an executable `/bin/sh` script named `icgc-get` into `dir`.
#[cfg(unix)]
pub(crate) fn fake_client(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("icgc-get");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    make_executable(&path);
    path
}

#[cfg(unix)]
pub(crate) fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
