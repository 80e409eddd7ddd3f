//! Pre-edit file backups.
//!
//! Before the first write to a target file, a sibling snapshot is taken at
//! `<path>.imr.bak`. The operation is idempotent keyed by path: if the
//! backup already exists it is left untouched, so a second run backs up
//! whatever is on disk at that point rather than maintaining a history.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Suffix appended to the original path to form the backup path.
pub const BACKUP_SUFFIX: &str = ".imr.bak";

/// Idempotent one-shot backup of target files.
pub struct BackupManager;

impl BackupManager {
    /// The deterministic backup path for `path`.
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_os_string();
        os.push(BACKUP_SUFFIX);
        PathBuf::from(os)
    }

    /// Ensure a backup of `path` exists, copying the current on-disk
    /// content only when no backup is present. Returns the backup path.
    pub fn ensure_backup(path: &Path) -> io::Result<PathBuf> {
        let backup = Self::backup_path(path);
        if backup.exists() {
            debug!(backup = %backup.display(), "backup already exists, leaving untouched");
        } else {
            std::fs::copy(path, &backup)?;
            debug!(
                original = %path.display(),
                backup = %backup.display(),
                "created backup"
            );
        }
        Ok(backup)
    }
}
