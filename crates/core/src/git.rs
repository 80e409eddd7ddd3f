//! Local git integration: repo root discovery and conflicted-file
//! detection.
//!
//! This is the version-control collaborator for batch orchestration; the
//! engine itself never talks to git.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::GitError;

/// Find the working-tree root containing `start`, falling back to `start`
/// itself when it is not inside a repository (or the repo is bare).
pub fn discover_repo_root(start: &Path) -> PathBuf {
    match git2::Repository::discover(start) {
        Ok(repo) => repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| start.to_path_buf()),
        Err(_) => {
            debug!(start = %start.display(), "not a git repository, using start directory");
            start.to_path_buf()
        }
    }
}

/// List files with unresolved index conflicts, as absolute paths that
/// exist in the working tree.
pub fn detect_conflicted_files(repo_root: &Path) -> Result<Vec<PathBuf>, GitError> {
    let repo = git2::Repository::discover(repo_root)
        .map_err(|_| GitError::RepositoryNotFound(repo_root.display().to_string()))?;
    let workdir = repo
        .workdir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| repo_root.to_path_buf());

    let index = repo.index()?;
    let mut files = Vec::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        // Any present stage carries the path.
        let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
        if let Some(entry) = entry {
            let rel = PathBuf::from(String::from_utf8_lossy(&entry.path).to_string());
            let full = workdir.join(&rel);
            if full.exists() && !files.contains(&full) {
                files.push(full);
            }
        }
    }

    info!(count = files.len(), "detected conflicted files");
    Ok(files)
}
