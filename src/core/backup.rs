//! Backup copies of owner files, created per apply batch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::clip::CurveHost;

/// What to do with owner files before mutating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupPolicy {
    /// No backups.
    None,
    /// Keep backups after a successful batch.
    Keep,
    /// Create backups, delete them again when the batch had no owner-level
    /// errors.
    Temporary,
}

impl BackupPolicy {
    pub fn from_str(value: &str) -> crate::core::error::Result<Self> {
        match value {
            "none" => Ok(BackupPolicy::None),
            "keep" => Ok(BackupPolicy::Keep),
            "temporary" => Ok(BackupPolicy::Temporary),
            other => Err(crate::core::error::Error::validation_invalid_argument(
                "backup",
                "Expected 'none', 'keep', or 'temporary'",
                Some(other.to_string()),
            )),
        }
    }
}

/// Asset-store collaborator used for backup files. Filesystem in production,
/// in-memory in tests.
pub trait BackupStore {
    fn copy_asset(&mut self, src: &Path, dst: &Path) -> bool;
    fn delete_asset(&mut self, path: &Path) -> bool;
    fn file_exists(&self, path: &Path) -> bool;
}

/// Filesystem-backed store.
#[derive(Debug, Default)]
pub struct FsBackupStore;

impl BackupStore for FsBackupStore {
    fn copy_asset(&mut self, src: &Path, dst: &Path) -> bool {
        std::fs::copy(src, dst).is_ok()
    }

    fn delete_asset(&mut self, path: &Path) -> bool {
        std::fs::remove_file(path).is_ok()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Timestamped backup path next to the source, de-duplicated with a trailing
/// counter when the name is already taken: `walk_backup_20240131_120000.json`,
/// then `walk_backup_20240131_120000_1.json`, and so on. Unique within a
/// session, not globally.
pub fn backup_path_for(
    source: &Path,
    timestamp: DateTime<Local>,
    store: &dyn BackupStore,
) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string());
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    let stamp = timestamp.format("%Y%m%d_%H%M%S");

    let base = parent.join(format!("{}_backup_{}{}", stem, stamp, ext));
    if !store.file_exists(&base) {
        return base;
    }

    let mut counter = 1usize;
    loop {
        let candidate = parent.join(format!("{}_backup_{}_{}{}", stem, stamp, counter, ext));
        if !store.file_exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy the owner's source file to a fresh backup path. Failure is logged
/// and non-fatal: the apply proceeds without a backup for this owner.
pub fn create_backup(owner: &dyn CurveHost, store: &mut dyn BackupStore) -> Option<PathBuf> {
    let source = owner.source_path()?;
    let target = backup_path_for(source, Local::now(), store);

    if store.copy_asset(source, &target) {
        log_status!("backup", "{} -> {}", source.display(), target.display());
        Some(target)
    } else {
        log_status!(
            "backup",
            "Failed to back up {}; continuing without backup",
            source.display()
        );
        None
    }
}
