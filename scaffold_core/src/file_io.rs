//! # File I/O Module
//!
//! Waitlist document storage with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Keep two processes from rewriting the same document
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! The waitlist is a JSON document `{ "version": "0.1.0", "entries": [...] }`.
//! The lock is a sibling file with a `.lock` suffix holding metadata about
//! the holder.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scaffold_core::file_io::{load_waitlist, save_waitlist, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("waitlist.json");
//! let lock = FileLock::acquire(path, "scaffold_web")?;
//! let mut doc = load_waitlist(path)?;
//! doc.entries.clear();
//! save_waitlist(&doc, path)?;
//! drop(lock);
//! # Ok::<(), scaffold_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::waitlist::WaitlistEntry;

/// Current waitlist document schema
pub const WAITLIST_SCHEMA_VERSION: &str = "0.1.0";

/// Locks older than this are taken over regardless of holder
const STALE_LOCK_HOURS: i64 = 1;

/// On-disk waitlist document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistFile {
    pub version: String,
    pub entries: Vec<WaitlistEntry>,
}

impl WaitlistFile {
    /// Empty document at the current schema version
    pub fn new() -> Self {
        WaitlistFile {
            version: WAITLIST_SCHEMA_VERSION.to_string(),
            entries: Vec::new(),
        }
    }
}

impl Default for WaitlistFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (service or tool name)
    pub owner: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(owner: impl Into<String>) -> Self {
        LockInfo {
            owner: owner.into(),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Exclusive lock guard over a data file; released on drop.
///
/// Holds an OS-level lock (via fs2) on the `.lock` file and records the
/// holder in it so a blocked caller can report who has it.
pub struct FileLock {
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on `path` without blocking.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired
    /// * `Err(CalcError::FileLocked)` - Another live process holds the lock
    pub fn acquire(path: &Path, owner: impl Into<String>) -> CalcResult<Self> {
        let lock_path = sibling_path(path, "lock");
        let info = LockInfo::new(owner);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !is_lock_stale(&existing) {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    format!("{} (pid {})", existing.owner, existing.pid),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            tracing::warn!(path = %lock_path.display(), holder = %existing.owner, "taking over stale lock");
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;
        lock_file.sync_all().map_err(|e| {
            CalcError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(FileLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of the lock on `path`, if any
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&sibling_path(path, "lock")).filter(|info| !is_lock_stale(info))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `waitlist.json` -> `waitlist.json.<suffix>`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let extension = path
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    sibling.set_extension(extension);
    sibling
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// A lock is stale when its process is gone or it has been held too long.
fn is_lock_stale(info: &LockInfo) -> bool {
    #[cfg(target_os = "linux")]
    {
        if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
            return true;
        }
    }

    (Utc::now() - info.locked_at).num_hours() >= STALE_LOCK_HOURS
}

/// Save the waitlist document with atomic write semantics.
///
/// 1. Serialize to JSON
/// 2. Write to a temporary sibling (.tmp)
/// 3. Sync to disk
/// 4. Rename over the target
pub fn save_waitlist(doc: &WaitlistFile, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(doc)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CalcError::file_error("create directory", parent.display().to_string(), e.to_string())
        })?;
    }

    let tmp_path = sibling_path(path, "tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load the waitlist document. A missing file is an empty waitlist.
///
/// # Returns
///
/// * `Ok(WaitlistFile)` - Loaded (or empty) document
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_waitlist(path: &Path) -> CalcResult<WaitlistFile> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(WaitlistFile::new()),
        Err(e) => {
            return Err(CalcError::file_error("read", path.display().to_string(), e.to_string()))
        }
    };

    let doc: WaitlistFile =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&doc.version)?;
    Ok(doc)
}

/// Major must match; in 0.x a newer minor is also rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(WAITLIST_SCHEMA_VERSION);

    let compatible = match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, file_minor, ..], [0, current_minor, ..]) => {
            *file_major == 0 && file_minor <= current_minor
        }
        ([file_major, ..], [current_major, ..]) => file_major == current_major,
        _ => false,
    };

    if compatible {
        Ok(())
    } else {
        Err(CalcError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: WAITLIST_SCHEMA_VERSION.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use uuid::Uuid;

    fn temp_waitlist_path(name: &str) -> PathBuf {
        temp_dir().join(format!("scaffold_test_{}_{}.json", name, std::process::id()))
    }

    fn entry(email: &str) -> WaitlistEntry {
        WaitlistEntry {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("/data/waitlist.json");
        assert_eq!(sibling_path(path, "lock"), Path::new("/data/waitlist.json.lock"));
        assert_eq!(sibling_path(path, "tmp"), Path::new("/data/waitlist.json.tmp"));
        assert_eq!(sibling_path(Path::new("/data/waitlist"), "lock"), Path::new("/data/waitlist.lock"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let doc = load_waitlist(&temp_waitlist_path("missing")).unwrap();
        assert!(doc.entries.is_empty());
        assert_eq!(doc.version, WAITLIST_SCHEMA_VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_waitlist_path("save_load");
        let mut doc = WaitlistFile::new();
        doc.entries.push(entry("a@example.com"));
        doc.entries.push(entry("b@example.com"));

        save_waitlist(&doc, &path).unwrap();
        assert!(!sibling_path(&path, "tmp").exists());

        let loaded = load_waitlist(&path).unwrap();
        assert_eq!(loaded, doc);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let path = temp_waitlist_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = load_waitlist(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_waitlist_path("lock");
        let lock_path = sibling_path(&path, "lock");

        let lock = FileLock::acquire(&path, "test").unwrap();
        assert_eq!(lock.info.owner, "test");
        assert!(lock_path.exists());
        assert!(FileLock::check(&path).is_some());

        let second = FileLock::acquire(&path, "other");
        assert!(matches!(second, Err(CalcError::FileLocked { .. })));

        drop(lock);
        assert!(!lock_path.exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_stale_lock() {
        let mut info = LockInfo::new("old");
        assert!(!is_lock_stale(&info));
        info.locked_at = Utc::now() - chrono::Duration::hours(2);
        assert!(is_lock_stale(&info));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(WAITLIST_SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
