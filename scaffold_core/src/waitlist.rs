//! # Waitlist
//!
//! Email signups collected before launch. Two stores implement
//! [`WaitlistStore`]: [`MemoryWaitlist`] keeps entries in process memory,
//! [`FileWaitlist`] persists them to a JSON document through
//! [`crate::file_io`].
//!
//! Emails are normalized (trimmed, lower-cased) before validation, so
//! `" Ada@Example.com "` and `"ada@example.com"` are the same signup.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::file_io::{load_waitlist, save_waitlist, FileLock};

/// Longest address accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

/// Owner name written into the waitlist lock file
const LOCK_OWNER: &str = "scaffold waitlist";

static EMAIL_PATTERN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$",
    )
});

/// One waitlist signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    fn new(email: String) -> Self {
        WaitlistEntry {
            id: Uuid::new_v4(),
            email,
            created_at: Utc::now(),
        }
    }
}

/// Normalize and validate an email address.
///
/// # Returns
///
/// * `Ok(String)` - The trimmed, lower-cased address
/// * `Err(CalcError::MissingField)` - Empty after trimming
/// * `Err(CalcError::ValidationError)` - Too long or not an address
pub fn normalize_email(raw: &str) -> CalcResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(CalcError::missing_field("email"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(CalcError::validation(
            "email",
            format!("{} characters", email.len()),
            format!("Email must be at most {} characters", MAX_EMAIL_LEN),
        ));
    }

    let pattern = EMAIL_PATTERN
        .as_ref()
        .map_err(|e| CalcError::internal(format!("email pattern: {}", e)))?;
    if !pattern.is_match(&email) {
        return Err(CalcError::validation(
            "email",
            email,
            "Please enter a valid email address",
        ));
    }
    Ok(email)
}

/// Storage for waitlist signups.
///
/// Implementations serialize their own mutation, so one store can be shared
/// across threads.
pub trait WaitlistStore: Send + Sync {
    /// Validate and record a new signup.
    ///
    /// Fails with `DuplicateEntry` when the normalized email is already present.
    fn add(&self, email: &str) -> CalcResult<WaitlistEntry>;

    /// All signups in the order they were added
    fn entries(&self) -> CalcResult<Vec<WaitlistEntry>>;
}

fn ensure_new(entries: &[WaitlistEntry], email: &str) -> CalcResult<()> {
    if entries.iter().any(|e| e.email == email) {
        return Err(CalcError::duplicate("email", email));
    }
    Ok(())
}

fn poisoned() -> CalcError {
    CalcError::internal("waitlist lock poisoned")
}

/// In-process waitlist
#[derive(Debug, Default)]
pub struct MemoryWaitlist {
    entries: Mutex<Vec<WaitlistEntry>>,
}

impl MemoryWaitlist {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaitlistStore for MemoryWaitlist {
    fn add(&self, email: &str) -> CalcResult<WaitlistEntry> {
        let email = normalize_email(email)?;
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        ensure_new(&entries, &email)?;

        let entry = WaitlistEntry::new(email);
        entries.push(entry.clone());
        Ok(entry)
    }

    fn entries(&self) -> CalcResult<Vec<WaitlistEntry>> {
        Ok(self.entries.lock().map_err(|_| poisoned())?.clone())
    }
}

/// Waitlist persisted to a JSON document.
///
/// Every add re-reads the document under an exclusive file lock, so several
/// processes can share one file.
#[derive(Debug)]
pub struct FileWaitlist {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileWaitlist {
    /// Open a waitlist document, checking that an existing file is readable.
    pub fn open(path: impl Into<PathBuf>) -> CalcResult<Self> {
        let path = path.into();
        let doc = load_waitlist(&path)?;
        tracing::info!(path = %path.display(), entries = doc.entries.len(), "opened waitlist");
        Ok(FileWaitlist {
            path,
            guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WaitlistStore for FileWaitlist {
    fn add(&self, email: &str) -> CalcResult<WaitlistEntry> {
        let email = normalize_email(email)?;
        let _guard = self.guard.lock().map_err(|_| poisoned())?;
        let _lock = FileLock::acquire(&self.path, LOCK_OWNER)?;

        let mut doc = load_waitlist(&self.path)?;
        ensure_new(&doc.entries, &email)?;

        let entry = WaitlistEntry::new(email);
        doc.entries.push(entry.clone());
        save_waitlist(&doc, &self.path)?;

        tracing::info!(id = %entry.id, total = doc.entries.len(), "waitlist signup stored");
        Ok(entry)
    }

    fn entries(&self) -> CalcResult<Vec<WaitlistEntry>> {
        let _guard = self.guard.lock().map_err(|_| poisoned())?;
        Ok(load_waitlist(&self.path)?.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;
    use std::sync::Arc;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("scaffold_waitlist_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        assert_eq!(normalize_email("first.last+tag@sub.example.co.uk").unwrap(), "first.last+tag@sub.example.co.uk");
    }

    #[test]
    fn test_invalid_emails() {
        for bad in ["plainaddress", "@example.com", "user@", "user@example", "a b@example.com", "user@-example.com"] {
            let err = normalize_email(bad).unwrap_err();
            assert_eq!(err.error_code(), "VALIDATION_ERROR", "{} should be rejected", bad);
        }
        assert_eq!(normalize_email("   ").unwrap_err(), CalcError::missing_field("email"));

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(normalize_email(&long), Err(CalcError::ValidationError { .. })));
    }

    #[test]
    fn test_memory_waitlist() {
        let store = MemoryWaitlist::new();
        let entry = store.add("new@example.com").unwrap();
        assert_eq!(entry.email, "new@example.com");

        let err = store.add(" NEW@example.com").unwrap_err();
        assert_eq!(err, CalcError::duplicate("email", "new@example.com"));

        store.add("second@example.com").unwrap();
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, entry.id);
    }

    #[test]
    fn test_invalid_email_is_not_stored() {
        let store = MemoryWaitlist::new();
        assert!(store.add("not-an-email").is_err());
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_file_waitlist_persists() {
        let path = temp_path("persist");
        let _ = fs::remove_file(&path);

        let store = FileWaitlist::open(&path).unwrap();
        assert!(store.entries().unwrap().is_empty());
        store.add("one@example.com").unwrap();
        store.add("two@example.com").unwrap();

        let reopened = FileWaitlist::open(&path).unwrap();
        let emails: Vec<String> = reopened.entries().unwrap().into_iter().map(|e| e.email).collect();
        assert_eq!(emails, vec!["one@example.com", "two@example.com"]);

        let err = reopened.add("ONE@example.com").unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_ENTRY");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_waitlist_concurrent_adds() {
        let path = temp_path("concurrent");
        let _ = fs::remove_file(&path);
        let store = Arc::new(FileWaitlist::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.add(&format!("user{}@example.com", i)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(store.entries().unwrap().len(), 8);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "[]").unwrap();
        assert!(FileWaitlist::open(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
