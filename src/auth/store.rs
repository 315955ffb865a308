//! Persisted key/value storage for credentials.
//!
//! Storage failures never escape this module: they are logged and a failed
//! read is reported as an absent key.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Key for the access token (short-lived bearer credential).
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key for the refresh token (long-lived, exchanged for new access tokens).
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key for the user-type marker ("admin" / "user").
pub const USER_TYPE_KEY: &str = "userType";

/// Every key that makes up the persisted credential record.
pub const AUTH_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_TYPE_KEY];

/// Pass-through key/value storage.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    /// Remove the [`AUTH_KEYS`]. Other entries are left alone.
    fn clear(&self);
}

/// Process-local store. Used by tests and by callers that do not want
/// credentials on disk.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
            }
            Err(_) => warn!(key, "Token store lock poisoned, dropping write"),
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            for key in AUTH_KEYS {
                entries.remove(key);
            }
        }
    }
}

/// JSON file store: one object of string keys, rewritten on every change.
///
/// Reads are served from memory, so a write is visible to the very next
/// read even if flushing to disk failed.
pub struct FileTokenStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Open the store at `path`. A missing or unreadable file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Err(e) = write_entries(&self.path, entries) {
            warn!(path = %self.path.display(), error = %e, "Failed to write credentials file");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!(key, "Token store lock poisoned, dropping write");
            return;
        };
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }

    fn clear(&self) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        for key in AUTH_KEYS {
            entries.remove(key);
        }
        if !entries.is_empty() {
            self.persist(&entries);
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove credentials file")
            }
        }
    }
}

fn load_entries(path: &Path) -> HashMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read credentials file");
            return HashMap::new();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Ignoring corrupt credentials file");
        HashMap::new()
    })
}

/// Write via a sibling temp file and rename, so readers never see a
/// half-written file.
fn write_entries(path: &Path, entries: &HashMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(entries).map_err(std::io::Error::other)?;
    let tmp = path.with_extension("tmp");

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp)?;
    file.write_all(&json)?;
    file.sync_all()?;
    std::fs::rename(&tmp, path)
}
