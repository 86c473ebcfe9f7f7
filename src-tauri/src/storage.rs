use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tempfile::NamedTempFile;
use tracing::warn;
use walkdir::WalkDir;

/// A flat string key-value medium.
///
/// Media are best-effort by contract: `get` answers `None` for anything it
/// cannot produce, `set`/`remove` answer `false` instead of erroring. Callers
/// treat stored data as an opportunistic cache, so a failing medium degrades
/// the experience but never the control flow.
pub trait StorageMedium: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
    fn keys(&self) -> Vec<String>;
}

/// Long-lived medium: one file per key under a namespace directory.
///
/// Keys are percent-encoded into filenames, so namespaced keys like
/// `selections:abc/123` stay valid paths on every platform. Writes use a
/// temporary file in the same directory followed by an atomic rename, so an
/// interrupted write never leaves a partial file behind.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Open the medium rooted at `root`, creating the directory if needed.
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl StorageMedium for DiskStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read {:?}: {}", path, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> bool {
        let path = self.path_for(key);
        match write_atomic(&path, value) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write {:?}: {}", path, e);
                false
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("Failed to remove {:?}: {}", path, e);
                false
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            match urlencoding::decode(stem) {
                Ok(decoded) => keys.push(decoded.into_owned()),
                Err(e) => warn!("Skipping undecodable storage file {:?}: {}", name, e),
            }
        }
        keys
    }
}

/// Write `content` to `target` via a temp file in the same directory plus an
/// atomic rename.
fn write_atomic(target: &Path, content: &str) -> Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Target path has no parent directory: {:?}", target))?;

    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;

    temp.persist(target)?;
    Ok(())
}

/// Session-scoped medium: an in-process map, gone when the app exits.
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageMedium for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.map.lock().unwrap().remove(key);
        true
    }

    fn keys(&self) -> Vec<String> {
        self.map.lock().unwrap().keys().cloned().collect()
    }
}

/// The app's two storage media behind one handle.
///
/// Durable reads and writes prefer the disk medium and fall back to the
/// session map when the disk is unavailable or a write fails, so callers get
/// localStorage-like durability when possible and sessionStorage-like
/// behavior otherwise. Session-only records (step completion) use the
/// session medium directly via [`LocalStore::session`].
pub struct LocalStore {
    disk: Option<DiskStorage>,
    session: MemoryStorage,
}

impl LocalStore {
    /// Open the store rooted at `root`. If the directory cannot be created,
    /// the store degrades to memory-only for the rest of the session.
    pub fn open(root: &Path) -> Self {
        match DiskStorage::open(root) {
            Ok(disk) => Self {
                disk: Some(disk),
                session: MemoryStorage::new(),
            },
            Err(e) => {
                warn!(
                    "Storage directory {:?} unavailable, using in-memory storage: {}",
                    root, e
                );
                Self {
                    disk: None,
                    session: MemoryStorage::new(),
                }
            }
        }
    }

    /// A store with no disk medium at all.
    pub fn in_memory() -> Self {
        Self {
            disk: None,
            session: MemoryStorage::new(),
        }
    }

    /// Read from the durable chain: disk first, then the session map.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(ref disk) = self.disk {
            if let Some(value) = disk.get(key) {
                return Some(value);
            }
        }
        self.session.get(key)
    }

    /// Write to the preferred medium. A failed disk write falls back to the
    /// session map so the value at least survives until the app exits.
    pub fn set(&self, key: &str, value: &str) -> bool {
        if let Some(ref disk) = self.disk {
            if disk.set(key, value) {
                return true;
            }
            warn!("Durable write failed for '{}', keeping value in session storage", key);
        }
        self.session.set(key, value)
    }

    /// Remove from both media, so a fallback copy cannot resurrect the key.
    pub fn remove(&self, key: &str) -> bool {
        let disk_ok = match self.disk {
            Some(ref disk) => disk.remove(key),
            None => true,
        };
        self.session.remove(key) && disk_ok
    }

    /// Keys present on either medium, deduplicated.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = match self.disk {
            Some(ref disk) => disk.keys(),
            None => Vec::new(),
        };
        for key in self.session.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Whether a disk medium is attached, i.e. writes can outlive the app.
    pub fn durable(&self) -> bool {
        self.disk.is_some()
    }

    /// The session-scoped medium, for records that must not outlive the app.
    pub fn session(&self) -> &MemoryStorage {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disk_round_trip() {
        let dir = TempDir::new().unwrap();
        let disk = DiskStorage::open(dir.path()).unwrap();

        assert!(disk.set("selections:abc", "{\"selected_time\":20}"));
        assert_eq!(
            disk.get("selections:abc").as_deref(),
            Some("{\"selected_time\":20}")
        );
    }

    #[test]
    fn test_disk_get_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let disk = DiskStorage::open(dir.path()).unwrap();
        assert!(disk.get("selections:nope").is_none());
    }

    #[test]
    fn test_disk_keys_survive_awkward_characters() {
        let dir = TempDir::new().unwrap();
        let disk = DiskStorage::open(dir.path()).unwrap();

        let key = "selections:rec/1 spicy+sweet";
        assert!(disk.set(key, "x"));
        assert_eq!(disk.get(key).as_deref(), Some("x"));
        assert_eq!(disk.keys(), vec![key.to_string()]);
    }

    #[test]
    fn test_disk_set_overwrites() {
        let dir = TempDir::new().unwrap();
        let disk = DiskStorage::open(dir.path()).unwrap();

        disk.set("k", "one");
        disk.set("k", "two");
        assert_eq!(disk.get("k").as_deref(), Some("two"));
    }

    #[test]
    fn test_disk_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let disk = DiskStorage::open(dir.path()).unwrap();

        disk.set("k", "v");
        assert!(disk.remove("k"));
        assert!(disk.remove("k"));
        assert!(disk.get("k").is_none());
    }

    #[test]
    fn test_memory_round_trip() {
        let mem = MemoryStorage::new();
        assert!(mem.get("k").is_none());
        assert!(mem.set("k", "v"));
        assert_eq!(mem.get("k").as_deref(), Some("v"));
        assert!(mem.remove("k"));
        assert!(mem.get("k").is_none());
    }

    #[test]
    fn test_local_store_prefers_disk_but_reads_session() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path());

        store.set("durable", "d");
        store.session().set("ephemeral", "e");

        assert_eq!(store.get("durable").as_deref(), Some("d"));
        assert_eq!(store.get("ephemeral").as_deref(), Some("e"));
        // Durable values land on disk, not in the session map.
        assert!(store.session().get("durable").is_none());
    }

    #[test]
    fn test_local_store_falls_back_when_root_is_unusable() {
        let dir = TempDir::new().unwrap();
        // Occupy the root path with a plain file so the directory cannot exist.
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "not a directory").unwrap();

        let store = LocalStore::open(&blocked);
        assert!(store.set("k", "v"));
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_local_store_remove_clears_both_media() {
        let store = LocalStore::in_memory();
        store.set("k", "v");
        assert!(store.remove("k"));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_local_store_keys_union() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path());

        store.set("a", "1");
        store.session().set("b", "2");

        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
