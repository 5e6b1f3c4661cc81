//! JSON-file key-value storage.
//!
//! This file contains:
//! - the `KeyValueStore` trait the typed stores are built on
//! - `JsonFileStore`, the file-per-key implementation
//!
//! Typed access (conversations, pending actions) lives in the sibling
//! modules of store/.

use parking_lot::Mutex;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Injected storage seam. One JSON value per key; `put` replaces the whole
/// value for that key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, String>;
    fn put(&self, key: &str, value: Value) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

/// File-per-key store rooted at a directory. Each key maps to
/// `<root>/<sanitized key>.json`; writes go to a temporary sibling and are
/// renamed into place, so a reader never sees a half-written document.
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, String> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| format!("Failed to create store directory {}: {}", root.display(), e))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Keys become filenames; anything outside `[A-Za-z0-9_-]` maps to `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, String> {
        let path = self.path_for(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };
        let value = serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
        Ok(Some(value))
    }

    fn put(&self, key: &str, value: Value) -> Result<(), String> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&value)
            .map_err(|e| format!("Failed to serialize value for key {}: {}", key, e))?;

        let _guard = self.write_lock.lock();
        std::fs::write(&tmp, body)
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| format!("Failed to replace {}: {}", path.display(), e))
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Failed to remove {}: {}", path.display(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("kv")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_put_get_roundtrip() {
        let (_dir, store) = store();
        store.put("15551234567", json!({"a": 1})).unwrap();
        let value = store.get("15551234567").unwrap().unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_missing_key_is_none() {
        let (_dir, store) = store();
        assert_eq!(store.get("nobody").unwrap(), None);
    }

    #[test]
    fn test_put_replaces_value() {
        let (_dir, store) = store();
        store.put("k", json!([1])).unwrap();
        store.put("k", json!([1, 2])).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, store) = store();
        store.put("k", json!(true)).unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, store) = store();
        store.put("k", json!({})).unwrap();
        std::fs::write(store.path_for("k"), "{not json").unwrap();
        assert!(store.get("k").is_err());
    }

    #[test]
    fn test_key_sanitization() {
        let (_dir, store) = store();
        store.put("+49/151 ../x", json!("ok")).unwrap();
        assert_eq!(store.get("+49/151 ../x").unwrap().unwrap(), json!("ok"));
        // The raw key never reaches the filesystem
        assert_eq!(sanitize_key("+49/151 ../x"), "_49_151____x");
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (_dir, store) = store();
        store.put("k", json!(1)).unwrap();
        assert!(!store.path_for("k").with_extension("json.tmp").exists());
    }
}
