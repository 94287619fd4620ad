//! Atomic JSON files.
//!
//! Writes go to a sibling `*.json.tmp` file which is flushed to disk and then
//! renamed over the destination, so readers see either the old record or
//! the new one, never a torn write.

use crate::error::StorageError;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Serialize `value` and atomically replace `path` with it.
///
/// Parent directories are created as needed. On any failure the previous
/// contents of `path` are left untouched.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let tmp = tmp_path(path);
    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(&body)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(StorageError::io(&tmp, e));
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StorageError::io(path, e));
    }

    // Persist the rename itself; not supported on every platform.
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    debug!(path = %path.display(), bytes = body.len(), "Wrote JSON record");
    Ok(())
}

/// Read and decode `path`. A missing file is `Ok(None)`; a file that does not
/// decode is [`StorageError::Malformed`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| {
            warn!(path = %path.display(), error = %source, "Malformed JSON record");
            StorageError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })
}

/// A single typed record persisted at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFile<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Option<T>> {
        read_json(&self.path)
    }

    pub fn write(&self, value: &T) -> Result<()> {
        write_json_atomic(&self.path, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        value: f64,
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::<Record>::new(dir.path().join("nested").join("record.json"));

        assert_eq!(file.read().unwrap(), None);

        let record = Record {
            name: "mep".to_string(),
            value: 0.1 + 0.2,
        };
        file.write(&record).unwrap();

        assert_eq!(file.read().unwrap(), Some(record));
        assert!(!tmp_path(file.path()).exists());
    }

    #[test]
    fn test_failed_serialization_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        let original = Record {
            name: "ok".to_string(),
            value: 1.0,
        };
        write_json_atomic(&path, &original).unwrap();

        // tuple keys cannot be JSON object keys
        let mut bad = BTreeMap::new();
        bad.insert((1, 2), 3);
        assert_matches!(write_json_atomic(&path, &bad), Err(StorageError::Serialization(_)));

        assert_eq!(read_json::<Record>(&path).unwrap(), Some(original));
    }

    #[test]
    fn test_failed_temp_write_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        let original = Record {
            name: "ok".to_string(),
            value: 1.0,
        };
        write_json_atomic(&path, &original).unwrap();

        // a directory squatting on the temp path makes the write fail
        fs::create_dir(tmp_path(&path)).unwrap();
        let update = Record {
            name: "new".to_string(),
            value: 2.0,
        };
        assert_matches!(write_json_atomic(&path, &update), Err(StorageError::Io { .. }));

        assert_eq!(read_json::<Record>(&path).unwrap(), Some(original));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        fs::write(&path, b"{\"name\": \"trunc").unwrap();

        let err = read_json::<Record>(&path).unwrap_err();
        assert!(err.is_malformed());
    }
}
