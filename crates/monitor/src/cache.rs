//! Parsed copies of small reference files, reloaded only when the file's
//! modification time changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

/// A parsed file plus the mtime it was parsed at.
///
/// Read or parse failures keep the previously loaded data. Without a source
/// path the data stays at its default.
#[derive(Debug, Clone)]
pub struct FileCache<T> {
    source_path: Option<PathBuf>,
    last_loaded_at: Option<SystemTime>,
    data: T,
    parse: fn(&str) -> T,
}

impl<T: Default> FileCache<T> {
    pub fn new(source_path: Option<PathBuf>, parse: fn(&str) -> T) -> Self {
        Self {
            source_path,
            last_loaded_at: None,
            data: T::default(),
            parse,
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// mtime of the file the current data was parsed from
    pub fn last_loaded_at(&self) -> Option<SystemTime> {
        self.last_loaded_at
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Reload when the file changed since the last load. Returns whether the
    /// data was replaced.
    pub fn refresh(&mut self) -> bool {
        let Some(path) = self.source_path.as_deref() else {
            return false;
        };

        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cached file unavailable, keeping previous data"
                );
                return false;
            }
        };
        if self.last_loaded_at == Some(modified) {
            return false;
        }

        match fs::read_to_string(path) {
            Ok(text) => {
                self.data = (self.parse)(&text);
                self.last_loaded_at = Some(modified);
                info!(path = %path.display(), "Reloaded cached file");
                true
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cached file unreadable, keeping previous data"
                );
                false
            }
        }
    }

    /// [`refresh`](Self::refresh), then borrow the data
    pub fn refreshed(&mut self) -> &T {
        self.refresh();
        &self.data
    }
}
