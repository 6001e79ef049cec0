//! On-disk format of the history file.
//!
//! The file is a pretty-printed JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "next_index": 3,
//!   "entries": [ { "index": 0, "content": "...", "timestamp": "...", "size": 5 }, ... ]
//! }
//! ```
//!
//! Saves go through `<file>.tmp` followed by a rename, so readers only ever
//! observe a complete document. Writers serialize on an exclusive lock held on
//! `<file>.lock`.

use super::entry::Entry;
use super::error::{HistoryError, HistoryResult};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

/// Everything stored in the history file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFile {
    pub version: u32,
    /// Index handed to the next appended entry
    pub next_index: u64,
    /// Entries in capture order
    pub entries: Vec<Entry>,
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            next_index: 0,
            entries: Vec::new(),
        }
    }
}

impl HistoryFile {
    /// Read the history file. A missing file is an empty history.
    pub fn load(path: &Path) -> HistoryResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(corrupt(path, "file is not valid UTF-8"))
            }
            Err(e) => return Err(HistoryError::io(path, e)),
        };

        let file: HistoryFile =
            serde_json::from_str(&text).map_err(|e| corrupt(path, e.to_string()))?;
        file.validate(path)?;
        Ok(file)
    }

    fn validate(&self, path: &Path) -> HistoryResult<()> {
        if self.version != FORMAT_VERSION {
            return Err(corrupt(
                path,
                format!("unsupported format version {}", self.version),
            ));
        }

        let mut previous: Option<u64> = None;
        for entry in &self.entries {
            if entry.size != entry.content.len() as u64 {
                return Err(corrupt(
                    path,
                    format!(
                        "entry {} records size {} for {} bytes",
                        entry.index,
                        entry.size,
                        entry.content.len()
                    ),
                ));
            }
            if previous.is_some_and(|p| entry.index <= p) || entry.index >= self.next_index {
                return Err(corrupt(
                    path,
                    format!("entry index {} is out of sequence", entry.index),
                ));
            }
            previous = Some(entry.index);
        }
        Ok(())
    }

    /// Atomically replace the history file with this document.
    pub fn save(&self, path: &Path) -> HistoryResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| {
            HistoryError::io(path, std::io::Error::new(ErrorKind::InvalidData, e))
        })?;

        let tmp_path = sibling(path, "tmp");
        {
            let mut tmp = File::create(&tmp_path).map_err(|e| HistoryError::io(&tmp_path, e))?;
            tmp.write_all(json.as_bytes())
                .and_then(|_| tmp.sync_all())
                .map_err(|e| HistoryError::io(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, path).map_err(|e| HistoryError::io(path, e))?;
        sync_parent(path)
    }
}

/// Exclusive writer lock, released on drop
pub struct WriteLock {
    file: File,
}

impl WriteLock {
    /// Block until no other process holds the lock for `history_path`.
    pub fn acquire(history_path: &Path) -> HistoryResult<Self> {
        let lock_path = sibling(history_path, "lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| HistoryError::io(&lock_path, e))?;
        file.lock_exclusive()
            .map_err(|e| HistoryError::io(&lock_path, e))?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            log::warn!("Failed to release history lock: {e}");
        }
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> HistoryError {
    HistoryError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// `history.json` -> `history.json.<ext>`
fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> HistoryResult<()> {
    // The rename is only durable once the directory entry is flushed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| HistoryError::io(parent, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> HistoryResult<()> {
    Ok(())
}
