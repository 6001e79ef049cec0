use super::entry::Entry;
use super::error::{HistoryError, HistoryResult, RejectReason};
use super::file::{HistoryFile, WriteLock};
use super::stats::Stats;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Outcome of a successful append
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Appended {
    /// A new entry was stored
    Created(Entry),
    /// Content equals the newest entry, which is returned unchanged
    Duplicate(Entry),
}

impl Appended {
    pub fn entry(&self) -> &Entry {
        match self {
            Appended::Created(entry) | Appended::Duplicate(entry) => entry,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Appended::Created(_))
    }
}

/// Handle on a history file.
///
/// Reads are served from the snapshot loaded by [`HistoryStore::open`].
/// Every mutation takes the writer lock, reloads the file, applies the change
/// and saves before returning, so the file stays the only source of truth
/// even when a long-running monitor and a one-shot command share it.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    file: HistoryFile,
}

impl HistoryStore {
    /// Load the history stored at `path` (missing file = empty history)
    pub fn open(path: impl Into<PathBuf>) -> HistoryResult<Self> {
        let path = path.into();
        let file = HistoryFile::load(&path)?;
        log::debug!(
            "Loaded {} entries from {}",
            file.entries.len(),
            path.display()
        );
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in capture order
    #[cfg(test)]
    pub fn entries(&self) -> &[Entry] {
        &self.file.entries
    }

    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    /// Record `content` unless it is rejected or repeats the newest entry
    pub fn append(&mut self, content: &str, max_size: usize) -> HistoryResult<Appended> {
        self.append_at(content, max_size, Utc::now())
    }

    pub fn append_at(
        &mut self,
        content: &str,
        max_size: usize,
        now: DateTime<Utc>,
    ) -> HistoryResult<Appended> {
        if content.trim().is_empty() {
            return Err(HistoryError::Rejected(RejectReason::Empty));
        }
        if content.len() > max_size {
            return Err(HistoryError::Rejected(RejectReason::TooLarge {
                size: content.len(),
                max: max_size,
            }));
        }

        self.mutate(|file| {
            if let Some(last) = file.entries.last() {
                if last.content == content {
                    return (Appended::Duplicate(last.clone()), false);
                }
            }

            // Keep capture order monotonic if the wall clock stepped back
            let timestamp = file
                .entries
                .last()
                .map_or(now, |last| last.timestamp.max(now));
            let entry = Entry::new(file.next_index, content.to_string(), timestamp);
            file.next_index += 1;
            file.entries.push(entry.clone());
            (Appended::Created(entry), true)
        })
    }

    /// Newest-first view, optionally restricted to the last `since_days` days
    /// and to at most `limit` entries
    pub fn list(
        &self,
        limit: Option<usize>,
        since_days: Option<u32>,
    ) -> impl Iterator<Item = &Entry> + '_ {
        self.list_at(limit, since_days, Utc::now())
    }

    pub fn list_at(
        &self,
        limit: Option<usize>,
        since_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &Entry> + '_ {
        self.file
            .entries
            .iter()
            .rev()
            .filter(move |e| since_days.map_or(true, |days| e.is_within_days(now, days)))
            .take(limit.unwrap_or(usize::MAX))
    }

    /// Newest-first entries containing `query`, ignoring case
    pub fn search<'a>(
        &'a self,
        query: &'a str,
        limit: Option<usize>,
    ) -> HistoryResult<impl Iterator<Item = &'a Entry> + 'a> {
        if query.is_empty() {
            return Err(HistoryError::InvalidQuery);
        }
        Ok(self
            .file
            .entries
            .iter()
            .rev()
            .filter(move |e| e.matches(query))
            .take(limit.unwrap_or(usize::MAX)))
    }

    /// Look up an entry by its stable index
    pub fn get(&self, index: u64) -> HistoryResult<&Entry> {
        self.file
            .entries
            .binary_search_by_key(&index, |e| e.index)
            .map(|pos| &self.file.entries[pos])
            .map_err(|_| HistoryError::NotFound(index))
    }

    /// Remove everything, or only entries older than `since_days` days.
    /// Returns how many entries were removed.
    pub fn clear(&mut self, since_days: Option<u32>) -> HistoryResult<usize> {
        self.clear_at(since_days, Utc::now())
    }

    pub fn clear_at(
        &mut self,
        since_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> HistoryResult<usize> {
        let removed = self.mutate(|file| {
            let before = file.entries.len();
            match since_days {
                Some(days) => file.entries.retain(|e| e.is_within_days(now, days)),
                None => file.entries.clear(),
            }
            let removed = before - file.entries.len();
            (removed, removed > 0)
        })?;
        if removed > 0 {
            log::info!("Removed {removed} entries from {}", self.path.display());
        }
        Ok(removed)
    }

    pub fn stats(&self) -> Stats {
        Stats::compute(&self.file.entries)
    }

    /// Reload under the writer lock, apply `change`, and save when it reports
    /// a modification.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut HistoryFile) -> (T, bool),
    ) -> HistoryResult<T> {
        let _lock = WriteLock::acquire(&self.path)?;
        let mut file = HistoryFile::load(&self.path)?;
        let (out, changed) = change(&mut file);
        if changed {
            file.save(&self.path)?;
        }
        self.file = file;
        Ok(out)
    }
}
