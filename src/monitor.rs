use crate::history::{Entry, HistoryResult, HistoryStore};
use crate::utils::clipboard::ClipboardSource;
use std::time::Duration;
use tokio::sync::watch;

/// Polls a clipboard and records every change into the history
pub struct Monitor<S> {
    source: S,
    store: HistoryStore,
    max_size: usize,
    interval: Duration,
    /// Last text read from the clipboard, recorded or not
    last_seen: Option<String>,
}

impl<S: ClipboardSource> Monitor<S> {
    pub fn new(source: S, store: HistoryStore, max_size: usize, interval: Duration) -> Self {
        Self {
            source,
            store,
            max_size,
            interval,
            last_seen: None,
        }
    }

    /// Read the clipboard once and append it if it changed.
    ///
    /// Returns the stored entry when one was created. Clipboard failures and
    /// rejected content are logged and skipped; only storage errors bubble up.
    pub fn poll_once(&mut self) -> HistoryResult<Option<Entry>> {
        let text = match self.source.read_text() {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(None),
            Err(e) => {
                log::warn!("Clipboard read failed: {e:#}");
                return Ok(None);
            }
        };

        if self.last_seen.as_deref() == Some(text.as_str()) {
            return Ok(None);
        }

        let result = self.store.append(&text, self.max_size);
        self.last_seen = Some(text);

        match result {
            Ok(appended) if appended.is_created() => {
                let entry = appended.entry();
                log::debug!("Stored entry #{} ({} bytes)", entry.index, entry.size);
                Ok(Some(entry.clone()))
            }
            Ok(_) => Ok(None),
            Err(e) if e.is_storage() => Err(e),
            Err(e) => {
                log::info!("Skipped clipboard content: {e}");
                Ok(None)
            }
        }
    }

    /// Poll until `shutdown` turns true or its sender goes away.
    ///
    /// The signal is checked between iterations only, so an append that has
    /// started always finishes. Returns the number of entries stored.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
        mut on_capture: impl FnMut(&Entry),
    ) -> HistoryResult<usize> {
        let mut captured = 0;
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            if let Some(entry) = self.poll_once()? {
                captured += 1;
                on_capture(&entry);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        log::info!("Monitoring stopped after {captured} captures");
        Ok(captured)
    }
}
