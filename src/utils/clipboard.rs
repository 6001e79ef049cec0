use anyhow::Result;

/// Something that can be polled for the current clipboard text
pub trait ClipboardSource {
    /// Current text, or `None` when the clipboard holds no text
    fn read_text(&mut self) -> Result<Option<String>>;
}

/// System clipboard
pub struct Clipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        let clipboard = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                log::warn!("System clipboard unavailable: {e}");
                None
            }
        };
        Self { clipboard }
    }

    /// Get text from clipboard
    pub fn get_text(&mut self) -> Result<String> {
        match &mut self.clipboard {
            Some(cb) => Ok(cb.get_text()?),
            None => anyhow::bail!("Clipboard not available"),
        }
    }

    /// Set text to clipboard
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        match &mut self.clipboard {
            Some(cb) => {
                cb.set_text(text)?;
                Ok(())
            }
            None => anyhow::bail!("Clipboard not available"),
        }
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSource for Clipboard {
    fn read_text(&mut self) -> Result<Option<String>> {
        if self.clipboard.is_none() {
            // The display server may have come up since the last poll
            self.clipboard = arboard::Clipboard::new().ok();
        }
        match self.get_text() {
            Ok(text) => Ok(Some(text)),
            // Images and other non-text content are not recorded
            Err(e) if is_non_text(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn is_non_text(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<arboard::Error>(),
        Some(arboard::Error::ContentNotAvailable)
    )
}
