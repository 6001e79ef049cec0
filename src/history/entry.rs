use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One recorded clipboard capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identifier, never reused
    pub index: u64,
    /// Captured text, stored untruncated
    pub content: String,
    /// Capture time
    pub timestamp: DateTime<Utc>,
    /// Byte length of `content`
    pub size: u64,
}

impl Entry {
    pub fn new(index: u64, content: String, timestamp: DateTime<Utc>) -> Self {
        let size = content.len() as u64;
        Self {
            index,
            content,
            timestamp,
            size,
        }
    }

    /// Case-insensitive substring match
    pub fn matches(&self, query: &str) -> bool {
        self.content.to_lowercase().contains(&query.to_lowercase())
    }

    /// Time elapsed since capture; zero for timestamps in the future
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.timestamp).max(Duration::zero())
    }

    pub fn age_in_days(&self, now: DateTime<Utc>) -> f64 {
        self.age(now).num_seconds() as f64 / SECONDS_PER_DAY
    }

    pub fn is_within_days(&self, now: DateTime<Utc>, days: u32) -> bool {
        self.age(now) <= Duration::days(i64::from(days))
    }

    /// Single-line preview at most `width` columns wide.
    ///
    /// Whitespace runs that break lines are flattened to spaces and the text
    /// is cut on grapheme boundaries, with `...` marking a cut.
    pub fn preview(&self, width: usize) -> String {
        let flat: String = self
            .content
            .chars()
            .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
            .collect();

        if flat.width() <= width {
            return flat;
        }

        let budget = width.saturating_sub(3);
        let mut out = String::new();
        let mut used = 0;
        for grapheme in flat.graphemes(true) {
            let w = grapheme.width();
            if used + w > budget {
                break;
            }
            out.push_str(grapheme);
            used += w;
        }
        out.push_str("...");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_size_is_byte_length() {
        let entry = Entry::new(0, "héllo".to_string(), at(1, 0));
        assert_eq!(entry.size, 6);
    }

    #[test]
    fn test_matches_ignores_case() {
        let entry = Entry::new(0, "Hello World".to_string(), at(1, 0));
        assert!(entry.matches("world"));
        assert!(entry.matches("HELLO"));
        assert!(!entry.matches("planet"));
    }

    #[test]
    fn test_age_in_days() {
        let entry = Entry::new(0, "x".to_string(), at(1, 0));
        assert_eq!(entry.age_in_days(at(3, 12)), 2.5);
        // Clock skew: future captures are treated as brand new
        assert_eq!(entry.age_in_days(at(1, 0) - Duration::hours(1)), 0.0);
    }

    #[test]
    fn test_is_within_days_boundary() {
        let entry = Entry::new(0, "x".to_string(), at(1, 0));
        assert!(entry.is_within_days(at(3, 0), 2));
        assert!(!entry.is_within_days(at(3, 1), 2));
    }

    #[test]
    fn test_preview_short_content_untouched() {
        let entry = Entry::new(0, "line one\nline two".to_string(), at(1, 0));
        assert_eq!(entry.preview(60), "line one line two");
    }

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        let entry = Entry::new(0, "a".repeat(100), at(1, 0));
        let preview = entry.preview(10);
        assert_eq!(preview, format!("{}...", "a".repeat(7)));
        assert_eq!(entry.content.len(), 100);
    }

    #[test]
    fn test_preview_respects_wide_characters() {
        let entry = Entry::new(0, "日本語のテキストです".to_string(), at(1, 0));
        // Each character is two columns wide
        assert_eq!(entry.preview(9), "日本語...");
    }
}
