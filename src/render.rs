//! Text output for the command line.
//!
//! Previews are cut to fixed widths: [`LIST_PREVIEW_WIDTH`] columns for
//! `list` and captures, [`SEARCH_PREVIEW_WIDTH`] for `search`. Only the
//! printed preview is cut; `get` prints the stored content in full.

use crate::history::{Entry, Stats};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

pub const LIST_PREVIEW_WIDTH: usize = 60;
pub const SEARCH_PREVIEW_WIDTH: usize = 80;
const RULE_WIDTH: usize = 70;

fn rule(c: char) -> String {
    std::iter::repeat(c).take(RULE_WIDTH).collect()
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Entries as printed by `list` and `search`
pub fn entry_list(title: &str, entries: &[&Entry], preview_width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title} ({} entries):", entries.len());
    let _ = writeln!(out, "{}", rule('='));
    for entry in entries {
        let _ = writeln!(
            out,
            "#{} [{}] ({})",
            entry.index,
            local_time(entry.timestamp),
            format_size(entry.size)
        );
        let _ = writeln!(out, "   {}", entry.preview(preview_width));
        out.push('\n');
    }
    out
}

/// A single entry with its full content, as printed by `get`
pub fn entry_detail(entry: &Entry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Entry #{}:", entry.index);
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "Timestamp: {}", local_time(entry.timestamp));
    let _ = writeln!(out, "Age: {:.1} days", entry.age_in_days(Utc::now()));
    let _ = writeln!(out, "Size: {} bytes", entry.size);
    let _ = writeln!(out, "Content:");
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "{}", entry.content);
    let _ = writeln!(out, "{}", rule('-'));
    out
}

/// One line announcing a new capture while monitoring
pub fn capture_line(entry: &Entry) -> String {
    format!(
        "[{}] Captured #{}: {}",
        entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        entry.index,
        entry.preview(LIST_PREVIEW_WIDTH)
    )
}

pub fn stats(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Clipboard History Statistics:");
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "Total Entries: {}", stats.total_count);
    let _ = writeln!(out, "Total Size: {}", format_size(stats.total_size_bytes));
    let _ = writeln!(out, "Average Entry Size: {:.0} bytes", stats.average_size_bytes);

    if let (Some(oldest), Some(newest)) = (stats.oldest_timestamp, stats.newest_timestamp) {
        let _ = writeln!(out, "Oldest Entry: {}", local_time(oldest));
        let _ = writeln!(out, "Newest Entry: {}", local_time(newest));
    }

    let _ = writeln!(out, "Days with Activity: {}", stats.active_days);
    if !stats.busiest_days.is_empty() {
        let _ = writeln!(out, "\nMost Active Days:");
        for (date, count) in &stats.busiest_days {
            let _ = writeln!(out, "  {date}: {count} entries");
        }
    }
    out
}
