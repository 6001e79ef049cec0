use super::entry::Entry;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

/// How many days `busiest_days` reports
pub const BUSIEST_DAYS_SHOWN: usize = 5;

/// Aggregate figures over the whole history
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stats {
    pub total_count: usize,
    pub total_size_bytes: u64,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub newest_timestamp: Option<DateTime<Utc>>,
    pub average_size_bytes: f64,
    /// Distinct UTC days with at least one capture
    pub active_days: usize,
    /// Days with the most captures, busiest first
    pub busiest_days: Vec<(NaiveDate, usize)>,
}

impl Stats {
    pub fn compute(entries: &[Entry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let total_count = entries.len();
        let total_size_bytes: u64 = entries.iter().map(|e| e.size).sum();

        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for entry in entries {
            *per_day.entry(entry.timestamp.date_naive()).or_default() += 1;
        }
        let active_days = per_day.len();

        let mut busiest_days: Vec<(NaiveDate, usize)> = per_day.into_iter().collect();
        busiest_days.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        busiest_days.truncate(BUSIEST_DAYS_SHOWN);

        Self {
            total_count,
            total_size_bytes,
            oldest_timestamp: entries.iter().map(|e| e.timestamp).min(),
            newest_timestamp: entries.iter().map(|e| e.timestamp).max(),
            average_size_bytes: total_size_bytes as f64 / total_count as f64,
            active_days,
            busiest_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn entry(index: u64, content: &str, day: u32) -> Entry {
        let ts = Utc.with_ymd_and_hms(2024, 6, day, 10, index as u32, 0).unwrap();
        Entry::new(index, content.to_string(), ts)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let stats = Stats::compute(&[]);
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert_eq!(stats.average_size_bytes, 0.0);
        assert!(stats.oldest_timestamp.is_none());
        assert!(stats.newest_timestamp.is_none());
        assert!(stats.busiest_days.is_empty());
    }

    #[test]
    fn test_totals_and_average() {
        let entries = vec![entry(0, "ab", 1), entry(1, "abcd", 2), entry(2, "abcdef", 2)];
        let stats = Stats::compute(&entries);
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.total_size_bytes, 12);
        assert_eq!(stats.average_size_bytes, 4.0);
        assert_eq!(stats.oldest_timestamp, Some(entries[0].timestamp));
        assert_eq!(stats.newest_timestamp, Some(entries[2].timestamp));
    }

    #[test]
    fn test_busiest_days_ranked() {
        let entries = vec![
            entry(0, "a", 1),
            entry(1, "b", 3),
            entry(2, "c", 3),
            entry(3, "d", 4),
            entry(4, "e", 5),
            entry(5, "f", 6),
            entry(6, "g", 7),
            entry(7, "h", 7),
        ];
        let stats = Stats::compute(&entries);
        assert_eq!(stats.active_days, 6);
        assert_eq!(
            stats.busiest_days,
            vec![(date(7), 2), (date(3), 2), (date(6), 1), (date(5), 1), (date(4), 1)]
        );
    }
}
