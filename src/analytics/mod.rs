//! Summary statistics and derived views over a snapshot of notes.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{DateKey, NoteEntry};

/// Number of days covered by [`recent`] when the caller has no preference.
pub const DEFAULT_RECENT_DAYS: u32 = 14;

/// Maximum preview length in chars for [`RecentNote::preview`].
pub const PREVIEW_CHARS: usize = 120;

/// Totals over all non-empty notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_entries: usize,
    pub total_chars: usize,
    pub total_words: usize,
    /// `total_chars / total_entries` rounded to nearest, `0` with no entries.
    pub avg_chars_per_entry: usize,
}

/// Folds `snapshot` into a [`Summary`]. Empty bodies are not counted.
pub fn summarize(snapshot: &[NoteEntry]) -> Summary {
    let mut summary = snapshot
        .iter()
        .filter(|entry| !entry.is_empty())
        .fold(Summary::default(), |mut acc, entry| {
            acc.total_entries += 1;
            acc.total_chars += entry.char_count();
            acc.total_words += entry.word_count();
            acc
        });
    summary.avg_chars_per_entry = rounded_average(summary.total_chars, summary.total_entries);
    summary
}

fn rounded_average(total: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (total + count / 2) / count
}

/// A note from the recent-activity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentNote {
    pub key: DateKey,
    pub preview: String,
    pub char_count: usize,
    pub word_count: usize,
}

/// Notes dated within the last `days` days up to and including `today`,
/// newest first. Blank notes are left out.
pub fn recent(snapshot: &[NoteEntry], today: NaiveDate, days: u32) -> Vec<RecentNote> {
    if days == 0 {
        return Vec::new();
    }
    let oldest = today - chrono::Duration::days(i64::from(days) - 1);

    let mut notes: Vec<RecentNote> = snapshot
        .iter()
        .filter(|entry| !entry.body.trim().is_empty())
        .filter(|entry| (oldest..=today).contains(&entry.key.date()))
        .map(|entry| RecentNote {
            key: entry.key,
            preview: preview(&entry.body),
            char_count: entry.char_count(),
            word_count: entry.word_count(),
        })
        .collect();
    notes.sort_by(|a, b| b.key.cmp(&a.key));
    notes
}

fn preview(body: &str) -> String {
    let mut chars = body.chars();
    let mut out: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

/// Days of `month` in `year` that hold a non-empty note, for calendar indicators.
pub fn noted_days(snapshot: &[NoteEntry], year: i32, month: u32) -> BTreeSet<u32> {
    snapshot
        .iter()
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.key.date())
        .filter(|date| date.year() == year && date.month() == month)
        .map(|date| date.day())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, body: &str) -> NoteEntry {
        NoteEntry::new(DateKey::parse(key).unwrap(), body)
    }

    fn day(s: &str) -> NaiveDate {
        DateKey::parse(s).unwrap().date()
    }

    #[test]
    fn test_summarize_empty_snapshot() {
        assert_eq!(
            summarize(&[]),
            Summary { total_entries: 0, total_chars: 0, total_words: 0, avg_chars_per_entry: 0 }
        );
    }

    #[test]
    fn test_summarize_skips_empty_bodies() {
        let summary = summarize(&[entry("2024-03-05", ""), entry("2024-03-06", "")]);
        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.avg_chars_per_entry, 0);
    }

    #[test]
    fn test_summarize_rounds_average() {
        let summary = summarize(&[
            entry("2024-03-05", "ab"),
            entry("2024-03-06", "a b"),
            entry("2024-03-07", ""),
        ]);
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.total_chars, 5);
        assert_eq!(summary.total_words, 3);
        // 2.5 rounds up.
        assert_eq!(summary.avg_chars_per_entry, 3);

        let summary = summarize(&[entry("2024-03-05", "a"), entry("2024-03-06", "a"), entry("2024-03-07", "ab")]);
        assert_eq!(summary.avg_chars_per_entry, 1);
    }

    #[test]
    fn test_summarize_counts_chars_not_bytes() {
        let summary = summarize(&[entry("2024-03-05", "héllo")]);
        assert_eq!(summary.total_chars, 5);
    }

    #[test]
    fn test_recent_window_and_order() {
        let snapshot = vec![
            entry("2024-03-14", "today"),
            entry("2024-03-01", "oldest kept"),
            entry("2024-02-29", "too old"),
            entry("2024-03-15", "future"),
            entry("2024-03-10", "   "),
            entry("2024-03-08", "middle"),
        ];
        let recent = recent(&snapshot, day("2024-03-14"), DEFAULT_RECENT_DAYS);
        let keys: Vec<String> = recent.iter().map(|n| n.key.to_string()).collect();
        assert_eq!(keys, vec!["2024-03-14", "2024-03-08", "2024-03-01"]);
        assert_eq!(recent[2].word_count, 2);
        assert!(super::recent(&snapshot, day("2024-03-14"), 0).is_empty());
    }

    #[test]
    fn test_recent_preview_truncates() {
        let long = "z".repeat(PREVIEW_CHARS + 1);
        let notes = recent(&[entry("2024-03-14", &long)], day("2024-03-14"), 1);
        assert_eq!(notes[0].preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(notes[0].preview.ends_with("..."));
        assert_eq!(notes[0].char_count, PREVIEW_CHARS + 1);

        let exact = "z".repeat(PREVIEW_CHARS);
        let notes = recent(&[entry("2024-03-14", &exact)], day("2024-03-14"), 1);
        assert_eq!(notes[0].preview, exact);
    }

    #[test]
    fn test_noted_days() {
        let snapshot = vec![
            entry("2024-03-05", "a"),
            entry("2024-03-06", ""),
            entry("2024-03-31", "b"),
            entry("2024-04-01", "c"),
            entry("2023-03-05", "d"),
        ];
        let days: Vec<u32> = noted_days(&snapshot, 2024, 3).into_iter().collect();
        assert_eq!(days, vec![5, 31]);
    }
}
