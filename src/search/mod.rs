//! Full-text search over a snapshot of notes.
//!
//! Matching is exact, case-insensitive substring containment. Each hit carries
//! an excerpt around the first occurrence and the spans of every occurrence
//! inside that excerpt. Offsets count `char`s, not bytes.

pub mod matcher;

use serde::Serialize;

use crate::{DateKey, NoteEntry};

/// Characters shown on each side of the anchoring match.
pub const DEFAULT_EXCERPT_WINDOW: usize = 50;

/// Marker added where the excerpt was clipped.
pub const ELLIPSIS: &str = "...";

/// A `[start, end)` char range inside an excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One matching note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub key: DateKey,
    pub excerpt: String,
    pub highlight_spans: Vec<Span>,
    /// Length of the whole note body in chars.
    pub source_char_count: usize,
}

impl SearchResult {
    /// Splits the excerpt into `(text, highlighted)` runs for rendering.
    pub fn segments(&self) -> Vec<(String, bool)> {
        let chars: Vec<char> = self.excerpt.chars().collect();
        let mut out = Vec::new();
        let mut cursor = 0;
        for span in &self.highlight_spans {
            if span.start > cursor {
                out.push((chars[cursor..span.start].iter().collect(), false));
            }
            out.push((chars[span.start..span.end].iter().collect(), true));
            cursor = span.end;
        }
        if cursor < chars.len() {
            out.push((chars[cursor..].iter().collect(), false));
        }
        out
    }
}

/// Searches `snapshot` for `query` with the default excerpt window.
///
/// Results are ordered newest date first. A blank query returns no results.
pub fn search(query: &str, snapshot: &[NoteEntry]) -> Vec<SearchResult> {
    search_with_window(query, snapshot, DEFAULT_EXCERPT_WINDOW)
}

/// Like [`search`], showing `window` chars on each side of the match.
pub fn search_with_window(query: &str, snapshot: &[NoteEntry], window: usize) -> Vec<SearchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle: Vec<char> = query.chars().collect();

    let mut results: Vec<SearchResult> = snapshot
        .iter()
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| excerpt_for(entry, &needle, window))
        .collect();
    results.sort_by(|a, b| b.key.cmp(&a.key));
    results
}

fn excerpt_for(entry: &NoteEntry, needle: &[char], window: usize) -> Option<SearchResult> {
    let body: Vec<char> = entry.body.chars().collect();
    let anchor = matcher::find_first(&body, needle)?;

    let start = anchor.saturating_sub(window);
    let end = (anchor + needle.len() + window).min(body.len());
    let shown = &body[start..end];

    let mut excerpt = String::new();
    let offset = if start > 0 {
        excerpt.push_str(ELLIPSIS);
        ELLIPSIS.chars().count()
    } else {
        0
    };
    excerpt.extend(shown);
    if end < body.len() {
        excerpt.push_str(ELLIPSIS);
    }

    let highlight_spans = matcher::find_all(shown, needle)
        .into_iter()
        .map(|at| Span {
            start: offset + at,
            end: offset + at + needle.len(),
        })
        .collect();

    Some(SearchResult {
        key: entry.key,
        excerpt,
        highlight_spans,
        source_char_count: body.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, body: &str) -> NoteEntry {
        NoteEntry::new(DateKey::parse(key).unwrap(), body)
    }

    fn span_text(result: &SearchResult, span: &Span) -> String {
        result.excerpt.chars().skip(span.start).take(span.end - span.start).collect()
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let snapshot = vec![entry("2024-03-05", "anything at all")];
        assert!(search("", &snapshot).is_empty());
        assert!(search("   ", &snapshot).is_empty());
        assert!(search("", &[]).is_empty());
    }

    #[test]
    fn test_no_match_returns_nothing() {
        let snapshot = vec![entry("2024-03-05", "quiet day")];
        assert!(search("roadmap", &snapshot).is_empty());
    }

    #[test]
    fn test_excerpt_window_clips_both_ends() {
        let mut body = "x".repeat(200);
        body.insert_str(100, "needle");
        let results = search("needle", &[entry("2024-03-05", &body)]);

        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert!(r.excerpt.starts_with(ELLIPSIS));
        assert!(r.excerpt.ends_with(ELLIPSIS));
        assert_eq!(r.excerpt.chars().count(), 100 + "needle".len() + 2 * ELLIPSIS.len());
        assert_eq!(r.highlight_spans, vec![Span { start: 53, end: 59 }]);
        assert_eq!(span_text(r, &r.highlight_spans[0]), "needle");
        assert_eq!(r.source_char_count, 206);
    }

    #[test]
    fn test_match_near_start_has_no_leading_ellipsis() {
        let body = format!("needle{}", "y".repeat(100));
        let r = &search("NEEDLE", &[entry("2024-03-05", &body)])[0];
        assert!(!r.excerpt.starts_with(ELLIPSIS));
        assert!(r.excerpt.ends_with(ELLIPSIS));
        assert_eq!(r.highlight_spans, vec![Span { start: 0, end: 6 }]);
    }

    #[test]
    fn test_whole_body_match() {
        let r = &search("needle", &[entry("2024-03-05", "Needle")])[0];
        assert_eq!(r.excerpt, "Needle");
        assert_eq!(r.highlight_spans, vec![Span { start: 0, end: 6 }]);
    }

    #[test]
    fn test_every_occurrence_in_window_is_highlighted() {
        let body = format!("{}cat and Cat and CAT{}cat", "-".repeat(60), "-".repeat(80));
        let r = &search("cat", &[entry("2024-03-05", &body)])[0];

        // The trailing "cat" falls outside the window.
        assert_eq!(r.highlight_spans.len(), 3);
        let texts: Vec<String> = r.highlight_spans.iter().map(|s| span_text(r, s)).collect();
        assert_eq!(texts, vec!["cat", "Cat", "CAT"]);
    }

    #[test]
    fn test_custom_window() {
        let body = "0123456789needle0123456789";
        let r = &search_with_window("needle", &[entry("2024-03-05", body)], 2)[0];
        assert_eq!(r.excerpt, "...89needle01...");
        assert_eq!(r.highlight_spans, vec![Span { start: 5, end: 11 }]);
    }

    #[test]
    fn test_results_are_newest_first_and_deterministic() {
        let snapshot = vec![
            entry("2023-12-31", "plan"),
            entry("2024-03-06", "plan"),
            entry("2024-01-15", "no match"),
            entry("2024-03-05", "plan"),
        ];
        let results = search("plan", &snapshot);
        let keys: Vec<String> = results.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["2024-03-06", "2024-03-05", "2023-12-31"]);

        let mut reversed = snapshot.clone();
        reversed.reverse();
        assert_eq!(search("plan", &reversed), results);
    }

    #[test]
    fn test_empty_bodies_are_skipped() {
        let snapshot = vec![entry("2024-03-05", "")];
        assert!(search(" ", &snapshot).is_empty());
        assert!(search("a", &snapshot).is_empty());
    }

    #[test]
    fn test_segments() {
        let r = &search("ab", &[entry("2024-03-05", "xabyAB")])[0];
        assert_eq!(
            r.segments(),
            vec![
                ("x".to_string(), false),
                ("ab".to_string(), true),
                ("y".to_string(), false),
                ("AB".to_string(), true),
            ]
        );
    }
}
