//! Case-insensitive substring matching over `char` slices.
//!
//! Characters are compared one at a time through their full lowercase mapping,
//! so an index into the folded text is always an index into the original.
//! A character whose lowercase form is several chars (such as `İ`, which
//! lowercases to `i̇`) does not fold: it only matches a query character with
//! the same lowercase form, such as `İ` itself, never the letter `i`.

fn chars_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn matches_at(haystack: &[char], needle: &[char], at: usize) -> bool {
    haystack[at..at + needle.len()]
        .iter()
        .zip(needle)
        .all(|(&h, &n)| chars_eq(h, n))
}

/// Index of the first occurrence of `needle` in `haystack`.
pub fn find_first(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&at| matches_at(haystack, needle, at))
}

/// Start indices of all non-overlapping occurrences, scanning left to right.
pub fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    let mut found = Vec::new();
    if needle.is_empty() {
        return found;
    }
    let mut at = 0;
    while at + needle.len() <= haystack.len() {
        if matches_at(haystack, needle, at) {
            found.push(at);
            at += needle.len();
        } else {
            at += 1;
        }
    }
    found
}
