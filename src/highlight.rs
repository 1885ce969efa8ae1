use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

/// Builds a case-insensitive alternation matching any word of the search
/// text, longest first so overlapping words prefer the fuller match.
pub fn build_highlight_regex(search_text: &str) -> Option<Regex> {
    let mut unique = Vec::new();
    let mut seen = HashSet::new();
    for word in search_text.split_whitespace() {
        if seen.insert(word.to_lowercase()) {
            unique.push(word);
        }
    }
    if unique.is_empty() {
        return None;
    }
    unique.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = unique
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}
