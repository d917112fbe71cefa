//! Word-sequence matcher that tolerates markup between words.
//!
//! The primary location strategy: build one case-insensitive regex from the
//! normalized phrase, joining words with a separator that crosses soft-wrap
//! whitespace or an explicit `<br>` tag. It does not require parsing the
//! document — interleaved tags between words are simply consumed by the
//! separator. Tags falling *inside* a word defeat it; that case belongs to
//! the plain-text locator.

use regex::Regex;

use crate::matching::normalize::normalize;

/// Separator between consecutive phrase words: optional whitespace around an
/// optional line-break tag, or a plain whitespace run. The first alternative
/// can match zero width, so words fused by a dropped space at a line join
/// still match.
const WORD_SEPARATOR: &str = r"(?:\s*(?:<br\s*/?>)?\s*|\s+)";

/// Builds the tolerant pattern for a phrase.
///
/// Returns `None` for empty/whitespace-only phrases (zero words survive
/// normalization) and for pathological input the regex engine rejects —
/// "no pattern" is a value here, never an error.
pub fn build_pattern(phrase: &str) -> Option<Regex> {
    let normalized = normalize(phrase);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let body = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join(WORD_SEPARATOR);

    Regex::new(&format!("(?i){body}")).ok()
}

/// First match of `pattern` in `document`, as a byte range.
pub fn find(document: &str, pattern: &Regex) -> Option<std::ops::Range<usize>> {
    pattern.find(document).map(|m| m.range())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
