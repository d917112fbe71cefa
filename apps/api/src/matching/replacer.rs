//! Ordered fallback chain for snippet replacement.
//!
//! Four independent strategies, tried cheapest-first; the first one that
//! locates the snippet performs the splice and wins. Each strategy is a
//! plain `fn(&str, &str, &str) -> Option<String>` so it stays testable on
//! its own — no dispatch machinery beyond an ordered slice.
//!
//! `replace` is total: when every strategy misses, the document comes back
//! unchanged. Re-running on the already-replaced output finds nothing and
//! changes nothing, which is what makes batch application safe to retry.

use tracing::debug;

use crate::matching::flexible;
use crate::matching::locator;
use crate::matching::normalize::normalize;

type Strategy = fn(&str, &str, &str) -> Option<String>;

const STRATEGIES: [(&str, Strategy); 4] = [
    ("flexible", flexible_pass),
    ("projection", projection_pass),
    ("loose-regex", loose_regex_pass),
    ("literal", literal_pass),
];

/// Replaces the first occurrence of `snippet` with `new_text`, or returns
/// `None` when no strategy can locate it.
pub fn try_replace(document: &str, snippet: &str, new_text: &str) -> Option<String> {
    for (name, strategy) in STRATEGIES {
        if let Some(updated) = strategy(document, snippet, new_text) {
            debug!(strategy = name, "snippet located");
            return Some(updated);
        }
    }
    None
}

/// Total variant of `try_replace`: unmatched snippets leave the document
/// unchanged rather than failing the call.
pub fn replace(document: &str, snippet: &str, new_text: &str) -> String {
    try_replace(document, snippet, new_text).unwrap_or_else(|| document.to_string())
}

/// Read-only classification: can any strategy place this snippet?
pub fn can_locate(document: &str, snippet: &str) -> bool {
    try_replace(document, snippet, "").is_some()
}

// ────────────────────────────────────────────────────────────────────────────
// Strategies, in fallback order
// ────────────────────────────────────────────────────────────────────────────

/// 1. Word-joined tolerant regex — handles contiguous text with markup or
/// line breaks *between* words. Replaces the span verbatim; markup inside
/// the span is being replaced anyway.
fn flexible_pass(document: &str, snippet: &str, new_text: &str) -> Option<String> {
    let pattern = flexible::build_pattern(snippet)?;
    let span = flexible::find(document, &pattern)?;
    Some(splice(document, span.start, span.end, new_text))
}

/// 2. Strip-then-map projection search — handles tags falling inside word
/// boundaries.
fn projection_pass(document: &str, snippet: &str, new_text: &str) -> Option<String> {
    let hit = locator::locate(document, snippet)?;
    Some(splice(document, hit.start, hit.end, new_text))
}

/// 3. Loose normalized regex over the whole document: spaces in the
/// normalized snippet become `\s+`, everything else is literal. A cheaper,
/// structure-blind pass that mops up plain-text documents.
fn loose_regex_pass(document: &str, snippet: &str, new_text: &str) -> Option<String> {
    let normalized = normalize(snippet);
    if normalized.is_empty() {
        return None;
    }
    let mut body = String::with_capacity(normalized.len() * 2);
    for ch in normalized.chars() {
        if ch == ' ' {
            body.push_str(r"\s+");
        } else {
            body.push_str(&regex::escape(&ch.to_string()));
        }
    }
    let pattern = regex::Regex::new(&format!("(?i){body}")).ok()?;
    let m = pattern.find(document)?;
    Some(splice(document, m.start(), m.end(), new_text))
}

/// 4. Literal substring replace of the raw snippet — last resort for exact
/// verbatim matches the normalized passes somehow missed.
fn literal_pass(document: &str, snippet: &str, new_text: &str) -> Option<String> {
    if snippet.is_empty() || !document.contains(snippet) {
        return None;
    }
    Some(document.replacen(snippet, new_text, 1))
}

fn splice(document: &str, start: usize, end: usize, new_text: &str) -> String {
    let mut out = String::with_capacity(document.len() + new_text.len());
    out.push_str(&document[..start]);
    out.push_str(new_text);
    out.push_str(&document[end..]);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── happy path through each strategy ────────────────────────────────────

    #[test]
    fn test_replace_plain_phrase() {
        let out = replace("Managed a team of 5 engineers", "Managed a team", "Led a team");
        assert_eq!(out, "Led a team of 5 engineers");
    }

    #[test]
    fn test_replace_across_br_tag() {
        let out = replace("Built<br> scalable systems", "Built scalable", "Shipped reliable");
        assert_eq!(out, "Shipped reliable systems");
    }

    #[test]
    fn test_replace_through_mid_word_markup_falls_to_projection() {
        // Flexible matcher cannot cross the tag inside "Built"; the
        // projection pass takes over.
        let out = replace(
            "Buil<b>t</b> scalable systems",
            "Built scalable",
            "Shipped reliable",
        );
        assert_eq!(out, "Shipped reliable systems");
    }

    #[test]
    fn test_literal_pass_handles_raw_snippet() {
        // A snippet that IS whitespace-significant markup: the normalized
        // passes mangle it, the literal pass matches verbatim.
        let doc = "value: <td>42</td> end";
        let out = literal_pass(doc, "<td>42</td>", "<td>43</td>").unwrap();
        assert_eq!(out, "value: <td>43</td> end");
    }

    // ── loose-regex strategy in isolation ───────────────────────────────────

    #[test]
    fn test_loose_regex_pass_spans_whitespace_runs() {
        let doc = "Managed   a\n\tteam of 5";
        let out = loose_regex_pass(doc, "Managed a team", "Led a team").unwrap();
        assert_eq!(out, "Led a team of 5");
    }

    #[test]
    fn test_loose_regex_pass_is_case_insensitive() {
        let out =
            loose_regex_pass("MANAGED A TEAM of 5", "managed a team", "Led a team").unwrap();
        assert_eq!(out, "Led a team of 5");
    }

    #[test]
    fn test_loose_regex_pass_escapes_metacharacters() {
        let doc = "cut latency (p99) by 40%";
        let out = loose_regex_pass(doc, "latency (p99)", "tail latency").unwrap();
        assert_eq!(out, "cut tail latency by 40%");
    }

    #[test]
    fn test_loose_regex_pass_miss_is_none() {
        assert!(loose_regex_pass("some document", "absent phrase", "x").is_none());
        assert!(loose_regex_pass("some document", "   ", "x").is_none());
    }

    // ── totality and unmatched behavior ─────────────────────────────────────

    #[test]
    fn test_unmatched_snippet_returns_document_unchanged() {
        let doc = "Managed a team of 5 engineers";
        assert_eq!(replace(doc, "rann the circuss", "x"), doc);
        assert!(try_replace(doc, "rann the circuss", "x").is_none());
    }

    #[test]
    fn test_empty_snippet_never_matches() {
        let doc = "some document";
        assert_eq!(replace(doc, "", "x"), doc);
        assert_eq!(replace(doc, "   ", "x"), doc);
    }

    // ── replacement laws ───────────────────────────────────────────────────────

    #[test]
    fn test_idempotence_on_own_output() {
        let doc = "Managed a team of 5 engineers";
        let once = replace(doc, "Managed a team", "Led a team");
        let twice = replace(&once, "Managed a team", "Led a team");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_round_trip_restores_document() {
        let doc = "Managed a team of 5 engineers";
        let forward = replace(doc, "Managed a team", "Led a team");
        let back = replace(&forward, "Led a team", "Managed a team");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        let doc = "team alpha and team beta";
        let out = replace(doc, "team", "squad");
        assert_eq!(out, "squad alpha and team beta");
    }

    // ── classification ──────────────────────────────────────────────────────

    #[test]
    fn test_can_locate() {
        assert!(can_locate("Managed a team of 5", "Managed a team"));
        assert!(can_locate("Built<br> scalable systems", "Built scalable"));
        assert!(!can_locate("Managed a team of 5", "absent phrase"));
    }

    #[test]
    fn test_replacement_preserves_surrounding_markup() {
        let doc = "<li>Managed a team of 5 engineers</li><li>Other</li>";
        let out = replace(doc, "Managed a team", "Led a team");
        assert_eq!(out, "<li>Led a team of 5 engineers</li><li>Other</li>");
    }
}
