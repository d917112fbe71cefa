//! Text canonicalization for snippet comparison.
//!
//! PDF extraction and HTML reconstruction disagree about whitespace, smart
//! punctuation, and entity encoding. Every matching strategy compares
//! against the output of `normalize`, so the rules live in exactly one
//! place. `normalize` never lowercases — callers that want case-blind
//! comparison use `fold`, keeping an exact-case variant available for
//! replacement text.

/// Canonicalizes a snippet for comparison. Deterministic, total, pure.
///
/// Rules, in order: collapse any whitespace run (including newlines) to a
/// single space; map curly single/double quotes to their ASCII forms; map
/// en/em dashes to `-`; decode the five standard HTML entities; trim.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match ch {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            other => out.push(other),
        }
    }

    let decoded = decode_entities(&out);
    decoded.trim().to_string()
}

/// `normalize` plus case-folding. Used everywhere comparison is
/// case-insensitive; never used to produce replacement text.
pub fn fold(text: &str) -> String {
    normalize(text).to_lowercase()
}

/// Decodes the five standard HTML entities. Anything fancier than these is
/// the structured-document collaborator's problem, not ours.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
