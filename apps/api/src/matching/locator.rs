//! Plain-text projection locator with source-offset back-mapping.
//!
//! The flexible matcher fails when a tag lands *inside* a word boundary
//! (`Buil<br>t scalable`), because its separator only runs between words.
//! This locator strips markup first, searches the rendered projection, and
//! maps the hit back to the structured document through a parallel index
//! array: `idx[i]` is the byte offset in the source document of the
//! character that produced projection position `i`. Search in the rendered
//! view, edit in the source view.

use crate::matching::normalize::fold;

/// A resolved match. `start`/`end` are byte offsets into the *document*
/// passed to `locate`, not into the projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub start: usize,
    pub end: usize,
    pub matched: String,
}

/// Locates `phrase` in the stripped-markup projection of `document` and
/// back-maps the span to document offsets. Returns `None` when the scan
/// exhausts the projection or the mapped offsets fall out of range.
pub fn locate(document: &str, phrase: &str) -> Option<Located> {
    let words: Vec<Vec<char>> = fold(phrase)
        .split_whitespace()
        .map(|w| w.chars().collect())
        .collect();
    if words.is_empty() {
        return None;
    }

    let projection = project(document);
    let (plain_start, plain_end) = scan_words(&projection.chars, &words)?;

    let start = *projection.idx.get(plain_start)?;
    let end = if plain_end < projection.idx.len() {
        projection.idx[plain_end]
    } else {
        document.len()
    };
    if start > end || end > document.len() {
        return None;
    }

    Some(Located {
        start,
        end,
        matched: document[start..end].to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Projection: strip markup, keep a char-position index
// ────────────────────────────────────────────────────────────────────────────

struct Projection {
    /// Case-folded rendered characters, whitespace collapsed.
    chars: Vec<char>,
    /// `idx[i]` = byte offset in the source document for `chars[i]`.
    idx: Vec<usize>,
}

fn project(document: &str) -> Projection {
    let src: Vec<(usize, char)> = document.char_indices().collect();
    let mut chars: Vec<char> = Vec::with_capacity(src.len());
    let mut idx: Vec<usize> = Vec::with_capacity(src.len());

    let mut push = |ch: char, offset: usize, chars: &mut Vec<char>, idx: &mut Vec<usize>| {
        if ch == ' ' {
            // Collapse whitespace runs to a single projected space.
            if chars.last() == Some(&' ') || chars.is_empty() {
                return;
            }
            chars.push(' ');
            idx.push(offset);
        } else {
            for folded in ch.to_lowercase() {
                chars.push(folded);
                idx.push(offset);
            }
        }
    };

    let mut i = 0;
    while i < src.len() {
        let (offset, ch) = src[i];

        if ch == '<' {
            if let Some(close) = find_tag_close(&src, i) {
                // A line-break tag renders as one synthetic space at the
                // tag's own position; every other tag vanishes.
                if is_break_tag(&src[i..=close]) {
                    push(' ', offset, &mut chars, &mut idx);
                }
                i = close + 1;
                continue;
            }
            // Unterminated '<' is literal text.
        }

        if ch == '&' {
            if let Some((decoded, entity_chars)) = match_entity(&src, i) {
                push(decoded, offset, &mut chars, &mut idx);
                i += entity_chars;
                continue;
            }
        }

        if ch.is_whitespace() {
            push(' ', offset, &mut chars, &mut idx);
        } else {
            push(ch, offset, &mut chars, &mut idx);
        }
        i += 1;
    }

    // Drop a trailing projected space so end-of-projection spans map to
    // document.len() rather than a dangling whitespace offset.
    if chars.last() == Some(&' ') {
        chars.pop();
        idx.pop();
    }

    Projection { chars, idx }
}

/// Index of the matching `>` for a tag opening at `open`, if any.
fn find_tag_close(src: &[(usize, char)], open: usize) -> Option<usize> {
    src[open..]
        .iter()
        .position(|&(_, c)| c == '>')
        .map(|rel| open + rel)
}

/// True for `<br>`, `<br/>`, `<br />`, `<BR>` and friends.
fn is_break_tag(tag: &[(usize, char)]) -> bool {
    let name: String = tag
        .iter()
        .map(|&(_, c)| c.to_ascii_lowercase())
        .collect();
    let inner = name.trim_start_matches('<').trim_end_matches('>').trim();
    let inner = inner.trim_end_matches('/').trim_end();
    inner == "br" || inner.starts_with("br ")
}

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#039;", '\''),
];

/// Matches one of the five standard entities at `src[at]`. Returns the
/// decoded character and how many source chars the entity spans.
fn match_entity(src: &[(usize, char)], at: usize) -> Option<(char, usize)> {
    for (entity, decoded) in ENTITIES {
        let len = entity.chars().count();
        if at + len <= src.len()
            && src[at..at + len]
                .iter()
                .map(|&(_, c)| c)
                .eq(entity.chars())
        {
            return Some((decoded, len));
        }
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Tolerant word scan over the projection
// ────────────────────────────────────────────────────────────────────────────

/// Word-by-word scan of the (folded, collapsed) projection against the
/// folded phrase words. Non-final words must be confirmed by a whitespace
/// boundary; the final word may end flush against the end of the phrase.
/// Returns the projection span `[start, end)` of the first full completion.
fn scan_words(p: &[char], words: &[Vec<char>]) -> Option<(usize, usize)> {
    let first_char = words[0][0];

    let mut start = 0;
    'candidates: while start < p.len() {
        if p[start] != first_char {
            start += 1;
            continue;
        }

        let mut pos = start;
        for (wi, word) in words.iter().enumerate() {
            for &wc in word {
                if pos < p.len() && p[pos] == wc {
                    pos += 1;
                } else {
                    // Mismatch mid-word: reset to scanning from the next
                    // position after the candidate start.
                    start += 1;
                    continue 'candidates;
                }
            }
            if wi + 1 == words.len() {
                return Some((start, pos));
            }
            // Completed a non-final word: require a boundary, then advance
            // to the next search word.
            if pos < p.len() && p[pos] == ' ' {
                pos += 1;
            } else {
                start += 1;
                continue 'candidates;
            }
        }
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_plain_text() {
        let doc = "Managed a team of 5 engineers";
        let hit = locate(doc, "Managed a team").unwrap();
        assert_eq!((hit.start, hit.end), (0, 14));
        assert_eq!(hit.matched, "Managed a team");
    }

    #[test]
    fn test_locate_through_mid_word_tag() {
        // The flexible matcher cannot cross a tag inside a word; the
        // projection can.
        let doc = "Buil<b>t</b> scalable systems";
        let hit = locate(doc, "Built scalable").unwrap();
        assert_eq!(&doc[hit.start..hit.end], "Buil<b>t</b> scalable");
    }

    #[test]
    fn test_locate_through_br_tag() {
        let doc = "Built<br> scalable systems";
        let hit = locate(doc, "Built scalable").unwrap();
        assert_eq!(&doc[hit.start..hit.end], "Built<br> scalable");
    }

    #[test]
    fn test_back_mapped_splice_removes_exact_visible_run() {
        let doc = "<p>Led <em>the</em> migration</p> effort";
        let hit = locate(doc, "Led the migration").unwrap();
        let spliced = format!("{}X{}", &doc[..hit.start], &doc[hit.end..]);
        // The span runs to the source of the next visible character, so the
        // tags inside (and flush against) the matched run go with it; the
        // visible text outside the run survives untouched.
        assert_eq!(spliced, "<p>X effort");
    }

    #[test]
    fn test_locate_span_to_end_of_document() {
        let doc = "Shipped the <i>reporting pipeline</i>";
        let hit = locate(doc, "reporting pipeline").unwrap();
        // End-of-projection span maps past the closing tag's visible text.
        assert_eq!(&doc[hit.start..hit.end], "reporting pipeline</i>");
    }

    #[test]
    fn test_locate_decodes_entities() {
        let doc = "Owned R&amp;D partnerships";
        let hit = locate(doc, "Owned R&D").unwrap();
        assert_eq!(&doc[hit.start..hit.end], "Owned R&amp;D");
    }

    #[test]
    fn test_locate_case_insensitive() {
        let doc = "MANAGED A TEAM of 5";
        assert!(locate(doc, "managed a team").is_some());
    }

    #[test]
    fn test_locate_absent_phrase_is_none() {
        assert!(locate("Managed a team", "ran the circus").is_none());
    }

    #[test]
    fn test_locate_empty_phrase_is_none() {
        assert!(locate("anything", "").is_none());
        assert!(locate("anything", "  \n ").is_none());
    }

    #[test]
    fn test_locate_partial_word_mismatch_recovers_later() {
        // "team" appears first as "teamwork" (mismatch at the boundary of
        // the next word), then for real.
        let doc = "teamwork matters; team of 5 engineers";
        let hit = locate(doc, "team of 5").unwrap();
        assert_eq!(&doc[hit.start..hit.end], "team of 5");
    }

    #[test]
    fn test_collapsed_whitespace_in_projection() {
        let doc = "Led   a\n\tteam today";
        let hit = locate(doc, "Led a team").unwrap();
        assert_eq!(&doc[hit.start..hit.end], "Led   a\n\tteam");
    }

    #[test]
    fn test_unterminated_angle_bracket_is_literal() {
        let doc = "raised scores < 5 overall";
        let hit = locate(doc, "scores < 5").unwrap();
        assert_eq!(&doc[hit.start..hit.end], "scores < 5");
    }
}
