//! Sequences edit application over a document and reports the outcome.
//!
//! Two paths over the same locate-then-replace problem:
//! - DOM path: thread the structured document through successive snippet
//!   replacements, in input order. Later edits see the document after
//!   earlier edits — callers are responsible for snippet specificity.
//! - Overlay path: group edits by page, draw each independently. Edits on
//!   one page draw into disjoint regions by the caller's contract;
//!   overlapping boxes simply layer.
//!
//! Unmatched snippets and out-of-range pages are skipped and reported,
//! never fatal — a batch that places zero edits still returns a result.

use std::collections::BTreeMap;

use tracing::warn;
use uuid::Uuid;

use crate::edits::models::AppliedEdit;
use crate::matching;
use crate::overlay::applier::{apply_edit, ApplierConfig};
use crate::overlay::pdf::OverlayDocument;

/// What happened to a batch: how many edits landed and which suggestions
/// could not be placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    pub applied: usize,
    pub unmatched: Vec<Uuid>,
}

/// DOM path: applies each edit's snippet replacement in input order and
/// returns the final document plus the outcome.
pub fn apply_dom_edits(document: &str, edits: &[AppliedEdit]) -> (String, ApplyOutcome) {
    let mut doc = document.to_string();
    let mut outcome = ApplyOutcome::default();

    for edit in edits {
        match matching::try_replace(&doc, &edit.original_text, &edit.new_text) {
            Some(updated) => {
                doc = updated;
                outcome.applied += 1;
            }
            None => {
                warn!(suggestion_id = %edit.suggestion_id, "snippet not found in document");
                outcome.unmatched.push(edit.suggestion_id);
            }
        }
    }
    (doc, outcome)
}

/// Overlay path: draws each edit into its page's surface. Edits without a
/// bounding box or with an out-of-range page index are reported as
/// unmatched and skipped.
pub fn apply_overlay_edits(
    overlay: &mut OverlayDocument,
    edits: &[AppliedEdit],
    cfg: &ApplierConfig,
) -> anyhow::Result<ApplyOutcome> {
    let mut outcome = ApplyOutcome::default();
    let page_count = overlay.page_count();

    let mut by_page: BTreeMap<usize, Vec<&AppliedEdit>> = BTreeMap::new();
    for edit in edits {
        if edit.page_index >= page_count {
            warn!(
                suggestion_id = %edit.suggestion_id,
                page_index = edit.page_index,
                page_count,
                "edit references page beyond document, skipping"
            );
            outcome.unmatched.push(edit.suggestion_id);
            continue;
        }
        by_page.entry(edit.page_index).or_default().push(edit);
    }

    for (page_index, page_edits) in by_page {
        // begin_page cannot fail here: the index was range-checked above.
        let Some(mut surface) = overlay.begin_page(page_index) else {
            continue;
        };
        for edit in page_edits {
            match &edit.bbox {
                Some(bbox) => {
                    apply_edit(&mut surface, bbox, &edit.new_text, cfg);
                    outcome.applied += 1;
                }
                None => {
                    warn!(suggestion_id = %edit.suggestion_id, "overlay edit without bounding box");
                    outcome.unmatched.push(edit.suggestion_id);
                }
            }
        }
        overlay.finish_page(page_index, surface)?;
    }

    Ok(outcome)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::models::EditMode;
    use crate::overlay::geometry::BoundingBox;
    use lopdf::{dictionary, Document, Object};

    fn make_edit(original: &str, new_text: &str) -> AppliedEdit {
        AppliedEdit {
            suggestion_id: Uuid::new_v4(),
            page_index: 0,
            bbox: None,
            mode: EditMode::Replace,
            original_text: original.to_string(),
            new_text: new_text.to_string(),
        }
    }

    fn pdf_with_pages(count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let mut kids = Vec::new();
        let mut page_ids = Vec::new();
        for _ in 0..count {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(Object::Reference(page_id));
            page_ids.push(page_id);
        }
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        });
        for page_id in page_ids {
            if let Ok(dict) = doc.get_object_mut(page_id).and_then(|o| o.as_dict_mut()) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    // ── DOM path ────────────────────────────────────────────────────────────

    #[test]
    fn test_dom_edits_thread_through_document() {
        let doc = "Managed a team of 5 engineers. Built scalable systems.";
        let edits = vec![
            make_edit("Managed a team", "Led a team"),
            make_edit("Built scalable", "Shipped reliable"),
        ];
        let (result, outcome) = apply_dom_edits(doc, &edits);
        assert_eq!(
            result,
            "Led a team of 5 engineers. Shipped reliable systems."
        );
        assert_eq!(outcome.applied, 2);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_dom_unmatched_snippet_skipped_and_reported() {
        let doc = "Managed a team of 5 engineers";
        let edits = vec![
            make_edit("totally absent", "x"),
            make_edit("Managed a team", "Led a team"),
        ];
        let (result, outcome) = apply_dom_edits(doc, &edits);
        assert_eq!(result, "Led a team of 5 engineers");
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.unmatched, vec![edits[0].suggestion_id]);
    }

    #[test]
    fn test_dom_zero_applied_still_returns_document() {
        let doc = "unrelated content";
        let edits = vec![make_edit("missing one", "x"), make_edit("missing two", "y")];
        let (result, outcome) = apply_dom_edits(doc, &edits);
        assert_eq!(result, doc);
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.unmatched.len(), 2);
    }

    // ── overlay path ────────────────────────────────────────────────────────

    #[test]
    fn test_overlay_out_of_range_page_skipped() {
        let mut overlay = OverlayDocument::load(&pdf_with_pages(3)).unwrap();
        let in_range = AppliedEdit {
            page_index: 1,
            bbox: Some(BoundingBox::new(100.0, 200.0, 120.0, 14.0)),
            ..make_edit("old", "new")
        };
        let beyond = AppliedEdit {
            page_index: 5,
            bbox: Some(BoundingBox::new(100.0, 200.0, 120.0, 14.0)),
            ..make_edit("old", "new")
        };
        let beyond_id = beyond.suggestion_id;

        let outcome =
            apply_overlay_edits(&mut overlay, &[in_range, beyond], &ApplierConfig::default())
                .unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.unmatched, vec![beyond_id]);
    }

    #[test]
    fn test_overlay_edit_without_bbox_reported() {
        let mut overlay = OverlayDocument::load(&pdf_with_pages(1)).unwrap();
        let edit = make_edit("old", "new"); // bbox: None
        let id = edit.suggestion_id;
        let outcome =
            apply_overlay_edits(&mut overlay, &[edit], &ApplierConfig::default()).unwrap();
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.unmatched, vec![id]);
    }

    #[test]
    fn test_overlay_groups_edits_by_page() {
        let mut overlay = OverlayDocument::load(&pdf_with_pages(2)).unwrap();
        let edits: Vec<AppliedEdit> = [(0, 100.0), (1, 200.0), (0, 300.0)]
            .iter()
            .map(|&(page, y)| AppliedEdit {
                page_index: page,
                bbox: Some(BoundingBox::new(50.0, y, 100.0, 12.0)),
                ..make_edit("old", "new")
            })
            .collect();

        let outcome =
            apply_overlay_edits(&mut overlay, &edits, &ApplierConfig::default()).unwrap();
        assert_eq!(outcome.applied, 3);
        assert!(outcome.unmatched.is_empty());

        let bytes = overlay.save().unwrap();
        assert!(Document::load_mem(&bytes).is_ok());
    }
}
