//! lopdf-backed implementation of the drawing surface.
//!
//! Overlay drawing appends a fresh content stream to the target page (never
//! touching the existing streams) and guarantees a standard-14 Helvetica
//! font resource on that page. Opened per export call; no document handle
//! outlives the request.

use anyhow::{anyhow, Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use crate::overlay::surface::PageSurface;

/// Resource name the overlay registers for Helvetica.
const FONT_KEY: &str = "HvOv";

/// Fallback page size when no MediaBox is found (US letter, points).
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// A loaded PDF plus its page list, scoped to one export operation.
pub struct OverlayDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl OverlayDocument {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).context("failed to parse PDF")?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// MediaBox of a page, walking up Parent nodes for inherited boxes.
    pub fn page_size(&self, page_index: usize) -> Option<(f32, f32)> {
        let page_id = *self.pages.get(page_index)?;
        Some(self.resolve_media_box(page_id).unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// Starts an empty drawing surface for one page. `None` when the page
    /// index is out of range — the caller skips and reports, never aborts.
    pub fn begin_page(&self, page_index: usize) -> Option<PdfPageSurface> {
        let (width, height) = self.page_size(page_index)?;
        Some(PdfPageSurface {
            width,
            height,
            operations: Vec::new(),
        })
    }

    /// Commits a finished surface: encodes its operations as a new content
    /// stream appended after the page's existing streams.
    pub fn finish_page(&mut self, page_index: usize, surface: PdfPageSurface) -> Result<()> {
        if surface.operations.is_empty() {
            return Ok(());
        }
        let page_id = *self
            .pages
            .get(page_index)
            .ok_or_else(|| anyhow!("page index {page_index} out of range"))?;

        self.ensure_helvetica(page_id)?;

        let content = Content {
            operations: surface.operations,
        };
        let data = content.encode().context("failed to encode content stream")?;
        let stream_id = self
            .doc
            .add_object(Object::Stream(lopdf::Stream::new(Dictionary::new(), data)));

        append_content_stream(&mut self.doc, page_id, stream_id)
    }

    pub fn save(mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .context("failed to serialize PDF")?;
        Ok(out)
    }

    fn resolve_media_box(&self, page_id: ObjectId) -> Option<(f32, f32)> {
        let mut current = page_id;
        // Parent chains are shallow; the bound only guards against cycles.
        for _ in 0..32 {
            let dict = self.doc.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(media_box) = dict.get(b"MediaBox") {
                return media_box_size(self.resolve(media_box));
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => return None,
            }
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            other => other,
        }
    }

    /// Registers `/HvOv` → Helvetica in the page's font resources if absent.
    fn ensure_helvetica(&mut self, page_id: ObjectId) -> Result<()> {
        if self.has_overlay_font(page_id) {
            return Ok(());
        }
        let font_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        // Resources may be inline, referenced, or missing entirely.
        let resources_ref = {
            let page = self
                .doc
                .get_object(page_id)
                .context("page object missing")?
                .as_dict()
                .map_err(|e| anyhow!("page is not a dictionary: {e}"))?;
            match page.get(b"Resources") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            }
        };

        let resources = match resources_ref {
            Some(id) => self
                .doc
                .get_object_mut(id)
                .context("dangling Resources reference")?
                .as_dict_mut()
                .map_err(|e| anyhow!("Resources is not a dictionary: {e}"))?,
            None => {
                let page = self
                    .doc
                    .get_object_mut(page_id)
                    .context("page object missing")?
                    .as_dict_mut()
                    .map_err(|e| anyhow!("page is not a dictionary: {e}"))?;
                if !matches!(page.get(b"Resources"), Ok(Object::Dictionary(_))) {
                    page.set("Resources", Object::Dictionary(Dictionary::new()));
                }
                match page.get_mut(b"Resources") {
                    Ok(Object::Dictionary(dict)) => dict,
                    _ => return Err(anyhow!("failed to create Resources dictionary")),
                }
            }
        };

        let fonts = match resources.get_mut(b"Font") {
            Ok(Object::Dictionary(dict)) => dict,
            _ => {
                resources.set("Font", Object::Dictionary(Dictionary::new()));
                match resources.get_mut(b"Font") {
                    Ok(Object::Dictionary(dict)) => dict,
                    _ => return Err(anyhow!("failed to create Font dictionary")),
                }
            }
        };
        if !fonts.has(FONT_KEY.as_bytes()) {
            fonts.set(FONT_KEY, Object::Reference(font_id));
        }
        Ok(())
    }

    /// True when the page's font resources already carry `/HvOv`.
    fn has_overlay_font(&self, page_id: ObjectId) -> bool {
        let Ok(page) = self
            .doc
            .get_object(page_id)
            .and_then(|obj| obj.as_dict())
        else {
            return false;
        };
        let resources = match page.get(b"Resources") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id).and_then(|o| o.as_dict()) {
                Ok(dict) => dict,
                Err(_) => return false,
            },
            Ok(Object::Dictionary(dict)) => dict,
            _ => return false,
        };
        matches!(
            resources.get(b"Font"),
            Ok(Object::Dictionary(fonts)) if fonts.has(FONT_KEY.as_bytes())
        )
    }
}

fn media_box_size(obj: &Object) -> Option<(f32, f32)> {
    let arr = obj.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let v: Vec<f32> = arr.iter().filter_map(as_f32).collect();
    if v.len() != 4 {
        return None;
    }
    Some(((v[2] - v[0]).abs(), (v[3] - v[1]).abs()))
}

fn as_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(n) => Some(*n as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Appends `stream_id` to the page's Contents, preserving existing streams.
fn append_content_stream(doc: &mut Document, page_id: ObjectId, stream_id: ObjectId) -> Result<()> {
    let page = doc
        .get_object_mut(page_id)
        .context("page object missing")?
        .as_dict_mut()
        .map_err(|e| anyhow!("page is not a dictionary: {e}"))?;

    let updated = match page.get(b"Contents") {
        Ok(Object::Reference(existing)) => Object::Array(vec![
            Object::Reference(*existing),
            Object::Reference(stream_id),
        ]),
        Ok(Object::Array(existing)) => {
            let mut arr = existing.clone();
            arr.push(Object::Reference(stream_id));
            Object::Array(arr)
        }
        _ => Object::Reference(stream_id),
    };
    page.set("Contents", updated);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// The per-page drawing surface
// ────────────────────────────────────────────────────────────────────────────

/// Collects content-stream operations for one page. Committed via
/// `OverlayDocument::finish_page`.
pub struct PdfPageSurface {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
}

impl PageSurface for PdfPageSurface {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.operations.extend([
            Operation::new("q", vec![]),
            // Page background: white.
            Operation::new("rg", vec![1.into(), 1.into(), 1.into()]),
            Operation::new(
                "re",
                vec![x.into(), y.into(), width.into(), height.into()],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn draw_text(&mut self, x: f32, y: f32, font_size: f32, text: &str) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_KEY.as_bytes().to_vec()), font_size.into()],
            ),
            Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::applier::{apply_edit, ApplierConfig};
    use crate::overlay::geometry::BoundingBox;

    fn minimal_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
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

    #[test]
    fn test_load_reports_page_count_and_size() {
        let overlay = OverlayDocument::load(&minimal_pdf()).unwrap();
        assert_eq!(overlay.page_count(), 1);
        assert_eq!(overlay.page_size(0), Some((612.0, 792.0)));
        assert!(overlay.page_size(7).is_none());
    }

    #[test]
    fn test_begin_page_out_of_range_is_none() {
        let overlay = OverlayDocument::load(&minimal_pdf()).unwrap();
        assert!(overlay.begin_page(3).is_none());
    }

    #[test]
    fn test_overlay_round_trip_produces_valid_pdf() {
        let mut overlay = OverlayDocument::load(&minimal_pdf()).unwrap();
        let mut surface = overlay.begin_page(0).unwrap();
        apply_edit(
            &mut surface,
            &BoundingBox::new(100.0, 200.0, 120.0, 14.0),
            "Led a team",
            &ApplierConfig::default(),
        );
        overlay.finish_page(0, surface).unwrap();
        let bytes = overlay.save().unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[test]
    fn test_empty_surface_commits_nothing() {
        let mut overlay = OverlayDocument::load(&minimal_pdf()).unwrap();
        let surface = overlay.begin_page(0).unwrap();
        overlay.finish_page(0, surface).unwrap();
        let bytes = overlay.save().unwrap();

        let reloaded = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = reloaded.get_pages().into_iter().next().unwrap();
        let page = reloaded.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page.get(b"Contents").is_err(), "no content stream expected");
    }

    #[test]
    fn test_helvetica_registered_once() {
        let mut overlay = OverlayDocument::load(&minimal_pdf()).unwrap();
        for _ in 0..3 {
            let mut surface = overlay.begin_page(0).unwrap();
            surface.draw_text(10.0, 10.0, 10.0, "hi");
            overlay.finish_page(0, surface).unwrap();
        }
        let bytes = overlay.save().unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = reloaded.get_pages().into_iter().next().unwrap();
        let page = reloaded.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(FONT_KEY.as_bytes()));

        // Repeat commits must not leave orphan font objects behind.
        let helvetica_objects = reloaded
            .objects
            .values()
            .filter(|obj| {
                obj.as_dict()
                    .ok()
                    .and_then(|d| d.get(b"BaseFont").ok())
                    .map(|f| matches!(f, Object::Name(name) if name == b"Helvetica"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(helvetica_objects, 1);
    }
}
