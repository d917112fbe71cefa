//! Fixed-geometry text replacement: cover the old glyphs, size the new
//! text, draw it inside (or as close as possible to) the original box.
//!
//! This component has no error outcomes by contract. Degenerate boxes and
//! empty text draw nothing; text that cannot fit even at the floor size is
//! drawn anyway at the floor; wrapped lines that would land below the box
//! are silently dropped. Failing hard here would break the all-or-nothing
//! robustness of batch export, so every branch degrades instead.

use crate::overlay::font_metrics::measure;
use crate::overlay::geometry::BoundingBox;
use crate::overlay::surface::PageSurface;

/// Tuning constants for cover, sizing, and wrapping. These are carried
/// over empirical values, not derived ones — keep them in one place and
/// adjustable rather than scattered as literals.
#[derive(Debug, Clone)]
pub struct ApplierConfig {
    /// Fraction of box height used as the starting font-size candidate.
    pub height_factor: f32,
    /// Upper bound on the candidate size, in points.
    pub max_font_size: f32,
    /// Hard floor for the single-line shrink search.
    pub min_font_size: f32,
    /// Floor applied instead when the text is long enough to wrap.
    pub wrap_floor: f32,
    /// Step used when shrinking toward the floor.
    pub shrink_step: f32,
    /// Word count above which we wrap instead of shrinking a single line.
    pub wrap_word_cutoff: usize,
    /// Extra margin around the cover rectangle, to occlude anti-aliasing
    /// fringes of the original glyphs.
    pub cover_padding: f32,
    /// Line advance as a multiple of font size.
    pub line_spacing: f32,
}

impl Default for ApplierConfig {
    fn default() -> Self {
        Self {
            height_factor: 0.85,
            max_font_size: 12.0,
            min_font_size: 6.0,
            wrap_floor: 8.0,
            shrink_step: 0.5,
            wrap_word_cutoff: 3,
            cover_padding: 1.0,
            line_spacing: 1.15,
        }
    }
}

/// Applies one geometric edit: paints the cover and draws `text` into
/// `bbox` (given in top-left-origin screen space). Side effect only.
pub fn apply_edit(
    surface: &mut dyn PageSurface,
    bbox: &BoundingBox,
    text: &str,
    cfg: &ApplierConfig,
) {
    if bbox.is_degenerate() || text.trim().is_empty() {
        return;
    }

    let (_, page_height) = surface.page_size();
    let b = bbox.to_pdf_space(page_height);

    let pad = cfg.cover_padding;
    surface.fill_rect(b.x - pad, b.y - pad, b.width + 2.0 * pad, b.height + 2.0 * pad);

    let word_count = text.split_whitespace().count();
    let font_size = choose_font_size(text, word_count, &b, cfg);

    if measure(text, font_size) <= b.width {
        // Single line, vertically centered with a small descender correction.
        let baseline = b.y + (b.height - font_size) / 2.0 + 0.2 * font_size;
        surface.draw_text(b.x, baseline, font_size, text);
        return;
    }

    for (i, line) in wrap_greedy(text, b.width, font_size).iter().enumerate() {
        let y = b.y + b.height - font_size - i as f32 * (cfg.line_spacing * font_size);
        // Deliberate truncation policy: never draw below the target region.
        if y < b.y - font_size {
            break;
        }
        surface.draw_text(b.x, y, font_size, line);
    }
}

/// Candidate = `min(height_factor·h, max)`. Long texts accept the
/// candidate at the wrap floor; short ones shrink stepwise toward the
/// single-line floor, using the floor even when it still does not fit.
fn choose_font_size(text: &str, word_count: usize, b: &BoundingBox, cfg: &ApplierConfig) -> f32 {
    let candidate = (cfg.height_factor * b.height).min(cfg.max_font_size);

    if word_count > cfg.wrap_word_cutoff {
        return candidate.max(cfg.wrap_floor);
    }

    let mut size = candidate.max(cfg.min_font_size);
    while measure(text, size) > b.width && size > cfg.min_font_size {
        size = (size - cfg.shrink_step).max(cfg.min_font_size);
    }
    size
}

/// Greedy word wrap at `max_width`. A word that alone exceeds the width
/// still gets its own line — overflow is tolerated, truncation happens at
/// draw time, not here.
fn wrap_greedy(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let widened = format!("{current} {word}");
        if measure(&widened, font_size) <= max_width {
            current = widened;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
