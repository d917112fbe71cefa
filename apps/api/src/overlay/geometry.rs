//! Page-local rectangles and the one place coordinates get converted.
//!
//! Bounding boxes arrive from the UI in top-left-origin screen space; PDF
//! page space is bottom-left-origin. The conversion happens exactly once,
//! here, and the applier only ever sees PDF-space boxes.

use serde::{Deserialize, Serialize};

/// A page-local rectangle. Which origin `y` is relative to depends on where
/// the box is in its lifecycle — see `to_pdf_space`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Non-positive dimensions mean "nothing to draw", not an error.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0 || !self.width.is_finite() || !self.height.is_finite()
    }

    /// Converts a top-left-origin screen-space box to bottom-left-origin
    /// page space: `pdf_y = page_height - y - height`. Call exactly once
    /// per box, at the boundary into the overlay path.
    pub fn to_pdf_space(&self, page_height: f32) -> BoundingBox {
        BoundingBox {
            x: self.x,
            y: page_height - self.y - self.height,
            width: self.width,
            height: self.height,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
