//! The drawing seam between the applier and the page-graphics backend.
//!
//! The applier only ever issues two primitives — filled rectangle and text
//! at position/size — so that is the whole trait. The lopdf-backed
//! implementation lives in `overlay::pdf`; tests use `RecordingSurface`.

/// One page's drawing surface. Coordinates are PDF page space
/// (bottom-left origin, points).
pub trait PageSurface {
    /// Page size in points: `(width, height)`.
    fn page_size(&self) -> (f32, f32);

    /// Opaque filled rectangle in the page background color.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Text drawn with its baseline at `(x, y)` at `font_size` points.
    fn draw_text(&mut self, x: f32, y: f32, font_size: f32, text: &str);
}

/// Test double that records every primitive issued by the applier.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub rects: Vec<(f32, f32, f32, f32)>,
    pub texts: Vec<DrawnText>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnText {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub text: String,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl PageSurface for RecordingSurface {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.rects.push((x, y, width, height));
    }

    fn draw_text(&mut self, x: f32, y: f32, font_size: f32, text: &str) {
        self.texts.push(DrawnText {
            x,
            y,
            font_size,
            text: text.to_string(),
        });
    }
}
