// PDF overlay path: cover the original glyphs with an opaque rectangle and
// draw replacement text into the same bounding box. No content-stream
// rewriting of existing text operators — we only layer new graphics on top.

pub mod applier;
pub mod font_metrics;
pub mod geometry;
pub mod pdf;
pub mod surface;

pub use applier::{apply_edit, ApplierConfig};
pub use geometry::BoundingBox;
pub use surface::PageSurface;
