// Export Pipeline: rasterize the rendered preview at a fixed scale, embed the bitmap in a
// one-page PDF, and hand it back as a named file.

pub mod error;
pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod pipeline;
pub mod raster;

pub use error::ExportError;
pub use fonts::FontLibrary;
pub use pdf::PageSize;
pub use pipeline::{content_disposition, export_session, ExportSettings, Exporter};
pub use raster::GlyphRasterizer;
