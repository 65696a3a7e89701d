//! Rasterization: paints a rendered preview into an RGB bitmap.
//!
//! `AppState` holds an `Arc<dyn Rasterizer>`. The production backend is
//! `GlyphRasterizer` (box layout + ab_glyph outlines); tests swap in stubs.

use std::sync::Arc;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{Rgb as Pixel, RgbImage};
use tracing::debug;

use crate::export::error::ExportError;
use crate::export::fonts::FontLibrary;
use crate::export::layout::{layout_preview, PageLayout, PaintOp, Rect, TextMeasure};
use crate::templates::tree::{Rgb, Weight};
use crate::templates::RenderedPreview;

/// Canvases larger than this are refused rather than allocated.
pub const MAX_CANVAS_PIXELS: u64 = 60_000_000;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Turns a rendered preview into pixels. `width_px` is the on-screen preview width;
/// the bitmap is `width_px × scale` wide and as tall as the content needs.
///
/// Called from a blocking worker, never on the async runtime.
pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        preview: &RenderedPreview,
        width_px: f32,
        scale: f32,
    ) -> Result<RgbImage, ExportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// GlyphRasterizer
// ────────────────────────────────────────────────────────────────────────────

pub struct GlyphRasterizer {
    fonts: Arc<FontLibrary>,
}

impl GlyphRasterizer {
    pub fn new(fonts: Arc<FontLibrary>) -> Self {
        Self { fonts }
    }
}

/// Regular and bold faces for one template font.
struct FaceSet {
    regular: Arc<FontVec>,
    bold: Arc<FontVec>,
}

impl FaceSet {
    fn face(&self, weight: Weight) -> &FontVec {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

impl TextMeasure for FaceSet {
    fn width(&self, text: &str, weight: Weight, px: f32) -> f32 {
        let scaled = self.face(weight).as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

impl Rasterizer for GlyphRasterizer {
    fn rasterize(
        &self,
        preview: &RenderedPreview,
        width_px: f32,
        scale: f32,
    ) -> Result<RgbImage, ExportError> {
        let unavailable = || ExportError::FontUnavailable(preview.font.to_string());
        let faces = FaceSet {
            regular: self
                .fonts
                .resolve(preview.font, Weight::Regular)
                .ok_or_else(unavailable)?,
            bold: self
                .fonts
                .resolve(preview.font, Weight::Bold)
                .ok_or_else(unavailable)?,
        };

        let layout = layout_preview(&preview.root, width_px, scale, &faces);
        let mut canvas = blank_canvas(&layout, preview.background)?;
        debug!(
            "Rasterizing template {} at {}x{}",
            preview.template_id,
            canvas.width(),
            canvas.height()
        );

        for op in &layout.ops {
            match op {
                PaintOp::Fill { rect, color } => fill_rect(&mut canvas, *rect, *color),
                PaintOp::Text {
                    x,
                    top,
                    line_height,
                    px,
                    weight,
                    color,
                    text,
                } => draw_line(
                    &mut canvas,
                    faces.face(*weight),
                    text,
                    (*x, *top),
                    *line_height,
                    *px,
                    *color,
                ),
            }
        }
        Ok(canvas)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Painting helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn blank_canvas(layout: &PageLayout, background: Rgb) -> Result<RgbImage, ExportError> {
    let width = layout.width.round().max(1.0) as u32;
    let height = layout.height.round().max(1.0) as u32;
    if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
        return Err(ExportError::Raster(format!(
            "canvas {width}x{height} exceeds the {MAX_CANVAS_PIXELS} pixel limit"
        )));
    }
    Ok(RgbImage::from_pixel(
        width,
        height,
        Pixel(background.to_array()),
    ))
}

/// Opaque fill, clipped to the canvas.
pub(crate) fn fill_rect(canvas: &mut RgbImage, rect: Rect, color: Rgb) {
    let x0 = rect.x.round().max(0.0) as u32;
    let y0 = rect.y.round().max(0.0) as u32;
    let x1 = ((rect.x + rect.w).round().max(0.0) as u32).min(canvas.width());
    let y1 = ((rect.y + rect.h).round().max(0.0) as u32).min(canvas.height());
    let pixel = Pixel(color.to_array());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, pixel);
        }
    }
}

/// Alpha-blends `color` at `coverage` onto one pixel; out-of-bounds writes are dropped.
pub(crate) fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let a = coverage.clamp(0.0, 1.0);
    let target = color.to_array();
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, &ink) in pixel.0.iter_mut().zip(target.iter()) {
        *channel = (f32::from(*channel) * (1.0 - a) + f32::from(ink) * a).round() as u8;
    }
}

/// Draws one line with its glyphs vertically centred in the line box.
fn draw_line(
    canvas: &mut RgbImage,
    font: &FontVec,
    text: &str,
    (x, top): (f32, f32),
    line_height: f32,
    px: f32,
    color: Rgb,
) {
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let baseline = top + (line_height - scaled.height()) / 2.0 + scaled.ascent();

    let mut caret = x;
    let mut previous = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            blend(
                canvas,
                bounds.min.x as i64 + i64::from(gx),
                bounds.min.y as i64 + i64::from(gy),
                color,
                coverage,
            );
        });
    }
}
