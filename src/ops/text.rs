use ab_glyph::{point, Font, FontArc, ScaleFont};
use egui::{pos2, Pos2, Rect};
use image::Rgba;
use rand::Rng;

use crate::canvas::{PixelSurface, StrokePaint};

/// Annotation text size in canvas pixels.
pub const TEXT_SIZE: f32 = 20.0;
/// Padding between the text bounds and the cloud border.
pub const CLOUD_PADDING: f32 = 20.0;
/// Number of jittered segments decorating the border.
pub const CLOUD_SEGMENTS: usize = 20;
/// Maximum length of one jittered segment.
pub const CLOUD_MAX_LENGTH: f32 = 30.0;
const CLOUD_STROKE_WIDTH: f32 = 2.0;

/// Renders annotation text plus a randomized "speech-bubble cloud" border
/// onto the pixel surface. Does not snapshot — callers push undo first.
pub struct AnnotationRenderer {
    font: Option<FontArc>,
}

impl Default for AnnotationRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationRenderer {
    /// Look up a default sans-serif font from the system. A machine with no
    /// usable font yields a renderer that rejects every placement (the
    /// engine logs a warning and the pushed snapshot stays undoable).
    pub fn new() -> Self {
        Self {
            font: load_default_font(),
        }
    }

    pub fn with_font(font: Option<FontArc>) -> Self {
        Self { font }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render `text` with its baseline starting at `anchor`, then decorate
    /// the padded bounding box with jittered segments. Returns the padded
    /// box, or None when nothing could be drawn (empty text or no font).
    pub fn place_text<R: Rng>(
        &self,
        surface: &mut PixelSurface,
        anchor: Pos2,
        text: &str,
        color: Rgba<u8>,
        rng: &mut R,
    ) -> Option<Rect> {
        if text.is_empty() {
            return None;
        }
        let font = self.font.as_ref()?;
        let scaled = font.as_scaled(TEXT_SIZE);

        // Single-line layout: kern + advance along the baseline, outlining
        // each glyph straight into the surface.
        let mut cursor_x = 0.0f32;
        let mut last_glyph = None;
        for ch in text.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = last_glyph {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            let glyph =
                glyph_id.with_scale_and_position(TEXT_SIZE, point(anchor.x + cursor_x, anchor.y));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let gx = bounds.min.x as i32;
                let gy = bounds.min.y as i32;
                outlined.draw(|px, py, cov| {
                    surface.blend_pixel(gx + px as i32, gy + py as i32, color, cov);
                });
            }
            cursor_x += scaled.h_advance(glyph_id);
            last_glyph = Some(glyph_id);
        }

        let bounds = Rect::from_min_max(
            pos2(
                anchor.x - CLOUD_PADDING,
                anchor.y - scaled.ascent() - CLOUD_PADDING,
            ),
            pos2(anchor.x + cursor_x + CLOUD_PADDING, anchor.y + CLOUD_PADDING),
        );

        let cloud_paint = StrokePaint::new(color, CLOUD_STROKE_WIDTH);
        draw_cloud_border(surface, bounds, &cloud_paint, rng);
        Some(bounds)
    }
}

/// Decorate the box perimeter with [`CLOUD_SEGMENTS`] short segments: each
/// starts uniformly on a uniformly-chosen edge and extends by a uniform
/// length in `[0, CLOUD_MAX_LENGTH]` at a uniform angle in `[0, 2π)`.
pub fn draw_cloud_border<R: Rng>(
    surface: &mut PixelSurface,
    bounds: Rect,
    paint: &StrokePaint,
    rng: &mut R,
) {
    for _ in 0..CLOUD_SEGMENTS {
        let start = match rng.gen_range(0..4) {
            0 => pos2(bounds.min.x + rng.gen::<f32>() * bounds.width(), bounds.min.y),
            1 => pos2(bounds.max.x, bounds.min.y + rng.gen::<f32>() * bounds.height()),
            2 => pos2(bounds.min.x + rng.gen::<f32>() * bounds.width(), bounds.max.y),
            _ => pos2(bounds.min.x, bounds.min.y + rng.gen::<f32>() * bounds.height()),
        };
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        let length = rng.gen::<f32>() * CLOUD_MAX_LENGTH;
        let end = pos2(
            start.x + angle.cos() * length,
            start.y + angle.sin() * length,
        );
        surface.draw_segment(start, end, paint);
    }
}

fn load_default_font() -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], &Properties::new())
        .ok()?;
    let font = handle.load().ok()?;
    let data = font.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}
