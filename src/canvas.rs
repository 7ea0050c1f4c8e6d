use egui::Pos2;
use image::{Rgba, RgbaImage};

/// Default canvas edge length in pixels. One comic cell is a square bitmap.
pub const DEFAULT_CANVAS_SIZE: u32 = 900;

/// Background color — also what the eraser paints.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

// ============================================================================
// STROKE PAINT
// ============================================================================

/// Paint parameters for stroke rasterization. Pencil and eraser differ only
/// by color and width; the text/cloud paints reuse the same struct.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokePaint {
    pub color: Rgba<u8>,
    /// Stroke width (diameter) in canvas pixels.
    pub width: f32,
    pub anti_alias: bool,
}

impl StrokePaint {
    pub fn new(color: Rgba<u8>, width: f32) -> Self {
        Self {
            color,
            width: width.max(1.0),
            anti_alias: true,
        }
    }

    pub fn aliased(color: Rgba<u8>, width: f32) -> Self {
        Self {
            anti_alias: false,
            ..Self::new(color, width)
        }
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// An immutable full copy of the canvas pixel buffer. Owned by the history
/// stacks; restoring one overwrites the live surface in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pixels: RgbaImage,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

// ============================================================================
// PIXEL SURFACE
// ============================================================================

/// Fixed-size RGBA pixel buffer. All coordinate-taking methods are silent
/// no-ops outside `[0, width) × [0, height)` — callers never need to
/// pre-validate.
pub struct PixelSurface {
    pixels: RgbaImage,
}

impl PixelSurface {
    /// Create a surface filled with the background color.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), BACKGROUND),
        }
    }

    /// Wrap an already-decoded image. The image must be at final canvas
    /// dimensions; scaling happens at the I/O boundary.
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if self.in_bounds(x, y) {
            Some(*self.pixels.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if self.in_bounds(x, y) {
            self.pixels.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Source-over blend `color` onto (x, y) with the given coverage
    /// (0.0 ..= 1.0). Used for anti-aliased stamp edges and glyph pixels.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        if !self.in_bounds(x, y) || coverage <= 0.0 {
            return;
        }
        let cov = coverage.min(1.0);
        let src_a = color[3] as f32 / 255.0 * cov;
        if src_a <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        let inv = 1.0 - src_a;
        for c in 0..3 {
            dst[c] = (color[c] as f32 * src_a + dst[c] as f32 * inv).round() as u8;
        }
        let dst_a = dst[3] as f32 / 255.0;
        dst[3] = ((src_a + dst_a * inv) * 255.0).round() as u8;
    }

    /// Fill the whole buffer with one color.
    pub fn erase_all(&mut self, color: Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
    }

    /// Rasterize connected line segments between consecutive points.
    pub fn rasterize_stroke(&mut self, points: &[Pos2], paint: &StrokePaint) {
        match points {
            [] => {}
            [p] => self.stamp_circle(*p, paint),
            _ => {
                for pair in points.windows(2) {
                    self.draw_segment(pair[0], pair[1], paint);
                }
            }
        }
    }

    /// Draw one segment as a run of circle stamps with dense sub-pixel
    /// stepping, so the line stays smooth at any width.
    pub fn draw_segment(&mut self, from: Pos2, to: Pos2, paint: &StrokePaint) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < 0.1 {
            self.stamp_circle(from, paint);
            return;
        }

        let steps = distance.ceil() as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp_circle(Pos2::new(from.x + dx * t, from.y + dy * t), paint);
        }
    }

    fn stamp_circle(&mut self, center: Pos2, paint: &StrokePaint) {
        let radius = (paint.width * 0.5).max(0.5);
        let min_x = (center.x - radius).floor() as i32;
        let max_x = (center.x + radius).ceil() as i32;
        let min_y = (center.y - radius).floor() as i32;
        let max_y = (center.y + radius).ceil() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if paint.anti_alias {
                    // One-pixel soft edge at the rim.
                    let cov = (radius - dist + 0.5).clamp(0.0, 1.0);
                    if cov >= 1.0 {
                        self.put_pixel(x, y, paint.color);
                    } else {
                        self.blend_pixel(x, y, paint.color, cov);
                    }
                } else if dist <= radius {
                    self.put_pixel(x, y, paint.color);
                }
            }
        }
    }

    /// Full-buffer copy for the undo stacks. No implicit snapshotting
    /// happens anywhere else — mutating callers snapshot first.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pixels: self.pixels.clone(),
        }
    }

    /// Overwrite the surface with a previously taken snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.pixels = snapshot.pixels.clone();
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Detached copy of the pixel buffer (the `export_pixels` operation).
    pub fn to_image(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Replace the buffer wholesale. The caller is responsible for having
    /// scaled `pixels` to this surface's dimensions; a mismatched buffer is
    /// rejected so the canvas never changes size mid-session.
    pub fn install(&mut self, pixels: RgbaImage) -> bool {
        if pixels.width() == self.width() && pixels.height() == self.height() {
            self.pixels = pixels;
            true
        } else {
            false
        }
    }
}
