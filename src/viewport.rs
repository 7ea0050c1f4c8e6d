use egui::{Pos2, Vec2};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
const ZOOM_STEP: f32 = 0.1;

/// Pan/zoom state and the screen↔canvas coordinate mapping.
///
/// Screen position = canvas position · scale + translate. The translate
/// component is intentionally unbounded — the canvas can be panned fully
/// off-screen and panned back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    scale: f32,
    translate: Vec2,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl ViewportTransform {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    /// Step the zoom in by 0.1, saturating at the maximum.
    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + ZOOM_STEP).min(MAX_SCALE);
    }

    /// Step the zoom out by 0.1, saturating at the minimum.
    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - ZOOM_STEP).max(MIN_SCALE);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.translate += Vec2::new(dx, dy);
    }

    pub fn to_canvas_space(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.translate.x) / self.scale,
            (screen.y - self.translate.y) / self.scale,
        )
    }

    pub fn to_screen_space(&self, canvas: Pos2) -> Pos2 {
        Pos2::new(
            canvas.x * self.scale + self.translate.x,
            canvas.y * self.scale + self.translate.y,
        )
    }
}
