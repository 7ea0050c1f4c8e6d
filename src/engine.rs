use egui::Pos2;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::canvas::{PixelSurface, BACKGROUND};
use crate::components::history::HistoryManager;
use crate::components::tools::{Tool, ToolState};
use crate::ops::fill::flood_fill;
use crate::ops::text::AnnotationRenderer;
use crate::viewport::ViewportTransform;

/// A request the engine cannot satisfy on its own; the host fulfills it and
/// calls back into the engine (e.g. [`DrawingEngine::place_text`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineRequest {
    /// Open the text-entry prompt; on a non-empty result call `place_text`
    /// with this anchor.
    TextPrompt { anchor: Pos2 },
}

/// Callback the host registers to mirror undo/redo availability into its
/// controls. Fired after every operation that can change availability.
pub type HistoryListener = Box<dyn FnMut(bool, bool)>;

/// The drawing kernel: owns the pixel surface, tool state, viewport and
/// history, and interprets pointer input as a stroke lifecycle.
///
/// Pointer methods take *screen* coordinates; the viewport transform maps
/// them into canvas space. Everything runs synchronously on the caller's
/// thread — no operation suspends.
pub struct DrawingEngine {
    surface: PixelSurface,
    history: HistoryManager,
    viewport: ViewportTransform,
    tools: ToolState,
    annotations: AnnotationRenderer,
    /// Canvas-space points of the active stroke. `Some` while stroking.
    stroke: Option<Vec<Pos2>>,
    locked: bool,
    dirty: bool,
    rng: StdRng,
    history_listener: Option<HistoryListener>,
}

impl DrawingEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_surface(PixelSurface::new(width, height))
    }

    /// Start a session on an already-loaded canvas (see `io::load_session`).
    pub fn with_surface(surface: PixelSurface) -> Self {
        Self {
            surface,
            history: HistoryManager::default(),
            viewport: ViewportTransform::default(),
            tools: ToolState::default(),
            annotations: AnnotationRenderer::new(),
            stroke: None,
            locked: false,
            dirty: true,
            rng: StdRng::from_entropy(),
            history_listener: None,
        }
    }

    /// Swap in a specific annotation renderer (deterministic fonts in tests).
    pub fn with_annotations(mut self, annotations: AnnotationRenderer) -> Self {
        self.annotations = annotations;
        self
    }

    // ---- host wiring -------------------------------------------------------

    /// Register the undo/redo availability callback. Fires once immediately
    /// so the host's controls start in the right state.
    pub fn set_history_listener(&mut self, listener: HistoryListener) {
        self.history_listener = Some(listener);
        self.notify_history();
    }

    fn notify_history(&mut self) {
        let (can_undo, can_redo) = (self.history.can_undo(), self.history.can_redo());
        if let Some(listener) = self.history_listener.as_mut() {
            listener(can_undo, can_redo);
        }
    }

    /// True once since the last call when the pixel buffer or viewport
    /// changed and the host should repaint.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ---- pointer state machine --------------------------------------------

    fn in_canvas(&self, p: Pos2) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x < self.surface.width() as f32
            && p.y < self.surface.height() as f32
    }

    /// Idle → Stroking, if a tool is selected, the engine is not locked and
    /// the transformed point lands on the canvas. Pushes the undo snapshot
    /// that guards the whole stroke.
    pub fn pointer_down(&mut self, screen: Pos2) {
        if self.locked {
            return;
        }
        let p = self.viewport.to_canvas_space(screen);
        if !self.in_canvas(p) || self.tools.tool().is_none() {
            return;
        }
        self.history.push_undo(&self.surface);
        self.stroke = Some(vec![p]);
        self.notify_history();
    }

    /// Append a point and rasterize the new segment immediately so partial
    /// strokes render live. Out-of-bounds points are consumed and dropped.
    pub fn pointer_move(&mut self, screen: Pos2) {
        if self.locked {
            return;
        }
        let p = self.viewport.to_canvas_space(screen);
        if !self.in_canvas(p) {
            return;
        }
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        let Some(&last) = stroke.last() else {
            return;
        };
        stroke.push(p);
        if let Some(paint) = self.tools.stroke_paint() {
            self.surface.draw_segment(last, p, &paint);
            self.dirty = true;
        }
    }

    /// Stroking → Idle. Finalizes rasterization, or dispatches the fill /
    /// text behavior for those tools.
    pub fn pointer_up(&mut self, screen: Pos2) -> Option<EngineRequest> {
        if self.locked {
            return None;
        }
        let mut stroke = self.stroke.take()?;
        let p = self.viewport.to_canvas_space(screen);
        if self.in_canvas(p) {
            stroke.push(p);
        }
        let end = match stroke.last() {
            Some(p) => *p,
            None => return None,
        };

        match self.tools.tool() {
            Some(tool @ (Tool::Pencil | Tool::Eraser)) => {
                let paint = if tool == Tool::Pencil {
                    self.tools.pencil_paint()
                } else {
                    self.tools.eraser_paint()
                };
                if stroke.len() == 1 {
                    self.surface.rasterize_stroke(&stroke, &paint);
                } else {
                    let from = stroke[stroke.len() - 2];
                    self.surface.draw_segment(from, end, &paint);
                }
                self.dirty = true;
                self.notify_history();
                None
            }
            Some(Tool::Fill) => {
                // The fill guards itself with its own snapshot, on top of
                // the one taken at pointer-down.
                self.history.push_undo(&self.surface);
                if flood_fill(
                    &mut self.surface,
                    end.x as i32,
                    end.y as i32,
                    self.tools.color(),
                ) {
                    self.dirty = true;
                }
                self.notify_history();
                None
            }
            Some(Tool::Text) => Some(EngineRequest::TextPrompt { anchor: end }),
            None => None,
        }
    }

    /// Fulfill a [`EngineRequest::TextPrompt`]. Empty input is rejected here
    /// as well as at the prompt, so it never costs an undo slot.
    pub fn place_text(&mut self, anchor: Pos2, text: &str) {
        if text.is_empty() {
            return;
        }
        self.history.push_undo(&self.surface);
        let color = self.tools.color();
        match self
            .annotations
            .place_text(&mut self.surface, anchor, text, color, &mut self.rng)
        {
            Some(_) => self.dirty = true,
            // Snapshot stays pushed: the user can still undo to the
            // pre-attempt state.
            None => crate::log_warn!("Annotation skipped: no usable system font"),
        }
        self.notify_history();
    }

    // ---- exposed operations ------------------------------------------------

    pub fn set_tool(&mut self, tool: Option<Tool>) {
        self.tools.set_tool(tool);
    }

    pub fn tool(&self) -> Option<Tool> {
        self.tools.tool()
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.tools.set_color(color);
    }

    pub fn color(&self) -> Rgba<u8> {
        self.tools.color()
    }

    pub fn set_tool_size(&mut self, size: f32) {
        self.tools.set_size(size);
    }

    pub fn tool_size(&self) -> f32 {
        self.tools.size()
    }

    pub fn undo(&mut self) {
        if self.history.undo(&mut self.surface) {
            self.dirty = true;
            self.notify_history();
        }
    }

    pub fn redo(&mut self) {
        if self.history.redo(&mut self.surface) {
            self.dirty = true;
            self.notify_history();
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.dirty = true;
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.dirty = true;
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.viewport.pan(dx, dy);
        self.dirty = true;
    }

    /// Lock gate: while locked every pointer event is consumed without any
    /// state transition or mutation. Locking aborts an in-flight stroke.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked {
            self.stroke = None;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Blank the canvas to the background color, undoably.
    pub fn clear_canvas(&mut self) {
        self.history.push_undo(&self.surface);
        self.surface.erase_all(BACKGROUND);
        self.dirty = true;
        self.notify_history();
    }

    /// Detached copy of the pixel buffer for the image codec.
    pub fn export_pixels(&self) -> RgbaImage {
        self.surface.to_image()
    }

    /// Install an externally decoded buffer, scaling it to canvas
    /// dimensions first. Replaces the picture outside the undo history,
    /// like loading a session does.
    pub fn import_pixels(&mut self, pixels: RgbaImage) {
        let scaled = crate::io::scale_to(pixels, self.surface.width(), self.surface.height());
        self.surface.install(scaled);
        self.dirty = true;
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Snapshot;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn engine() -> DrawingEngine {
        DrawingEngine::new(64, 64).with_annotations(AnnotationRenderer::with_font(None))
    }

    fn draw_stroke(engine: &mut DrawingEngine, from: Pos2, to: Pos2) {
        engine.pointer_down(from);
        engine.pointer_move(Pos2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
        engine.pointer_move(to);
        engine.pointer_up(to);
    }

    fn all_background(engine: &DrawingEngine) -> bool {
        engine.surface().as_image().pixels().all(|p| *p == BACKGROUND)
    }

    #[test]
    fn stroke_then_undo_restores_blank_and_enables_redo() {
        let mut engine = engine();
        draw_stroke(&mut engine, Pos2::new(10.0, 10.0), Pos2::new(40.0, 40.0));
        assert!(!all_background(&engine));
        assert!(engine.can_undo());

        engine.undo();
        assert!(all_background(&engine));
        assert!(engine.can_redo());

        engine.redo();
        assert!(!all_background(&engine));
    }

    #[test]
    fn undo_redo_round_trip_is_pixel_exact() {
        let mut engine = engine();
        draw_stroke(&mut engine, Pos2::new(5.0, 5.0), Pos2::new(30.0, 12.0));
        draw_stroke(&mut engine, Pos2::new(12.0, 40.0), Pos2::new(50.0, 44.0));
        let before: Snapshot = engine.surface().snapshot();

        engine.undo();
        engine.redo();
        assert_eq!(engine.surface().snapshot(), before);
    }

    #[test]
    fn eleven_mutations_keep_history_at_ten() {
        let mut engine = engine();
        for i in 0..11 {
            let y = 2.0 + i as f32 * 5.0;
            draw_stroke(&mut engine, Pos2::new(2.0, y), Pos2::new(60.0, y));
        }
        let mut undos = 0;
        while engine.can_undo() {
            engine.undo();
            undos += 1;
        }
        assert_eq!(undos, 10);
        // The pre-first-stroke state was evicted, so the oldest reachable
        // state still shows the first stroke.
        assert!(!all_background(&engine));
    }

    #[test]
    fn fill_tool_floods_at_the_up_point() {
        let mut engine = engine();
        engine.set_tool(Some(Tool::Fill));
        engine.set_color(BLUE);
        engine.pointer_down(Pos2::new(32.0, 32.0));
        engine.pointer_up(Pos2::new(32.0, 32.0));

        assert!(engine
            .surface()
            .as_image()
            .pixels()
            .all(|p| *p == BLUE));

        // Refilling with the same color changes nothing.
        engine.pointer_down(Pos2::new(1.0, 1.0));
        engine.pointer_up(Pos2::new(1.0, 1.0));
        assert!(engine.surface().as_image().pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn locked_engine_consumes_pointer_events_silently() {
        let mut engine = engine();
        engine.set_locked(true);
        engine.pointer_down(Pos2::new(10.0, 10.0));
        engine.pointer_move(Pos2::new(20.0, 20.0));
        assert!(engine.pointer_up(Pos2::new(20.0, 20.0)).is_none());
        assert!(all_background(&engine));
        assert!(!engine.can_undo());

        engine.set_locked(false);
        draw_stroke(&mut engine, Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0));
        assert!(!all_background(&engine));
    }

    #[test]
    fn out_of_bounds_and_toolless_events_are_ignored() {
        let mut engine = engine();
        engine.pointer_down(Pos2::new(-5.0, 10.0));
        assert!(engine.pointer_up(Pos2::new(-5.0, 10.0)).is_none());
        assert!(!engine.can_undo());

        engine.set_tool(None);
        engine.pointer_down(Pos2::new(10.0, 10.0));
        assert!(engine.pointer_up(Pos2::new(10.0, 10.0)).is_none());
        assert!(!engine.can_undo());
        assert!(all_background(&engine));
    }

    #[test]
    fn text_tool_requests_a_prompt_and_empty_text_is_rejected() {
        let mut engine = engine();
        engine.set_tool(Some(Tool::Text));
        engine.pointer_down(Pos2::new(30.0, 30.0));
        let request = engine.pointer_up(Pos2::new(30.0, 30.0));
        assert_eq!(
            request,
            Some(EngineRequest::TextPrompt {
                anchor: Pos2::new(30.0, 30.0)
            })
        );

        // Empty text never costs an undo slot beyond the pointer-down push.
        let undo_before = engine.can_undo();
        engine.place_text(Pos2::new(30.0, 30.0), "");
        assert_eq!(engine.can_undo(), undo_before);
    }

    #[test]
    fn fontless_text_placement_keeps_its_snapshot_undoable() {
        let mut engine = engine();
        engine.set_tool(Some(Tool::Fill));
        engine.set_color(BLUE);
        engine.pointer_down(Pos2::new(32.0, 32.0));
        engine.pointer_up(Pos2::new(32.0, 32.0));

        // Renderer has no font: nothing is drawn, but the push stays.
        engine.place_text(Pos2::new(20.0, 20.0), "hello");
        assert!(engine.surface().as_image().pixels().all(|p| *p == BLUE));
        engine.undo();
        assert!(engine.surface().as_image().pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn clear_canvas_is_undoable() {
        let mut engine = engine();
        draw_stroke(&mut engine, Pos2::new(5.0, 5.0), Pos2::new(20.0, 20.0));
        let drawn = engine.surface().snapshot();

        engine.clear_canvas();
        assert!(all_background(&engine));
        engine.undo();
        assert_eq!(engine.surface().snapshot(), drawn);
    }

    #[test]
    fn history_listener_tracks_availability() {
        let mut engine = engine();
        let seen: Rc<RefCell<Vec<(bool, bool)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.set_history_listener(Box::new(move |u, r| sink.borrow_mut().push((u, r))));
        assert_eq!(seen.borrow().last(), Some(&(false, false)));

        draw_stroke(&mut engine, Pos2::new(5.0, 5.0), Pos2::new(20.0, 20.0));
        assert_eq!(seen.borrow().last(), Some(&(true, false)));

        engine.undo();
        assert_eq!(seen.borrow().last(), Some(&(false, true)));
    }

    #[test]
    fn import_pixels_scales_and_installs() {
        let mut engine = engine();
        engine.import_pixels(RgbaImage::from_pixel(8, 8, BLUE));
        assert_eq!(engine.surface().width(), 64);
        assert!(engine.surface().as_image().pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn pointer_events_respect_the_viewport_transform() {
        let mut engine = engine();
        engine.pan(10.0, 10.0);
        // Screen (5, 5) maps to canvas (-5, -5): ignored.
        engine.pointer_down(Pos2::new(5.0, 5.0));
        assert!(!engine.can_undo());

        // Screen (20, 20) maps to canvas (10, 10): starts a stroke.
        engine.pointer_down(Pos2::new(20.0, 20.0));
        engine.pointer_up(Pos2::new(20.0, 20.0));
        assert!(engine.can_undo());
        assert_ne!(engine.surface().get_pixel(10, 10), Some(BACKGROUND));
    }
}
