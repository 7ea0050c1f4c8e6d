//! End-to-end checks of the drawing engine through its public surface.

use egui::Pos2;
use image::Rgba;

use inkcell::ops::text::AnnotationRenderer;
use inkcell::{DrawingEngine, Tool, BACKGROUND, DEFAULT_CANVAS_SIZE};

const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn engine(size: u32) -> DrawingEngine {
    // Skip the system font lookup; these tests never render glyphs.
    DrawingEngine::new(size, size).with_annotations(AnnotationRenderer::with_font(None))
}

fn tap(engine: &mut DrawingEngine, pos: Pos2) {
    engine.pointer_down(pos);
    engine.pointer_up(pos);
}

#[test]
fn full_canvas_fill_then_refill_is_a_noop() {
    let mut engine = engine(DEFAULT_CANVAS_SIZE);
    engine.set_tool(Some(Tool::Fill));
    engine.set_color(BLUE);

    // The blank canvas is one 4-connected component: everything turns blue.
    tap(&mut engine, Pos2::new(450.0, 450.0));
    assert!(engine.export_pixels().pixels().all(|p| *p == BLUE));

    // A second fill with the same color leaves the buffer untouched.
    tap(&mut engine, Pos2::new(0.0, 0.0));
    assert!(engine.export_pixels().pixels().all(|p| *p == BLUE));
}

#[test]
fn stroke_fill_clear_history_walks_back_exactly() {
    let mut engine = engine(128);

    engine.pointer_down(Pos2::new(10.0, 64.0));
    engine.pointer_move(Pos2::new(60.0, 64.0));
    engine.pointer_up(Pos2::new(110.0, 64.0));
    let after_stroke = engine.export_pixels();

    engine.set_tool(Some(Tool::Fill));
    engine.set_color(BLUE);
    tap(&mut engine, Pos2::new(5.0, 5.0));
    let after_fill = engine.export_pixels();
    assert_ne!(after_fill, after_stroke);

    engine.clear_canvas();
    assert!(engine.export_pixels().pixels().all(|p| *p == BACKGROUND));

    engine.undo();
    assert_eq!(engine.export_pixels(), after_fill);
    // The fill pushed twice (pointer-down + its own guard), so two undos
    // walk back across it.
    engine.undo();
    engine.undo();
    assert_eq!(engine.export_pixels(), after_stroke);

    engine.redo();
    engine.redo();
    engine.redo();
    assert!(engine.export_pixels().pixels().all(|p| *p == BACKGROUND));
}

#[test]
fn export_import_round_trip_preserves_pixels() {
    let mut engine = engine(64);
    engine.pointer_down(Pos2::new(8.0, 8.0));
    engine.pointer_move(Pos2::new(40.0, 40.0));
    engine.pointer_up(Pos2::new(56.0, 20.0));

    let exported = engine.export_pixels();
    let mut other = self::engine(64);
    other.import_pixels(exported.clone());
    assert_eq!(other.export_pixels(), exported);
}

#[test]
fn locked_session_ignores_everything_until_unlocked() {
    let mut engine = engine(64);
    engine.set_locked(true);
    engine.set_tool(Some(Tool::Fill));
    engine.set_color(BLUE);
    tap(&mut engine, Pos2::new(32.0, 32.0));
    assert!(engine.export_pixels().pixels().all(|p| *p == BACKGROUND));

    engine.set_locked(false);
    tap(&mut engine, Pos2::new(32.0, 32.0));
    assert!(engine.export_pixels().pixels().all(|p| *p == BLUE));
}

#[test]
fn zoomed_viewport_maps_taps_onto_the_canvas() {
    let mut engine = engine(100);
    for _ in 0..10 {
        engine.zoom_in();
    }
    assert!((engine.viewport().scale() - 2.0).abs() < 1e-4);

    // Screen (150, 150) lands on canvas (75, 75) at 2× zoom.
    tap(&mut engine, Pos2::new(150.0, 150.0));
    assert_ne!(engine.surface().get_pixel(75, 75), Some(BACKGROUND));
    // Screen taps past the scaled canvas edge fall outside and do nothing.
    let before = engine.export_pixels();
    tap(&mut engine, Pos2::new(201.0, 100.0));
    assert_eq!(engine.export_pixels(), before);
}
