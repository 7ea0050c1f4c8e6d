//! inkcell — a raster comic-cell drawing and annotation engine.
//!
//! The drawing kernel lives in [`engine::DrawingEngine`]: a fixed-size pixel
//! canvas with pencil/eraser strokes, flood fill, annotated text with a
//! speech-bubble cloud border, bounded undo/redo and a pan/zoom viewport.
//! `app` wires the engine to an egui host.

pub mod app;
pub mod canvas;
pub mod components;
pub mod engine;
pub mod io;
pub mod logger;
pub mod ops;
pub mod viewport;

pub use canvas::{PixelSurface, Snapshot, StrokePaint, BACKGROUND, DEFAULT_CANVAS_SIZE};
pub use components::history::{HistoryManager, HISTORY_DEPTH};
pub use components::tools::{Tool, ToolState};
pub use engine::{DrawingEngine, EngineRequest};
pub use viewport::ViewportTransform;
