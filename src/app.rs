use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, TextureHandle, TextureOptions, Vec2};
use image::Rgba;

use crate::canvas::DEFAULT_CANVAS_SIZE;
use crate::components::dialogs::{ColorPickerDialog, TextPromptDialog};
use crate::components::tools::{Tool, MAX_TOOL_SIZE, MIN_TOOL_SIZE};
use crate::engine::{DrawingEngine, EngineRequest};
use crate::io;

/// Screen pixels one joystick tap pans the canvas by.
const PAN_STEP: f32 = 50.0;

pub struct InkCellApp {
    engine: DrawingEngine,
    /// GPU copy of the canvas, refreshed when the engine reports dirty.
    texture: Option<TextureHandle>,
    /// Mirror of the engine's undo/redo availability, fed by its listener.
    history_flags: Rc<Cell<(bool, bool)>>,

    color_picker: ColorPickerDialog,
    text_prompt: TextPromptDialog,

    session_path: Option<PathBuf>,
    modified: bool,
    status: Option<String>,

    show_exit_prompt: bool,
    allow_close: bool,
}

impl InkCellApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut engine = DrawingEngine::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE);
        let history_flags = Rc::new(Cell::new((false, false)));
        let sink = Rc::clone(&history_flags);
        engine.set_history_listener(Box::new(move |can_undo, can_redo| {
            sink.set((can_undo, can_redo));
        }));

        Self {
            engine,
            texture: None,
            history_flags,
            color_picker: ColorPickerDialog::default(),
            text_prompt: TextPromptDialog::default(),
            session_path: None,
            modified: false,
            status: None,
            show_exit_prompt: false,
            allow_close: false,
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let img = self.engine.surface().as_image();
        let color_image = ColorImage::from_rgba_unmultiplied(
            [img.width() as usize, img.height() as usize],
            img.as_raw(),
        );
        match &mut self.texture {
            Some(tex) => tex.set(color_image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("canvas", color_image, TextureOptions::NEAREST))
            }
        }
    }

    fn save_session(&mut self) {
        let path = match &self.session_path {
            Some(p) => p.clone(),
            None => {
                let picked = rfd::FileDialog::new()
                    .add_filter("PNG image", &["png"])
                    .set_file_name("cell.png")
                    .save_file();
                match picked {
                    Some(p) => {
                        self.session_path = Some(p.clone());
                        p
                    }
                    None => return,
                }
            }
        };

        match io::save_session(self.engine.surface(), &path) {
            Ok(()) => {
                self.modified = false;
                self.status = Some(format!("Saved to {}", path.display()));
            }
            Err(e) => self.status = Some(format!("Save failed: {}", e)),
        }
    }

    fn open_session(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp"])
            .pick_file()
        else {
            return;
        };
        let (surface, warning) =
            io::load_session(&path, DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE);
        self.engine.import_pixels(surface.to_image());
        self.session_path = Some(path);
        self.modified = false;
        self.status = warning;
    }

    fn import_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp"])
            .pick_file()
        else {
            return;
        };
        match io::open_scaled(&path, DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE) {
            Ok(img) => {
                self.engine.import_pixels(img);
                self.modified = true;
                self.status = Some(format!("Imported {}", path.display()));
            }
            Err(e) => self.status = Some(format!("Import failed: {}", e)),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let (can_undo, can_redo) = self.history_flags.get();

        ui.horizontal_wrapped(|ui| {
            for tool in Tool::all() {
                let selected = self.engine.tool() == Some(*tool);
                if ui.selectable_label(selected, tool.label()).clicked() && !self.engine.is_locked()
                {
                    self.engine.set_tool(Some(*tool));
                }
            }
            ui.separator();

            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                self.engine.undo();
                self.modified = true;
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                self.engine.redo();
                self.modified = true;
            }
            ui.separator();

            let swatch = color32_from_rgba(self.engine.color());
            let (rect, resp) = ui.allocate_exact_size(Vec2::splat(18.0), egui::Sense::click());
            ui.painter().rect_filled(rect, 3.0, swatch);
            let pick = ui.button("Color…").clicked();
            if resp.clicked() || pick {
                self.color_picker.open_with(swatch);
            }

            let mut size = self.engine.tool_size();
            if ui
                .add(egui::Slider::new(&mut size, MIN_TOOL_SIZE..=MAX_TOOL_SIZE).text("Size"))
                .changed()
            {
                self.engine.set_tool_size(size);
            }
            ui.separator();

            if ui.button("Zoom +").clicked() {
                self.engine.zoom_in();
            }
            if ui.button("Zoom −").clicked() {
                self.engine.zoom_out();
            }
            if ui.button("◀").clicked() {
                self.engine.pan(-PAN_STEP, 0.0);
            }
            if ui.button("▶").clicked() {
                self.engine.pan(PAN_STEP, 0.0);
            }
            if ui.button("▲").clicked() {
                self.engine.pan(0.0, -PAN_STEP);
            }
            if ui.button("▼").clicked() {
                self.engine.pan(0.0, PAN_STEP);
            }
            ui.separator();

            let mut locked = self.engine.is_locked();
            if ui.toggle_value(&mut locked, "Lock").changed() {
                self.engine.set_locked(locked);
            }
            if ui.button("Clear").clicked() && !self.engine.is_locked() {
                self.engine.clear_canvas();
                self.modified = true;
            }
            ui.separator();

            if ui.button("Open…").clicked() {
                self.open_session();
            }
            if ui.button("Import…").clicked() {
                self.import_image();
            }
            if ui.button("Save").clicked() {
                self.save_session();
            }
        });
    }

    fn canvas_panel(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, Color32::from_gray(45));

        if let Some(tex) = &self.texture {
            let vp = self.engine.viewport();
            let size = Vec2::new(
                self.engine.surface().width() as f32,
                self.engine.surface().height() as f32,
            ) * vp.scale();
            let rect = Rect::from_min_size(origin + vp.translate(), size);
            painter.image(
                tex.id(),
                rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        // Feed the pointer to the engine in panel-local coordinates.
        let local = |pos: Pos2| Pos2::new(pos.x - origin.x, pos.y - origin.y);
        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.engine.pointer_down(local(pos));
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.engine.pointer_move(local(pos));
            }
        }
        if response.drag_released() {
            let pos = response
                .interact_pointer_pos()
                .map(local)
                .unwrap_or(Pos2::new(-1.0, -1.0));
            match self.engine.pointer_up(pos) {
                Some(EngineRequest::TextPrompt { anchor }) => self.text_prompt.open_at(anchor),
                None => {}
            }
            self.modified = true;
        }
    }

    fn exit_prompt(&mut self, ctx: &egui::Context) {
        let mut save = false;
        let mut discard = false;
        let mut cancel = false;

        egui::Window::new("Unsaved changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Save the drawing before leaving?");
                ui.separator();
                ui.horizontal(|ui| {
                    save = ui.button("Save").clicked();
                    discard = ui.button("Discard").clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            });

        if save {
            self.save_session();
            if !self.modified {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            self.show_exit_prompt = false;
        } else if discard {
            self.allow_close = true;
            self.show_exit_prompt = false;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        } else if cancel {
            self.show_exit_prompt = false;
        }
    }
}

impl eframe::App for InkCellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Intercept the OS close while there are unsaved changes.
        if ctx.input(|i| i.viewport().close_requested()) && self.modified && !self.allow_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_exit_prompt = true;
        }

        if self.engine.take_dirty() || self.texture.is_none() {
            self.upload_texture(ctx);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        if let Some(status) = self.status.clone() {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(status);
                    if ui.small_button("×").clicked() {
                        self.status = None;
                    }
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| self.canvas_panel(ui));

        if let Some(color) = self.color_picker.show(ctx) {
            self.engine.set_color(rgba_from_color32(color));
        }
        if let Some((anchor, text)) = self.text_prompt.show(ctx) {
            self.engine.place_text(anchor, &text);
            self.modified = true;
        }
        if self.show_exit_prompt {
            self.exit_prompt(ctx);
        }
    }
}

fn rgba_from_color32(c: Color32) -> Rgba<u8> {
    let [r, g, b, a] = egui::Rgba::from(c).to_srgba_unmultiplied();
    Rgba([r, g, b, a])
}

fn color32_from_rgba(c: Rgba<u8>) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}
