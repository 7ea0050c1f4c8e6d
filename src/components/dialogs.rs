use eframe::egui;
use egui::{Color32, Pos2};

// ============================================================================
// COLOR PICKER DIALOG
// ============================================================================

/// Modal color picker. The engine only ever sees the final choice.
pub struct ColorPickerDialog {
    pub open: bool,
    color: Color32,
}

impl Default for ColorPickerDialog {
    fn default() -> Self {
        Self {
            open: false,
            color: Color32::BLACK,
        }
    }
}

impl ColorPickerDialog {
    pub fn open_with(&mut self, current: Color32) {
        self.color = current;
        self.open = true;
    }

    /// Show the dialog; returns the picked color once OK is clicked.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<Color32> {
        if !self.open {
            return None;
        }
        let mut result = None;
        let mut should_close = false;

        egui::Window::new("Pick a color")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::color_picker::color_picker_color32(
                    ui,
                    &mut self.color,
                    egui::color_picker::Alpha::OnlyBlend,
                );
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        result = Some(self.color);
                        should_close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.open = false;
        }
        result
    }
}

// ============================================================================
// TEXT PROMPT DIALOG
// ============================================================================

/// Modal text-entry prompt for the text tool. Remembers the canvas-space
/// anchor the pointer released at; an empty entry or Cancel discards it.
#[derive(Default)]
pub struct TextPromptDialog {
    pub open: bool,
    buffer: String,
    anchor: Pos2,
}

impl TextPromptDialog {
    pub fn open_at(&mut self, anchor: Pos2) {
        self.anchor = anchor;
        self.buffer.clear();
        self.open = true;
    }

    /// Show the prompt; returns `(anchor, text)` on OK with non-empty text.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<(Pos2, String)> {
        if !self.open {
            return None;
        }
        let mut result = None;
        let mut should_close = false;

        let enter = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter));
        let esc = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));

        egui::Window::new("Enter text")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let edit = ui.text_edit_singleline(&mut self.buffer);
                edit.request_focus();
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || enter {
                        if !self.buffer.is_empty() {
                            result = Some((self.anchor, std::mem::take(&mut self.buffer)));
                        }
                        should_close = true;
                    }
                    if ui.button("Cancel").clicked() || esc {
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.open = false;
        }
        result
    }
}
