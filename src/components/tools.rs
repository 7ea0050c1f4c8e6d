use image::Rgba;

use crate::canvas::{StrokePaint, BACKGROUND};

pub const MIN_TOOL_SIZE: f32 = 1.0;
pub const MAX_TOOL_SIZE: f32 = 50.0;
const DEFAULT_TOOL_SIZE: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Fill,
    Text,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Eraser => "Eraser",
            Tool::Fill => "Fill",
            Tool::Text => "Text",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Pencil, Tool::Eraser, Tool::Fill, Tool::Text]
    }
}

/// Current tool, color and stroke width. Owned by the engine and mutated
/// only through the setters; persists across strokes within a session.
pub struct ToolState {
    tool: Option<Tool>,
    color: Rgba<u8>,
    size: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Some(Tool::Pencil),
            color: Rgba([0, 0, 0, 255]),
            size: DEFAULT_TOOL_SIZE,
        }
    }
}

impl ToolState {
    pub fn tool(&self) -> Option<Tool> {
        self.tool
    }

    /// `None` deselects; pointer input becomes a no-op until a tool is set.
    pub fn set_tool(&mut self, tool: Option<Tool>) {
        self.tool = tool;
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size.clamp(MIN_TOOL_SIZE, MAX_TOOL_SIZE);
    }

    pub fn pencil_paint(&self) -> StrokePaint {
        StrokePaint::new(self.color, self.size)
    }

    /// The eraser is a background-colored pencil at twice the width.
    pub fn eraser_paint(&self) -> StrokePaint {
        StrokePaint::new(BACKGROUND, self.size * 2.0)
    }

    /// Paint for the active stroke, if the current tool draws one.
    pub fn stroke_paint(&self) -> Option<StrokePaint> {
        match self.tool? {
            Tool::Pencil => Some(self.pencil_paint()),
            Tool::Eraser => Some(self.eraser_paint()),
            Tool::Fill | Tool::Text => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eraser_is_double_width_background() {
        let mut state = ToolState::default();
        state.set_size(8.0);
        let eraser = state.eraser_paint();
        assert_eq!(eraser.width, 16.0);
        assert_eq!(eraser.color, BACKGROUND);
        assert_eq!(state.pencil_paint().width, 8.0);
    }

    #[test]
    fn size_is_clamped() {
        let mut state = ToolState::default();
        state.set_size(0.0);
        assert_eq!(state.size(), MIN_TOOL_SIZE);
        state.set_size(500.0);
        assert_eq!(state.size(), MAX_TOOL_SIZE);
    }

    #[test]
    fn fill_and_text_have_no_stroke_paint() {
        let mut state = ToolState::default();
        assert!(state.stroke_paint().is_some());
        state.set_tool(Some(Tool::Fill));
        assert!(state.stroke_paint().is_none());
        state.set_tool(None);
        assert!(state.stroke_paint().is_none());
    }
}
