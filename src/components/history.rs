use std::collections::VecDeque;

use crate::canvas::{PixelSurface, Snapshot};

/// How many undo snapshots are retained. At 900×900 RGBA a full stack is
/// roughly 32 MB, which is the accepted cost of whole-buffer undo.
pub const HISTORY_DEPTH: usize = 10;

/// Bounded undo/redo stacks of full-canvas snapshots.
///
/// Callers snapshot *before* mutating: every mutating operation pushes
/// exactly once via [`HistoryManager::push_undo`], never after the fact.
pub struct HistoryManager {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    depth: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HISTORY_DEPTH)
    }
}

impl HistoryManager {
    pub fn new(depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(depth),
            redo_stack: VecDeque::with_capacity(depth),
            depth,
        }
    }

    /// Snapshot the current surface onto the undo stack. Clears the redo
    /// stack and evicts the oldest entry once the depth cap is reached.
    pub fn push_undo(&mut self, surface: &PixelSurface) {
        self.redo_stack.clear();
        if self.undo_stack.len() >= self.depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(surface.snapshot());
    }

    /// Move the current surface state to the redo stack and restore the most
    /// recent undo snapshot. Returns false (and does nothing) when empty.
    pub fn undo(&mut self, surface: &mut PixelSurface) -> bool {
        let snapshot = match self.undo_stack.pop_back() {
            Some(s) => s,
            None => return false,
        };
        self.redo_stack.push_back(surface.snapshot());
        surface.restore(&snapshot);
        true
    }

    /// Symmetric counterpart of [`HistoryManager::undo`].
    pub fn redo(&mut self, surface: &mut PixelSurface) -> bool {
        let snapshot = match self.redo_stack.pop_back() {
            Some(s) => s,
            None => return false,
        };
        self.undo_stack.push_back(surface.snapshot());
        surface.restore(&snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}
