use crate::models::Draft;

/// Undo/redo stacks for the open edit session. The top of each stack is the
/// last element.
#[derive(Clone, Debug, Default)]
pub struct HistoryManager {
    undo: Vec<Draft>,
    redo: Vec<Draft>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `draft` unless it equals the top of the undo stack.
    /// A push invalidates the redo stack. Returns whether it pushed.
    pub fn record_if_changed(&mut self, draft: &Draft) -> bool {
        if self.undo.last() == Some(draft) {
            return false;
        }
        self.undo.push(draft.clone());
        self.redo.clear();
        true
    }

    /// Returns the draft to restore; `current` moves onto the redo stack.
    pub fn undo(&mut self, current: &Draft) -> Option<Draft> {
        let prev = self.undo.pop()?;
        self.redo.push(current.clone());
        Some(prev)
    }

    pub fn redo(&mut self, current: &Draft) -> Option<Draft> {
        let next = self.redo.pop()?;
        self.undo.push(current.clone());
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
