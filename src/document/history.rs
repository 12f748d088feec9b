use super::Snapshot;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Undo/redo stacks of whole-document snapshots. Consecutive text edits to
/// the same block collapse into a single undo step.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: usize,
    last_text_edit: Option<String>,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
            last_text_edit: None,
        }
    }

    /// Remember `before` as the state to return to. `text_edit_of` names the
    /// block when the change is a content edit, so keystrokes coalesce.
    pub fn record(&mut self, before: Snapshot, text_edit_of: Option<&str>) {
        self.redo_stack.clear();
        let coalesce = matches!(
            (text_edit_of, self.last_text_edit.as_deref()),
            (Some(a), Some(b)) if a == b
        );
        self.last_text_edit = text_edit_of.map(String::from);
        if coalesce {
            return;
        }
        self.undo_stack.push(before);
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }

    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        self.last_text_edit = None;
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        self.last_text_edit = None;
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
