//! In-memory block sequence for one open page.
//!
//! Every change replaces the shared snapshot, so anything holding an older
//! [`Snapshot`] keeps seeing the old sequence and can detect a change with
//! [`Arc::ptr_eq`]. Calls that would break an invariant (unknown id, deleting
//! the last block, moving past an edge) leave the snapshot untouched.

mod history;
pub mod slash;

pub use history::{History, DEFAULT_HISTORY_LIMIT};

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{Block, BlockType, Page, DIVIDER_CONTENT};

use slash::SlashCommand;

pub type Snapshot = Arc<Vec<Block>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashOutcome {
    Applied,
    /// The command asks the assistant to write into the block.
    ContinueWriting,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct BlockDocument {
    blocks: Snapshot,
    active: Option<String>,
    history: History,
}

impl BlockDocument {
    /// An empty sequence is seeded with one empty paragraph.
    pub fn new(blocks: Vec<Block>) -> Self {
        let blocks = if blocks.is_empty() {
            vec![Block::paragraph("")]
        } else {
            blocks
        };
        Self {
            blocks: Arc::new(blocks),
            active: None,
            history: History::default(),
        }
    }

    pub fn from_page(page: &Page) -> Self {
        Self::new(page.content.clone())
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    pub fn position(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }

    pub fn active_block(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Focus a block; unknown ids clear the focus.
    pub fn set_active(&mut self, block_id: Option<&str>) {
        self.active = block_id
            .filter(|id| self.position(id).is_some())
            .map(String::from);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Insert an empty block of `block_type` right after `anchor_id` and focus
    /// it. An unknown anchor is a delete/insert race and does nothing.
    pub fn insert_after(&mut self, anchor_id: &str, block_type: BlockType) -> Snapshot {
        let Some(pos) = self.position(anchor_id) else {
            debug!(anchor_id, "insert_after: anchor not found");
            return self.snapshot();
        };
        let block = Block::new(block_type, "");
        let new_id = block.id.clone();
        let mut next = self.edit();
        next.insert(pos + 1, block);
        self.commit(next, None);
        self.active = Some(new_id);
        self.snapshot()
    }

    /// Remove a block. The sole remaining block is never removed.
    pub fn delete(&mut self, block_id: &str) -> Snapshot {
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        if self.blocks.len() <= 1 {
            debug!(block_id, "delete: refusing to remove the last block");
            return self.snapshot();
        }
        let mut next = self.edit();
        next.remove(pos);
        self.commit(next, None);
        if self.active.as_deref() == Some(block_id) {
            self.active = None;
        }
        self.snapshot()
    }

    /// Backspace in an empty block: remove it and focus the block before it
    /// (or the new first block when it was first). Non-empty blocks and the
    /// sole block are left alone.
    pub fn backspace(&mut self, block_id: &str) -> Snapshot {
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        if !self.blocks[pos].is_empty() || self.blocks.len() <= 1 {
            return self.snapshot();
        }
        let mut next = self.edit();
        next.remove(pos);
        let focus = next[pos.saturating_sub(1)].id.clone();
        self.commit(next, None);
        self.active = Some(focus);
        self.snapshot()
    }

    pub fn move_block(&mut self, block_id: &str, direction: Direction) -> Snapshot {
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        let target = match direction {
            Direction::Up if pos > 0 => pos - 1,
            Direction::Down if pos + 1 < self.blocks.len() => pos + 1,
            _ => return self.snapshot(),
        };
        let mut next = self.edit();
        next.swap(pos, target);
        self.commit(next, None);
        self.snapshot()
    }

    pub fn duplicate(&mut self, block_id: &str) -> Snapshot {
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        let copy = self.blocks[pos].duplicate();
        let mut next = self.edit();
        next.insert(pos + 1, copy);
        self.commit(next, None);
        self.snapshot()
    }

    pub fn update_content(&mut self, block_id: &str, content: impl Into<Value>) -> Snapshot {
        let content = content.into();
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        if self.blocks[pos].content == content {
            return self.snapshot();
        }
        let mut next = self.edit();
        next[pos].content = content;
        next[pos].updated_at = Utc::now();
        self.commit(next, Some(block_id));
        self.snapshot()
    }

    /// Shallow-merge `patch` into the block's properties.
    pub fn update_properties(&mut self, block_id: &str, patch: Map<String, Value>) -> Snapshot {
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        if patch.is_empty() {
            return self.snapshot();
        }
        let mut next = self.edit();
        let block = &mut next[pos];
        block.properties.extend(patch);
        block.updated_at = Utc::now();
        self.commit(next, None);
        self.snapshot()
    }

    /// Flip the `completed` property of a to-do.
    pub fn toggle_completed(&mut self, block_id: &str) -> Snapshot {
        let Some(block) = self.get(block_id) else {
            return self.snapshot();
        };
        let mut patch = Map::new();
        patch.insert("completed".into(), Value::Bool(!block.is_completed()));
        self.update_properties(block_id, patch)
    }

    /// Reassign the type. Content is kept as-is, except that a divider always
    /// holds the divider literal and leaving a divider clears it.
    pub fn change_type(&mut self, block_id: &str, new_type: BlockType) -> Snapshot {
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        let old_type = self.blocks[pos].block_type;
        if old_type == new_type {
            return self.snapshot();
        }
        let mut next = self.edit();
        let block = &mut next[pos];
        block.block_type = new_type;
        if new_type == BlockType::Divider {
            block.content = Value::String(DIVIDER_CONTENT.into());
        } else if old_type == BlockType::Divider {
            block.content = Value::String(String::new());
        }
        block.updated_at = Utc::now();
        self.commit(next, None);
        self.snapshot()
    }

    /// Apply a slash-menu selection to a block.
    pub fn apply_slash(&mut self, block_id: &str, command: &SlashCommand) -> SlashOutcome {
        if self.position(block_id).is_none() {
            return SlashOutcome::Ignored;
        }
        match command.action.resolve() {
            Some((block_type, content)) => {
                self.change_type(block_id, block_type);
                if let Some(content) = content {
                    self.update_content(block_id, content);
                }
                self.active = Some(block_id.to_string());
                SlashOutcome::Applied
            }
            None => SlashOutcome::ContinueWriting,
        }
    }

    /// Multi-line paste: the first non-blank line replaces the block's content
    /// and every later non-blank line becomes a paragraph right after it, in
    /// order. Pastes without a line break are left to the caller.
    pub fn split_paste(&mut self, block_id: &str, raw: &str) -> Snapshot {
        if !needs_split(raw) {
            return self.snapshot();
        }
        let Some(pos) = self.position(block_id) else {
            return self.snapshot();
        };
        let mut lines = raw
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty());
        let Some(first) = lines.next() else {
            return self.snapshot();
        };

        let mut next = self.edit();
        next[pos].content = Value::String(first.to_string());
        next[pos].updated_at = Utc::now();
        let mut last_id = next[pos].id.clone();
        for (offset, line) in lines.enumerate() {
            let block = Block::paragraph(line);
            last_id = block.id.clone();
            next.insert(pos + 1 + offset, block);
        }
        debug!(block_id, added = next.len() - self.blocks.len(), "split paste");
        self.commit(next, None);
        self.active = Some(last_id);
        self.snapshot()
    }

    pub fn undo(&mut self) -> Snapshot {
        if let Some(previous) = self.history.undo(self.snapshot()) {
            self.blocks = previous;
            self.repair_active();
        }
        self.snapshot()
    }

    pub fn redo(&mut self) -> Snapshot {
        if let Some(next) = self.history.redo(self.snapshot()) {
            self.blocks = next;
            self.repair_active();
        }
        self.snapshot()
    }

    /// Copy the current sequence into `page`.
    pub fn write_into(&self, page: &mut Page) {
        page.content = self.blocks.to_vec();
    }

    fn edit(&self) -> Vec<Block> {
        self.blocks.as_ref().clone()
    }

    fn commit(&mut self, next: Vec<Block>, text_edit_of: Option<&str>) {
        let before = std::mem::replace(&mut self.blocks, Arc::new(next));
        self.history.record(before, text_edit_of);
    }

    fn repair_active(&mut self) {
        if let Some(id) = self.active.clone() {
            if self.position(&id).is_none() {
                self.active = None;
            }
        }
    }
}

/// Whether a paste should be split into blocks rather than typed in.
pub fn needs_split(raw: &str) -> bool {
    raw.contains('\n')
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::test_helpers::{make_block, welcome_page};

    fn doc(texts: &[&str]) -> BlockDocument {
        BlockDocument::new(texts.iter().map(|t| make_block(t)).collect())
    }

    fn texts(doc: &BlockDocument) -> Vec<String> {
        doc.blocks().iter().map(|b| b.text().to_string()).collect()
    }

    fn ids(doc: &BlockDocument) -> Vec<String> {
        doc.blocks().iter().map(|b| b.id.clone()).collect()
    }

    fn assert_unique_ids(doc: &BlockDocument) {
        let set: HashSet<String> = ids(doc).into_iter().collect();
        assert_eq!(set.len(), doc.len());
    }

    #[test]
    fn empty_document_is_seeded_with_one_block() {
        let doc = BlockDocument::new(vec![]);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].block_type, BlockType::Paragraph);
    }

    // --- insert_after ---

    #[test]
    fn insert_after_fourth_block_of_welcome_page() {
        let page = welcome_page();
        let mut doc = BlockDocument::from_page(&page);
        assert_eq!(doc.len(), 7);
        let before: HashSet<String> = ids(&doc).into_iter().collect();

        doc.insert_after("block_4", BlockType::Paragraph);

        assert_eq!(doc.len(), 8);
        assert_eq!(doc.blocks()[3].id, "block_4");
        let inserted = &doc.blocks()[4];
        assert!(!before.contains(&inserted.id));
        assert!(inserted.is_empty());
        assert_eq!(doc.active_block(), Some(inserted.id.as_str()));
        assert_unique_ids(&doc);
    }

    #[test]
    fn insert_after_unknown_anchor_is_noop() {
        let mut doc = doc(&["a", "b"]);
        let before = doc.snapshot();
        let after = doc.insert_after("missing", BlockType::Paragraph);
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn insert_divider_carries_literal() {
        let mut doc = doc(&["a"]);
        let anchor = doc.blocks()[0].id.clone();
        doc.insert_after(&anchor, BlockType::Divider);
        assert_eq!(doc.blocks()[1].text(), "---");
    }

    // --- delete / backspace ---

    #[test]
    fn delete_last_remaining_block_is_noop() {
        let mut doc = doc(&["only"]);
        let id = doc.blocks()[0].id.clone();
        let before = doc.snapshot();
        let after = doc.delete(&id);
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn delete_removes_block_and_clears_focus() {
        let mut doc = doc(&["a", "b", "c"]);
        let id = doc.blocks()[1].id.clone();
        doc.set_active(Some(&id));
        doc.delete(&id);
        assert_eq!(texts(&doc), vec!["a", "c"]);
        assert_eq!(doc.active_block(), None);
    }

    #[test]
    fn backspace_on_empty_block_focuses_previous() {
        let mut doc = doc(&["a", "", "c"]);
        let prev = doc.blocks()[0].id.clone();
        let empty = doc.blocks()[1].id.clone();
        doc.backspace(&empty);
        assert_eq!(texts(&doc), vec!["a", "c"]);
        assert_eq!(doc.active_block(), Some(prev.as_str()));
    }

    #[test]
    fn backspace_on_first_empty_block_focuses_next() {
        let mut doc = doc(&["", "b"]);
        let first = doc.blocks()[0].id.clone();
        let next = doc.blocks()[1].id.clone();
        doc.backspace(&first);
        assert_eq!(doc.active_block(), Some(next.as_str()));
    }

    #[test]
    fn backspace_ignores_non_empty_and_sole_blocks() {
        let mut doc = doc(&["a", "b"]);
        let id = doc.blocks()[0].id.clone();
        doc.backspace(&id);
        assert_eq!(doc.len(), 2);

        let mut single = self::doc(&[""]);
        let id = single.blocks()[0].id.clone();
        single.backspace(&id);
        assert_eq!(single.len(), 1);
    }

    // --- move ---

    #[test]
    fn move_up_then_down_round_trips() {
        let mut doc = doc(&["a", "b", "c"]);
        let original = ids(&doc);
        let id = original[1].clone();
        doc.move_block(&id, Direction::Up);
        assert_eq!(texts(&doc), vec!["b", "a", "c"]);
        doc.move_block(&id, Direction::Down);
        assert_eq!(ids(&doc), original);
    }

    #[test]
    fn move_past_boundary_is_noop() {
        let mut doc = doc(&["a", "b"]);
        let first = doc.blocks()[0].id.clone();
        let last = doc.blocks()[1].id.clone();
        let before = doc.snapshot();
        assert!(Arc::ptr_eq(&before, &doc.move_block(&first, Direction::Up)));
        assert!(Arc::ptr_eq(&before, &doc.move_block(&last, Direction::Down)));
    }

    // --- duplicate ---

    #[test]
    fn duplicate_then_delete_restores_sequence() {
        let mut doc = doc(&["a", "b", "c"]);
        let original = ids(&doc);
        let target = original[1].clone();
        doc.duplicate(&target);
        assert_eq!(texts(&doc), vec!["a", "b", "b", "c"]);
        assert_unique_ids(&doc);

        let copy_id = doc.blocks()[2].id.clone();
        assert_ne!(copy_id, target);
        doc.delete(&copy_id);
        assert_eq!(ids(&doc), original);
    }

    // --- update ---

    #[test]
    fn update_content_bumps_updated_at_and_replaces_snapshot() {
        let mut doc = doc(&["a"]);
        let id = doc.blocks()[0].id.clone();
        let stamp = doc.blocks()[0].updated_at;
        let before = doc.snapshot();
        doc.update_content(&id, "changed");
        assert_eq!(before[0].text(), "a");
        assert_eq!(doc.blocks()[0].text(), "changed");
        assert!(doc.blocks()[0].updated_at >= stamp);
        assert!(!Arc::ptr_eq(&before, &doc.snapshot()));
    }

    #[test]
    fn update_properties_merges_keys() {
        let mut doc = doc(&["task"]);
        let id = doc.blocks()[0].id.clone();
        let mut patch = Map::new();
        patch.insert("color".into(), json!("red"));
        doc.update_properties(&id, patch);
        doc.toggle_completed(&id);
        let props = &doc.blocks()[0].properties;
        assert_eq!(props["color"], "red");
        assert_eq!(props["completed"], true);

        doc.toggle_completed(&id);
        assert!(!doc.blocks()[0].is_completed());
    }

    // --- change_type / slash ---

    #[test]
    fn change_type_keeps_content_except_divider() {
        let mut doc = doc(&["title"]);
        let id = doc.blocks()[0].id.clone();
        doc.change_type(&id, BlockType::Heading2);
        assert_eq!(doc.blocks()[0].text(), "title");

        doc.change_type(&id, BlockType::Divider);
        assert_eq!(doc.blocks()[0].text(), "---");

        doc.change_type(&id, BlockType::Paragraph);
        assert_eq!(doc.blocks()[0].text(), "");
    }

    #[test]
    fn apply_slash_sets_type_and_focus() {
        let mut doc = doc(&["x", "y"]);
        let id = doc.blocks()[1].id.clone();
        let cmd = slash::resolve("todo").unwrap();
        assert_eq!(doc.apply_slash(&id, &cmd), SlashOutcome::Applied);
        assert_eq!(doc.blocks()[1].block_type, BlockType::ToDo);
        assert_eq!(doc.active_block(), Some(id.as_str()));

        let cont = slash::resolve("continue").unwrap();
        assert_eq!(doc.apply_slash(&id, &cont), SlashOutcome::ContinueWriting);
        assert_eq!(doc.apply_slash("nope", &cmd), SlashOutcome::Ignored);
    }

    // --- split_paste ---

    #[test]
    fn split_paste_drops_blank_lines() {
        let mut doc = doc(&["before", "", "after"]);
        let target = doc.blocks()[1].id.clone();
        doc.split_paste(&target, "line1\nline2\n\nline3");

        assert_eq!(
            texts(&doc),
            vec!["before", "line1", "line2", "line3", "after"]
        );
        assert_eq!(doc.blocks()[1].id, target);
        assert_eq!(doc.blocks()[2].block_type, BlockType::Paragraph);
        assert_eq!(doc.blocks()[3].block_type, BlockType::Paragraph);
        assert_unique_ids(&doc);
    }

    #[test]
    fn split_paste_handles_crlf() {
        let mut doc = doc(&[""]);
        let target = doc.blocks()[0].id.clone();
        doc.split_paste(&target, "one\r\ntwo\r\n");
        assert_eq!(texts(&doc), vec!["one", "two"]);
    }

    #[test]
    fn paste_without_line_break_is_left_to_caller() {
        let mut doc = doc(&["a"]);
        let target = doc.blocks()[0].id.clone();
        let before = doc.snapshot();
        assert!(!needs_split("single line"));
        assert!(Arc::ptr_eq(&before, &doc.split_paste(&target, "single line")));
    }

    // --- undo / redo ---

    #[test]
    fn undo_restores_previous_sequence_and_redo_reapplies() {
        let mut doc = doc(&["a", "b"]);
        let original = ids(&doc);
        let anchor = original[0].clone();
        doc.insert_after(&anchor, BlockType::Heading1);
        assert_eq!(doc.len(), 3);

        doc.undo();
        assert_eq!(ids(&doc), original);
        assert_eq!(doc.active_block(), None);

        doc.redo();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks()[1].block_type, BlockType::Heading1);
    }

    #[test]
    fn typing_in_one_block_undoes_in_one_step() {
        let mut doc = doc(&[""]);
        let id = doc.blocks()[0].id.clone();
        for text in ["h", "he", "hel", "hell", "hello"] {
            doc.update_content(&id, text);
        }
        doc.undo();
        assert_eq!(doc.blocks()[0].text(), "");
        assert!(!doc.can_undo());
    }

    #[test]
    fn ids_stay_unique_across_mixed_mutations() {
        let mut doc = doc(&["a"]);
        for i in 0..20 {
            let anchor = doc.blocks()[i % doc.len()].id.clone();
            match i % 4 {
                0 => {
                    doc.insert_after(&anchor, BlockType::Paragraph);
                }
                1 => {
                    doc.duplicate(&anchor);
                }
                2 => {
                    doc.split_paste(&anchor, "x\ny\nz");
                }
                _ => {
                    doc.move_block(&anchor, Direction::Down);
                }
            }
            assert_unique_ids(&doc);
        }
    }

    #[test]
    fn write_into_copies_blocks_to_page() {
        let mut page = welcome_page();
        let mut doc = BlockDocument::from_page(&page);
        doc.delete("block_7");
        doc.write_into(&mut page);
        assert_eq!(page.content.len(), 6);
    }
}
