use crate::model::{BlockType, DIVIDER_CONTENT};

#[derive(Debug, Clone, PartialEq)]
pub struct SlashMenuState {
    pub query: String,
    pub commands: Vec<SlashCommand>,
    pub selected: usize,
    pub slash_pos: usize, // char position of '/' in the block text
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlashCommand {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: SlashCategory,
    pub action: SlashAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCategory {
    Text,
    List,
    Media,
    Advanced,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlashAction {
    SetType(BlockType),
    ContinueWriting,
}

impl SlashAction {
    /// `(type, initial content)` the command resolves to. `None` content keeps
    /// whatever the block already holds.
    pub fn resolve(&self) -> Option<(BlockType, Option<&'static str>)> {
        match self {
            SlashAction::SetType(BlockType::Divider) => {
                Some((BlockType::Divider, Some(DIVIDER_CONTENT)))
            }
            SlashAction::SetType(t) => Some((*t, None)),
            SlashAction::ContinueWriting => None,
        }
    }
}
