use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "todo",
    title: "To-do list",
    description: "Track tasks with a to-do list",
    category: SlashCategory::List,
    action: SlashAction::SetType(BlockType::ToDo),
};
