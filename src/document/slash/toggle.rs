use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "toggle",
    title: "Toggle list",
    description: "Toggleable list item",
    category: SlashCategory::List,
    action: SlashAction::SetType(BlockType::Toggle),
};
