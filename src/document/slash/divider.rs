use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "divider",
    title: "Divider",
    description: "Visually divide blocks",
    category: SlashCategory::Advanced,
    action: SlashAction::SetType(BlockType::Divider),
};
