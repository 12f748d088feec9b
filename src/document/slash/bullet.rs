use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "bullet",
    title: "Bulleted list",
    description: "Create a simple bulleted list",
    category: SlashCategory::List,
    action: SlashAction::SetType(BlockType::BulletedListItem),
};
