use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "numbered",
    title: "Numbered list",
    description: "Create a list with numbering",
    category: SlashCategory::List,
    action: SlashAction::SetType(BlockType::NumberedListItem),
};
