use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "h3",
    title: "Heading 3",
    description: "Small section heading",
    category: SlashCategory::Text,
    action: SlashAction::SetType(BlockType::Heading3),
};
