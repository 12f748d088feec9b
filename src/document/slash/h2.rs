use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "h2",
    title: "Heading 2",
    description: "Medium section heading",
    category: SlashCategory::Text,
    action: SlashAction::SetType(BlockType::Heading2),
};
