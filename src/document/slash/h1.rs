use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "h1",
    title: "Heading 1",
    description: "Big section heading",
    category: SlashCategory::Text,
    action: SlashAction::SetType(BlockType::Heading1),
};
