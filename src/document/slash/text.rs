use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "text",
    title: "Text",
    description: "Just start writing with plain text",
    category: SlashCategory::Text,
    action: SlashAction::SetType(BlockType::Paragraph),
};
