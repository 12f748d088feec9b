use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "code",
    title: "Code",
    description: "Capture a code snippet",
    category: SlashCategory::Advanced,
    action: SlashAction::SetType(BlockType::Code),
};
