use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "quote",
    title: "Quote",
    description: "Capture a quote",
    category: SlashCategory::Advanced,
    action: SlashAction::SetType(BlockType::Quote),
};
