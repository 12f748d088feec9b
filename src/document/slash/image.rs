use crate::model::BlockType;

use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "image",
    title: "Image",
    description: "Upload or embed with a link",
    category: SlashCategory::Media,
    action: SlashAction::SetType(BlockType::Image),
};
