use super::types::{SlashAction, SlashCategory, SlashCommand};

pub(super) const CMD: SlashCommand = SlashCommand {
    name: "continue",
    title: "Continue writing",
    description: "Let AI continue the content",
    category: SlashCategory::Ai,
    action: SlashAction::ContinueWriting,
};
