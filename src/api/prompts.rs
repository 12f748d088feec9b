use super::types::GenerationType;

const WORKSPACE_ASSISTANT: &str = "You are a helpful AI assistant for a Notion-like productivity app.";

pub const TITLE_SOURCE_CHARS: usize = 500;
pub const DEFAULT_SUMMARY_LENGTH: usize = 150;

pub const TEMPLATE_BLOCK_TYPES: &str = "paragraph, heading_1, heading_2, heading_3, \
    bulleted_list_item, numbered_list_item, to_do, quote, divider";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub max_tokens: u32,
    pub temperature: f32,
}

pub fn limits(kind: GenerationType) -> Limits {
    match kind {
        GenerationType::Title => Limits {
            max_tokens: 50,
            temperature: 0.3,
        },
        _ => Limits {
            max_tokens: 1000,
            temperature: 0.7,
        },
    }
}

/// System message framing a request of `kind`, with the caller's context
/// appended when there is one.
pub fn system_prompt(kind: GenerationType, context: Option<&str>) -> String {
    let base = match kind {
        GenerationType::Continue => format!(
            "{} Continue writing based on the provided context. Write naturally and maintain the same tone and style.",
            WORKSPACE_ASSISTANT
        ),
        GenerationType::Summarize => "You are a helpful AI assistant. Provide a clear and concise summary of the given content. Focus on the main points and key information.".to_string(),
        GenerationType::Improve => "You are a helpful writing assistant. Improve the given text while maintaining its original meaning. Make it clearer, more engaging, and better structured.".to_string(),
        GenerationType::Title => "You are a helpful AI assistant. Generate a clear, concise title (5-8 words max) based on the provided content. Return only the title without quotes.".to_string(),
        GenerationType::Template => format!(
            "{} Generate a practical template based on the requirements. Return a JSON array of content blocks.",
            WORKSPACE_ASSISTANT
        ),
        GenerationType::Content => format!(
            "{} Generate clear, well-structured content that would fit naturally in a productivity workspace.",
            WORKSPACE_ASSISTANT
        ),
    };
    match context.filter(|c| !c.is_empty()) {
        Some(context) => format!("{} Context: {}", base, context),
        None => base,
    }
}

pub fn summarize(text: &str, max_length: usize) -> String {
    format!(
        "Please provide a concise summary of the following text in approximately {} characters or less:\n\n{}",
        max_length, text
    )
}

pub fn suggest_title(content: &str) -> String {
    let head: String = content.chars().take(TITLE_SOURCE_CHARS).collect();
    format!(
        "Based on this content, suggest a clear and concise title (5-8 words max):\n\n{}",
        head
    )
}

pub fn improve(text: &str, instruction: Option<&str>) -> String {
    match instruction.filter(|i| !i.trim().is_empty()) {
        Some(instruction) => format!(
            "Please improve this text according to the instruction: \"{}\"\n\nText: {}",
            instruction, text
        ),
        None => format!(
            "Please improve the clarity and flow of this text while maintaining its original meaning:\n\n{}",
            text
        ),
    }
}

pub fn continue_writing(context: &str) -> String {
    format!(
        "Continue writing based on this context. Write the next paragraph or section that would naturally follow:\n\n{}",
        context
    )
}

pub fn template(category: &str, description: &str) -> String {
    format!(
        r#"Create a {category} template with the following requirements: {description}.

Return the template as a JSON array of content blocks. Each block should have this structure:
{{
  "id": "unique_id",
  "type": "block_type",
  "content": "block_content",
  "properties": {{}}
}}

Use these block types: {TEMPLATE_BLOCK_TYPES}.

Make sure the content is practical and useful for the specified category."#
    )
}
