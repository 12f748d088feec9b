use chrono::Utc;
use serde_json::{Map, Value};

use crate::model::{Block, BlockType, Page, Template};

fn seeded(id: &str, block_type: BlockType, content: &str) -> Block {
    let now = Utc::now();
    Block {
        id: id.to_string(),
        block_type,
        content: Value::String(content.to_string()),
        properties: Map::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Collection used when no pages are stored yet or the stored value is
/// unreadable.
pub fn default_pages() -> Vec<Page> {
    use BlockType::*;

    let now = Utc::now();
    let content = vec![
        seeded("block_1", Heading1, "Welcome to Your Workspace"),
        seeded(
            "block_2",
            Paragraph,
            "This is your personal productivity workspace. You can create pages, databases, and organize your thoughts and projects here.",
        ),
        seeded("block_3", Heading2, "Getting Started"),
        seeded(
            "block_4",
            BulletedListItem,
            "Create a new page with `pagebook new <title>`",
        ),
        seeded(
            "block_5",
            BulletedListItem,
            "Try different content blocks with slash commands such as /h1, /todo or /divider",
        ),
        seeded(
            "block_6",
            BulletedListItem,
            "Start from a template to get a structured page in one step",
        ),
        seeded(
            "block_7",
            BulletedListItem,
            "Use AI assistance to generate content and improve your writing",
        ),
    ];

    vec![Page {
        id: "welcome_page".into(),
        title: "Welcome to Your Workspace".into(),
        icon: Some("👋".into()),
        cover: None,
        content,
        parent_id: None,
        workspace_id: "default_workspace".into(),
        created_by: "system".into(),
        last_edited_by: "system".into(),
        created_at: now,
        updated_at: now,
        is_template: None,
        is_public: None,
        archived: None,
    }]
}

pub fn default_templates() -> Vec<Template> {
    use BlockType::*;

    vec![
        Template {
            id: "template_meeting_notes".into(),
            name: "Meeting Notes".into(),
            description: "Template for taking structured meeting notes".into(),
            icon: "📝".into(),
            category: "Productivity".into(),
            content: vec![
                seeded("tmpl_1", Heading1, "Meeting Notes"),
                seeded("tmpl_2", Paragraph, "Date: "),
                seeded("tmpl_3", Paragraph, "Attendees: "),
                seeded("tmpl_4", Heading2, "Agenda"),
                seeded("tmpl_5", Heading2, "Discussion Points"),
                seeded("tmpl_6", Heading2, "Action Items"),
            ],
            is_public: true,
            created_by: "system".into(),
            usage_count: 0,
        },
        Template {
            id: "template_project_brief".into(),
            name: "Project Brief".into(),
            description: "Template for project planning and briefs".into(),
            icon: "🚀".into(),
            category: "Project Management".into(),
            content: vec![
                seeded("tmpl_7", Heading1, "Project Brief"),
                seeded("tmpl_8", Heading2, "Project Overview"),
                seeded("tmpl_9", Heading2, "Objectives"),
                seeded("tmpl_10", Heading2, "Timeline"),
                seeded("tmpl_11", Heading2, "Resources"),
                seeded("tmpl_12", Heading2, "Success Criteria"),
            ],
            is_public: true,
            created_by: "system".into(),
            usage_count: 0,
        },
    ]
}
