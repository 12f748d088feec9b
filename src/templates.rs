use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::assist::Assistant;
use crate::error::Result;
use crate::model::{new_id, Block, BlockType, Page, Template};
use crate::pages::Owner;
use crate::storage::PersistenceStore;

pub const ALL_CATEGORIES: &str = "all";

/// Category filters offered when browsing, as `(id, label)`.
pub const CATEGORIES: [(&str, &str); 7] = [
    (ALL_CATEGORIES, "All Templates"),
    ("productivity", "Productivity"),
    ("project management", "Project Management"),
    ("meeting", "Meeting Notes"),
    ("planning", "Planning"),
    ("creative", "Creative"),
    ("personal", "Personal"),
];

pub const GENERATED_NAME: &str = "AI Generated Template";
pub const GENERATED_CATEGORY: &str = "AI Generated";
pub const GENERATED_ICON: &str = "🤖";
pub const GENERATED_BY: &str = "ai";

#[derive(Debug)]
pub struct TemplateLibrary {
    store: PersistenceStore,
    templates: Vec<Template>,
}

impl TemplateLibrary {
    pub fn load(store: PersistenceStore) -> Self {
        let templates = store.load_templates();
        debug!(count = templates.len(), "loaded templates");
        Self { store, templates }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, template_id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == template_id)
    }

    /// Templates whose name or description contains `query` and whose
    /// category equals `category`, both compared case-insensitively.
    pub fn search(&self, query: &str, category: &str) -> Vec<&Template> {
        let query = query.to_lowercase();
        let category = category.to_lowercase();
        self.templates
            .iter()
            .filter(|t| {
                query.is_empty()
                    || t.name.to_lowercase().contains(&query)
                    || t.description.to_lowercase().contains(&query)
            })
            .filter(|t| category == ALL_CATEGORIES || t.category.to_lowercase() == category)
            .collect()
    }

    /// New page built from a template, with fresh block ids. The template's
    /// usage count is bumped and persisted; the page itself is left to the
    /// caller to store.
    pub fn instantiate(&mut self, template_id: &str, owner: &Owner) -> Result<Option<Page>> {
        let Some(template) = self.templates.iter_mut().find(|t| t.id == template_id) else {
            debug!(template_id, "instantiate: unknown template");
            return Ok(None);
        };
        template.usage_count += 1;
        let template = template.clone();

        let now = Utc::now();
        let page = Page {
            id: new_id("page"),
            title: template.name.clone(),
            icon: Some(template.icon.clone()),
            cover: None,
            content: template.content.iter().map(Block::duplicate).collect(),
            parent_id: None,
            workspace_id: owner.workspace_id.clone(),
            created_by: owner.user_id.clone(),
            last_edited_by: owner.user_id.clone(),
            created_at: now,
            updated_at: now,
            is_template: None,
            is_public: None,
            archived: None,
        };

        self.store.save_template(&template)?;
        info!(template_id, page_id = %page.id, "created page from template");
        Ok(Some(page))
    }

    /// Ask the assistant for a template matching `description`, store it and
    /// return it. `None` means a newer generation request replaced this one.
    pub async fn add_generated(
        &mut self,
        category: &str,
        description: &str,
        assistant: &Assistant,
    ) -> Result<Option<Template>> {
        let Some(content) = assistant.generate_template_blocks(category, description).await
        else {
            return Ok(None);
        };

        let template = Template {
            id: new_id("custom"),
            name: GENERATED_NAME.into(),
            description: description.to_string(),
            icon: GENERATED_ICON.into(),
            category: GENERATED_CATEGORY.into(),
            content,
            is_public: false,
            created_by: GENERATED_BY.into(),
            usage_count: 0,
        };
        self.store.save_template(&template)?;
        self.templates.push(template.clone());
        info!(template_id = %template.id, blocks = template.content.len(), "stored generated template");
        Ok(Some(template))
    }
}

/// Blocks out of a free-text response that should contain a JSON array.
///
/// The span from the first `[` to the last `]` is parsed. Unknown block types
/// become paragraphs and every block gets a fresh id. When nothing usable is
/// found the result is a heading naming the category followed by the
/// description.
pub fn parse_generated_blocks(raw: &str, category: &str, description: &str) -> Vec<Block> {
    let blocks: Vec<Block> = extract_array(raw)
        .and_then(|span| match serde_json::from_str::<Vec<Value>>(span) {
            Ok(values) => Some(values),
            Err(e) => {
                warn!(error = %e, "generated template is not a JSON array");
                None
            }
        })
        .unwrap_or_default()
        .iter()
        .filter_map(block_from_value)
        .collect();

    if blocks.is_empty() {
        debug!(category, "falling back to stub template");
        return vec![
            Block::new(BlockType::Heading1, format!("{} Template", category)),
            Block::paragraph(description),
        ];
    }
    blocks
}

fn extract_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

fn block_from_value(value: &Value) -> Option<Block> {
    let object = value.as_object()?;
    let block_type = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(|t| t.parse().ok())
        .unwrap_or(BlockType::Paragraph);

    let mut block = Block::new(block_type, "");
    if block_type != BlockType::Divider {
        block.content = match object.get("content") {
            Some(Value::Null) | None => Value::String(String::new()),
            Some(content) => content.clone(),
        };
    }
    if let Some(Value::Object(properties)) = object.get("properties") {
        block.properties = properties.clone();
    }
    Some(block)
}
