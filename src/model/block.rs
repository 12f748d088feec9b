use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::new_id;

/// Content literal stored in every divider block.
pub const DIVIDER_CONTENT: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem,
    #[serde(rename = "numbered_list_item")]
    NumberedListItem,
    #[serde(rename = "to_do")]
    ToDo,
    #[serde(rename = "toggle")]
    Toggle,
    #[serde(rename = "quote")]
    Quote,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "divider")]
    Divider,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "database")]
    Database,
    #[serde(rename = "embed")]
    Embed,
    #[serde(rename = "bookmark")]
    Bookmark,
}

impl BlockType {
    pub const ALL: [BlockType; 18] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::BulletedListItem,
        BlockType::NumberedListItem,
        BlockType::ToDo,
        BlockType::Toggle,
        BlockType::Quote,
        BlockType::Code,
        BlockType::Divider,
        BlockType::Image,
        BlockType::Video,
        BlockType::File,
        BlockType::Table,
        BlockType::Database,
        BlockType::Embed,
        BlockType::Bookmark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading_1",
            BlockType::Heading2 => "heading_2",
            BlockType::Heading3 => "heading_3",
            BlockType::BulletedListItem => "bulleted_list_item",
            BlockType::NumberedListItem => "numbered_list_item",
            BlockType::ToDo => "to_do",
            BlockType::Toggle => "toggle",
            BlockType::Quote => "quote",
            BlockType::Code => "code",
            BlockType::Divider => "divider",
            BlockType::Image => "image",
            BlockType::Video => "video",
            BlockType::File => "file",
            BlockType::Table => "table",
            BlockType::Database => "database",
            BlockType::Embed => "embed",
            BlockType::Bookmark => "bookmark",
        }
    }

    /// Types whose content is a plain string the user types into.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            BlockType::Paragraph
                | BlockType::Heading1
                | BlockType::Heading2
                | BlockType::Heading3
                | BlockType::BulletedListItem
                | BlockType::NumberedListItem
                | BlockType::ToDo
                | BlockType::Toggle
                | BlockType::Quote
                | BlockType::Code
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown block type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Block {
    pub fn new(block_type: BlockType, content: impl Into<String>) -> Self {
        let now = Utc::now();
        let content = if block_type == BlockType::Divider {
            DIVIDER_CONTENT.to_string()
        } else {
            content.into()
        };
        Self {
            id: new_id("block"),
            block_type,
            content: Value::String(content),
            properties: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockType::Paragraph, content)
    }

    /// Text view of the content; structured payloads read as empty.
    pub fn text(&self) -> &str {
        self.content.as_str().unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        match &self.content {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.properties
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Same type, content and properties under a fresh id and timestamps.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: new_id("block"),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}
