use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Block;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub content: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub workspace_id: String,
    pub created_by: String,
    pub last_edited_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl Page {
    pub fn find_block(&self, block_id: &str) -> Option<&Block> {
        self.content.iter().find(|b| b.id == block_id)
    }

    pub fn is_archived(&self) -> bool {
        self.archived.unwrap_or(false)
    }
}

/// Navigation node derived from the flat page collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTreeNode {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub children: Vec<PageTreeNode>,
    pub has_children: bool,
    pub is_expanded: bool,
}

impl PageTreeNode {
    /// Number of nodes in this subtree, including itself.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(PageTreeNode::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_uses_camel_case_fields() {
        let raw = r#"{
            "id": "page_1",
            "title": "Notes",
            "content": [],
            "parentId": "page_0",
            "workspaceId": "default_workspace",
            "createdBy": "system",
            "lastEditedBy": "system",
            "createdAt": "2026-02-21T10:00:00.000Z",
            "updatedAt": "2026-02-21T11:30:00.000Z",
            "archived": true
        }"#;
        let page: Page = serde_json::from_str(raw).unwrap();
        assert_eq!(page.parent_id.as_deref(), Some("page_0"));
        assert!(page.is_archived());
        assert!(page.updated_at > page.created_at);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["lastEditedBy"], "system");
        assert!(json.get("icon").is_none());
        assert!(json.get("isTemplate").is_none());
    }

    #[test]
    fn page_without_dates_is_rejected() {
        let raw = r#"{"id": "p", "title": "t", "workspaceId": "w", "createdBy": "u", "lastEditedBy": "u"}"#;
        assert!(serde_json::from_str::<Page>(raw).is_err());
    }
}
