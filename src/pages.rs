use std::collections::HashSet;

use chrono::Utc;

use crate::model::{new_id, Block, BlockType, Page};

pub const DEFAULT_ICON: &str = "📄";

/// Who a newly created page belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub workspace_id: String,
    pub user_id: String,
}

impl Default for Owner {
    fn default() -> Self {
        Self {
            workspace_id: "default_workspace".into(),
            user_id: "anonymous".into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPage {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
}

/// A fresh page seeded with a title heading, the description (when given)
/// and an empty paragraph to type into.
pub fn new_page(draft: NewPage, owner: &Owner) -> Page {
    let now = Utc::now();
    let mut content = vec![Block::new(BlockType::Heading1, draft.title.clone())];
    if let Some(description) = draft.description.filter(|d| !d.trim().is_empty()) {
        content.push(Block::paragraph(description));
    }
    content.push(Block::paragraph(""));

    Page {
        id: new_id("page"),
        title: draft.title,
        icon: Some(draft.icon.unwrap_or_else(|| DEFAULT_ICON.to_string())),
        cover: None,
        content,
        parent_id: draft.parent_id,
        workspace_id: owner.workspace_id.clone(),
        created_by: owner.user_id.clone(),
        last_edited_by: owner.user_id.clone(),
        created_at: now,
        updated_at: now,
        is_template: None,
        is_public: None,
        archived: None,
    }
}

/// Parent chain of `page_id`, nearest first. Stops at a missing parent or at
/// the first repeated id.
pub fn ancestors<'a>(pages: &'a [Page], page_id: &str) -> Vec<&'a Page> {
    let mut chain = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = pages.iter().find(|p| p.id == page_id);
    while let Some(page) = current {
        seen.insert(page.id.as_str());
        current = page
            .parent_id
            .as_deref()
            .and_then(|parent_id| pages.iter().find(|p| p.id == parent_id))
            .filter(|parent| !seen.contains(parent.id.as_str()));
        if let Some(parent) = current {
            chain.push(parent);
        }
    }
    chain
}

/// Whether giving `page_id` the parent `new_parent` would make the page its
/// own ancestor.
pub fn would_create_cycle(pages: &[Page], page_id: &str, new_parent: &str) -> bool {
    new_parent == page_id || ancestors(pages, new_parent).iter().any(|p| p.id == page_id)
}

/// Move a page under `new_parent` (or to the root with `None`). Refuses moves
/// that would create a cycle or target an unknown page; returns whether the
/// collection changed.
pub fn reparent(pages: &mut [Page], page_id: &str, new_parent: Option<&str>) -> bool {
    if let Some(parent) = new_parent {
        if !pages.iter().any(|p| p.id == parent) || would_create_cycle(pages, page_id, parent) {
            return false;
        }
    }
    let Some(page) = pages.iter_mut().find(|p| p.id == page_id) else {
        return false;
    };
    if page.parent_id.as_deref() == new_parent {
        return false;
    }
    page.parent_id = new_parent.map(String::from);
    page.updated_at = Utc::now();
    true
}
