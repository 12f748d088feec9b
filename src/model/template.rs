use serde::{Deserialize, Serialize};

use super::Block;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub category: String,
    #[serde(default)]
    pub content: Vec<Block>,
    #[serde(default)]
    pub is_public: bool,
    pub created_by: String,
    #[serde(default)]
    pub usage_count: u64,
}
