use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Table-like collection persisted next to pages. Only storage concerns live
/// here; views over it are rendered elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Vec<DatabaseProperty>,
    #[serde(default)]
    pub entries: Vec<DatabaseEntry>,
    #[serde(default)]
    pub views: Vec<DatabaseView>,
    pub workspace_id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseProperty {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<PropertyOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Title,
    Text,
    Number,
    Select,
    MultiSelect,
    Date,
    Person,
    Files,
    Checkbox,
    Url,
    Email,
    Phone,
    Formula,
    Relation,
    Rollup,
    CreatedTime,
    CreatedBy,
    LastEditedTime,
    LastEditedBy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyOption {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseEntry {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub last_edited_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseView {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    #[serde(default)]
    pub filters: Vec<DatabaseFilter>,
    #[serde(default)]
    pub sorts: Vec<DatabaseSort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(default)]
    pub properties: Vec<ViewProperty>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    Table,
    Board,
    Gallery,
    Calendar,
    Timeline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseFilter {
    pub id: String,
    pub property_id: String,
    pub condition: FilterCondition,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Equals,
    DoesNotEqual,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    LessThan,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    IsBefore,
    IsAfter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSort {
    pub id: String,
    pub property_id: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewProperty {
    pub property_id: String,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn database_parses_nested_records_and_dates() {
        let raw = json!({
            "id": "db_1",
            "title": "Tasks",
            "properties": [
                {"id": "p1", "name": "Name", "type": "title"},
                {"id": "p2", "name": "Tags", "type": "multi_select",
                 "options": [{"id": "o1", "name": "urgent", "color": "red"}]}
            ],
            "entries": [{
                "id": "e1",
                "properties": {"p1": "Write report"},
                "createdAt": "2026-01-02T03:04:05Z",
                "updatedAt": "2026-01-02T03:04:05Z",
                "createdBy": "u1",
                "lastEditedBy": "u1"
            }],
            "views": [{
                "id": "v1", "name": "All", "type": "board",
                "filters": [{"id": "f1", "propertyId": "p2", "condition": "is_not_empty", "value": null}],
                "sorts": [{"id": "s1", "propertyId": "p1", "direction": "descending"}],
                "properties": [{"propertyId": "p1", "visible": true, "width": 240}],
                "isDefault": true
            }],
            "workspaceId": "w",
            "createdBy": "u1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-02T00:00:00Z"
        });

        let db: Database = serde_json::from_value(raw).unwrap();
        assert_eq!(db.properties[1].property_type, PropertyType::MultiSelect);
        assert_eq!(db.views[0].view_type, ViewType::Board);
        assert_eq!(db.views[0].filters[0].condition, FilterCondition::IsNotEmpty);
        assert_eq!(db.views[0].sorts[0].direction, SortDirection::Descending);
        assert_eq!(db.entries[0].created_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    }
}
