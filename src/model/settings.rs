use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User preferences persisted under the settings key. Keys written by other
/// tools are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u32,
    #[serde(default)]
    pub show_line_numbers: bool,
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            sidebar_width: default_sidebar_width(),
            show_line_numbers: false,
            auto_save: default_auto_save(),
            extra: Map::new(),
        }
    }
}

fn default_theme() -> String {
    "light".into()
}

fn default_sidebar_width() -> u32 {
    240
}

fn default_auto_save() -> bool {
    true
}
