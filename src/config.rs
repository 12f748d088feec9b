use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::error::{PageError, Result};
use crate::pages::Owner;
use crate::storage::DEFAULT_KEY_PREFIX;

/// Environment variables with this prefix override file values, with `__`
/// between section and key.
pub const ENV_PREFIX: &str = "PAGEBOOK_";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            key_prefix: default_key_prefix(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AutosaveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: default_delay_ms(),
        }
    }
}

impl AutosaveConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AssistantConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_id")]
    pub id: String,
    #[serde(default = "default_user")]
    pub user: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            id: default_workspace_id(),
            user: default_user(),
        }
    }
}

impl WorkspaceConfig {
    pub fn owner(&self) -> Owner {
        Owner {
            workspace_id: self.id.clone(),
            user_id: self.user.clone(),
        }
    }
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.into()
}

fn default_true() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_workspace_id() -> String {
    "default_workspace".into()
}

fn default_user() -> String {
    "anonymous".into()
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        Self::load_with_env(config_path, ENV_PREFIX)
    }

    fn load_with_env(config_path: &Path, env_prefix: &str) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(env_prefix).split("__"))
            .extract()
            .map_err(|e| PageError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.autosave.delay_ms == 0 {
            return Err(PageError::Config(
                "autosave.delay_ms must be greater than zero".into(),
            ));
        }
        if self.storage.key_prefix.trim().is_empty() {
            return Err(PageError::Config("storage.key_prefix is required".into()));
        }
        if self.assistant.endpoint.trim().is_empty() {
            return Err(PageError::Config("assistant.endpoint is required".into()));
        }
        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("pagebook"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("pagebook"))
            })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PageError::Config(e.to_string()))
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = format!(
            r#"[storage]
# data_dir = "/path/to/pagebook-data"  # defaults to the platform data directory
key_prefix = "{DEFAULT_KEY_PREFIX}"

[autosave]
enabled = true
delay_ms = 1000

[assistant]
endpoint = "{DEFAULT_ENDPOINT}"
model = "{DEFAULT_MODEL}"
api_key = ""  # or set PAGEBOOK_ASSISTANT__API_KEY env var

[workspace]
id = "default_workspace"
user = "anonymous"
"#
        );

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_config_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[storage]
data_dir = "/tmp/pagebook-test"
key_prefix = "notes"

[autosave]
enabled = false
delay_ms = 250

[assistant]
endpoint = "http://localhost:9000/chat/completions"
model = "local-model"
api_key = "key-123"

[workspace]
id = "team"
user = "sam"
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/pagebook-test")));
        assert_eq!(config.storage.key_prefix, "notes");
        assert!(!config.autosave.enabled);
        assert_eq!(config.autosave.delay(), Duration::from_millis(250));
        assert_eq!(config.assistant.model, "local-model");
        assert_eq!(config.workspace.owner().workspace_id, "team");
        assert_eq!(config.workspace.owner().user_id, "sam");
    }

    #[test]
    fn defaults_apply_for_missing_sections() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "");

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.storage.key_prefix, "pagebook");
        assert!(config.storage.data_dir.is_none());
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.delay_ms, 1000);
        assert_eq!(config.assistant.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.workspace.owner(), Owner::default());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig::load_from_path(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.autosave.delay_ms, 1000);
    }

    #[test]
    fn validate_rejects_zero_delay() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[autosave]\ndelay_ms = 0\n");

        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("delay_ms"));
    }

    #[test]
    fn validate_rejects_empty_prefix_and_endpoint() {
        let mut config = AppConfig::default();
        config.storage.key_prefix = " ".into();
        assert!(config.validate().unwrap_err().to_string().contains("key_prefix"));

        let mut config = AppConfig::default();
        config.assistant.endpoint.clear();
        assert!(config.validate().unwrap_err().to_string().contains("endpoint"));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[autosave\ndelay_ms = ");
        assert!(matches!(
            AppConfig::load_from_path(&path),
            Err(PageError::Config(_))
        ));
    }

    #[test]
    fn env_var_overrides_api_key() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[assistant]\napi_key = \"file-key\"\n");

        // Own prefix so parallel tests reading `PAGEBOOK_` never see it.
        env::set_var("PAGEBOOKENVTEST_ASSISTANT__API_KEY", "env-key");
        let config = AppConfig::load_with_env(&path, "PAGEBOOKENVTEST_");
        env::remove_var("PAGEBOOKENVTEST_ASSISTANT__API_KEY");

        assert_eq!(config.unwrap().assistant.api_key, "env-key");
    }

    #[test]
    fn write_default_creates_loadable_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("subdir").join("config.toml");

        AppConfig::write_default(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("delay_ms = 1000"));
        assert!(content.contains(DEFAULT_MODEL));
        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.storage.key_prefix, "pagebook");
    }

    #[test]
    fn to_toml_renders_effective_config() {
        let rendered = AppConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[autosave]"));
        assert!(rendered.contains("delay_ms = 1000"));
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn config_dir_returns_some() {
        assert!(AppConfig::config_dir().is_some());
    }
}
