//! Configuration module for tasklink.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{RemoteId, StatusNames};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for tasklink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notion: NotionConfig,
    pub properties: PropertyNames,
    pub statuses: StatusNames,
    pub filter: FilterConfig,
    pub reminders: RemindersConfig,
    pub state: StateConfig,
    pub conflicts: ConflictsConfig,
    pub logging: LoggingConfig,
}

/// Notion API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token. Usually supplied through `NOTION_API_KEY`.
    pub api_key: String,
    /// Id of the task database.
    pub database_id: String,
    /// Id of the user whose assigned tasks are synced.
    pub user_id: String,
    pub api_base_url: String,
    /// Value of the `Notion-Version` header.
    pub api_version: String,
}

/// Names of the database properties the sync reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub title: String,
    pub assignee: String,
    pub status: String,
    pub due_date: String,
    /// Relation to a customer page, shown in the reminder notes.
    pub customer: String,
    /// Select property used by `filter.type_exclude`.
    pub task_type: String,
    /// Property holding the last edit time; the page's own
    /// `last_edited_time` is used when it is absent.
    pub last_updated: String,
}

/// Server-side query filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Tasks whose type equals this value are ignored. `None` disables the filter.
    pub type_exclude: Option<String>,
}

/// Apple Reminders settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersConfig {
    /// Reminders list that mirrors the task database.
    pub list_name: String,
    /// Tag that opts a reminder into sync, e.g. `#Notion`.
    pub tag: String,
    /// Seconds to wait for the access prompt to be answered.
    pub access_timeout_secs: u64,
    /// Program used to run the Reminders bridge script.
    pub osascript_path: PathBuf,
}

/// Location of the persisted link table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub link_file: PathBuf,
}

/// Field conflict resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictsConfig {
    /// `timestamp`, `prefer_local`, or `prefer_remote`.
    pub strategy: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

/// Environment variables that override file values.
pub const ENV_API_KEY: &str = "NOTION_API_KEY";
pub const ENV_DATABASE_ID: &str = "NOTION_DATABASE_ID";
pub const ENV_USER_ID: &str = "NOTION_USER_ID";
pub const ENV_LIST_NAME: &str = "REMINDERS_LIST_NAME";
pub const ENV_TAG: &str = "NOTION_TAG";

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Load from `path` if the file exists, then apply environment overrides.
    ///
    /// A missing file is not an error, since every required value can come
    /// from the environment. A file that exists but does not parse is.
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_KEY) {
            self.notion.api_key = v;
        }
        if let Some(v) = get(ENV_DATABASE_ID) {
            self.notion.database_id = v;
        }
        if let Some(v) = get(ENV_USER_ID) {
            self.notion.user_id = v;
        }
        if let Some(v) = get(ENV_LIST_NAME) {
            self.reminders.list_name = v;
        }
        if let Some(v) = get(ENV_TAG) {
            self.reminders.tag = v;
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/tasklink/config.yaml` on Linux and
    /// `~/Library/Application Support/tasklink/config.yaml` on macOS.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("tasklink")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            database_id: String::new(),
            user_id: String::new(),
            api_base_url: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
        }
    }
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: "Request".to_string(),
            assignee: "Assignee".to_string(),
            status: "Status".to_string(),
            due_date: "Due date".to_string(),
            customer: "Customer".to_string(),
            task_type: "Type".to_string(),
            last_updated: "Last updated".to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            type_exclude: Some("Onboarding".to_string()),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            list_name: "Work".to_string(),
            tag: "#Notion".to_string(),
            access_timeout_secs: 30,
            osascript_path: PathBuf::from("osascript"),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("tasklink");
        Self {
            link_file: data_dir.join("sync_state.json"),
        }
    }
}

impl Default for ConflictsConfig {
    fn default() -> Self {
        Self {
            strategy: "timestamp".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"notion.api_key"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `logging.format`.
const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

/// Valid values for `conflicts.strategy`.
pub const VALID_CONFLICT_STRATEGIES: &[&str] = &["timestamp", "prefer_local", "prefer_remote"];

fn required(errors: &mut Vec<ValidationError>, field: &str, value: &str, hint: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError {
            field: field.into(),
            message: format!("is required ({hint})"),
        });
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- notion ---
        required(
            &mut errors,
            "notion.api_key",
            &self.notion.api_key,
            &format!("set it in the file or via {ENV_API_KEY}"),
        );
        required(
            &mut errors,
            "notion.database_id",
            &self.notion.database_id,
            &format!("set it in the file or via {ENV_DATABASE_ID}"),
        );
        required(
            &mut errors,
            "notion.user_id",
            &self.notion.user_id,
            &format!("run `tasklink whoami` to find it, then set {ENV_USER_ID}"),
        );
        if !self.notion.database_id.trim().is_empty()
            && RemoteId::new(&self.notion.database_id).is_err()
        {
            errors.push(ValidationError {
                field: "notion.database_id".into(),
                message: format!(
                    "'{}' is not a database id (expected 32 hex digits)",
                    self.notion.database_id
                ),
            });
        }
        if !self.notion.api_base_url.starts_with("http://")
            && !self.notion.api_base_url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "notion.api_base_url".into(),
                message: "must be an http(s) URL".into(),
            });
        }
        required(
            &mut errors,
            "notion.api_version",
            &self.notion.api_version,
            "e.g. 2022-06-28",
        );

        // --- properties ---
        for (field, value) in [
            ("properties.title", &self.properties.title),
            ("properties.assignee", &self.properties.assignee),
            ("properties.status", &self.properties.status),
            ("properties.due_date", &self.properties.due_date),
        ] {
            required(&mut errors, field, value, "name of a database property");
        }

        // --- statuses ---
        let statuses = [
            &self.statuses.done,
            &self.statuses.canceled,
            &self.statuses.initial,
        ];
        if statuses.iter().any(|s| s.trim().is_empty()) {
            errors.push(ValidationError {
                field: "statuses".into(),
                message: "done, canceled and initial must all be set".into(),
            });
        } else if self.statuses.done == self.statuses.canceled
            || self.statuses.done == self.statuses.initial
            || self.statuses.canceled == self.statuses.initial
        {
            errors.push(ValidationError {
                field: "statuses".into(),
                message: "done, canceled and initial must be distinct".into(),
            });
        }

        // --- reminders ---
        required(
            &mut errors,
            "reminders.list_name",
            &self.reminders.list_name,
            "name of a Reminders list",
        );
        if self.reminders.tag.trim().trim_start_matches('#').is_empty() {
            errors.push(ValidationError {
                field: "reminders.tag".into(),
                message: "must contain a word, e.g. #Notion".into(),
            });
        }
        if self.reminders.access_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "reminders.access_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- conflicts ---
        if !VALID_CONFLICT_STRATEGIES.contains(&self.conflicts.strategy.as_str()) {
            errors.push(ValidationError {
                field: "conflicts.strategy".into(),
                message: format!(
                    "invalid strategy '{}'; valid options: {}",
                    self.conflicts.strategy,
                    VALID_CONFLICT_STRATEGIES.join(", ")
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }
        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            errors.push(ValidationError {
                field: "logging.format".into(),
                message: format!(
                    "invalid format '{}'; valid options: {}",
                    self.logging.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use tasklink_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .notion_api_key("secret_abc")
///     .notion_database_id("0123456789abcdef0123456789abcdef")
///     .notion_user_id("user-1")
///     .reminders_list_name("Work")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- notion ---

    pub fn notion_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.notion.api_key = key.into();
        self
    }

    pub fn notion_database_id(mut self, id: impl Into<String>) -> Self {
        self.config.notion.database_id = id.into();
        self
    }

    pub fn notion_user_id(mut self, id: impl Into<String>) -> Self {
        self.config.notion.user_id = id.into();
        self
    }

    pub fn notion_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.notion.api_base_url = url.into();
        self
    }

    // --- filter ---

    pub fn filter_type_exclude(mut self, value: Option<String>) -> Self {
        self.config.filter.type_exclude = value;
        self
    }

    // --- reminders ---

    pub fn reminders_list_name(mut self, name: impl Into<String>) -> Self {
        self.config.reminders.list_name = name.into();
        self
    }

    pub fn reminders_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.reminders.tag = tag.into();
        self
    }

    pub fn reminders_access_timeout_secs(mut self, secs: u64) -> Self {
        self.config.reminders.access_timeout_secs = secs;
        self
    }

    // --- state ---

    pub fn state_link_file(mut self, path: PathBuf) -> Self {
        self.config.state.link_file = path;
        self
    }

    // --- conflicts ---

    pub fn conflicts_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.config.conflicts.strategy = strategy.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    const DB: &str = "0123456789abcdef0123456789abcdef";

    fn complete() -> ConfigBuilder {
        ConfigBuilder::new()
            .notion_api_key("secret_abc")
            .notion_database_id(DB)
            .notion_user_id("user-1")
    }

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.notion.api_base_url, "https://api.notion.com/v1");
        assert_eq!(cfg.notion.api_version, "2022-06-28");
        assert_eq!(cfg.properties.title, "Request");
        assert_eq!(cfg.properties.due_date, "Due date");
        assert_eq!(cfg.properties.last_updated, "Last updated");
        assert_eq!(cfg.statuses.done, "Done");
        assert_eq!(cfg.statuses.canceled, "Canceled");
        assert_eq!(cfg.statuses.initial, "New");
        assert_eq!(cfg.filter.type_exclude.as_deref(), Some("Onboarding"));
        assert_eq!(cfg.reminders.list_name, "Work");
        assert_eq!(cfg.reminders.tag, "#Notion");
        assert_eq!(cfg.reminders.access_timeout_secs, 30);
        assert!(cfg.state.link_file.ends_with("tasklink/sync_state.json"));
        assert_eq!(cfg.conflicts.strategy, "timestamp");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn default_config_only_misses_credentials() {
        let errors = Config::default().validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["notion.api_key", "notion.database_id", "notion.user_id"]
        );
    }

    #[test]
    fn complete_config_is_valid() {
        assert!(complete().build_validated().is_ok());
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r##"
notion:
  api_key: secret_file
  database_id: 01234567-89ab-cdef-0123-456789abcdef
  user_id: user-42
properties:
  title: Name
statuses:
  done: Shipped
filter:
  type_exclude: null
reminders:
  list_name: Tasks
  tag: "#sync"
state:
  link_file: /tmp/tasklink-state.json
logging:
  level: debug
  format: json
"##;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.notion.api_key, "secret_file");
        assert_eq!(cfg.notion.user_id, "user-42");
        assert_eq!(cfg.properties.title, "Name");
        // untouched keys keep their defaults
        assert_eq!(cfg.properties.status, "Status");
        assert_eq!(cfg.statuses.done, "Shipped");
        assert_eq!(cfg.statuses.canceled, "Canceled");
        assert!(cfg.filter.type_exclude.is_none());
        assert_eq!(cfg.reminders.list_name, "Tasks");
        assert_eq!(cfg.reminders.tag, "#sync");
        assert_eq!(cfg.state.link_file, PathBuf::from("/tmp/tasklink-state.json"));
        assert_eq!(cfg.logging.format, "json");
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn load_invalid_yaml_fails() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"notion: [not, a, map").unwrap();
        tmp.flush().unwrap();
        assert!(Config::load(tmp.path()).is_err());
        assert_eq!(Config::load_or_default(tmp.path()).reminders.list_name, "Work");
    }

    #[test]
    fn resolve_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::resolve(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(cfg.reminders.list_name, "Work");
    }

    // -- Environment --

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = complete().reminders_list_name("Home").build();
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "secret_env"),
            (ENV_USER_ID, "user-env"),
            (ENV_LIST_NAME, "Errands"),
            (ENV_TAG, "#todo"),
            (ENV_DATABASE_ID, "   "),
        ]
        .into_iter()
        .collect();

        cfg.apply_env_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.notion.api_key, "secret_env");
        assert_eq!(cfg.notion.user_id, "user-env");
        assert_eq!(cfg.reminders.list_name, "Errands");
        assert_eq!(cfg.reminders.tag, "#todo");
        // blank values do not override
        assert_eq!(cfg.notion.database_id, DB);
    }

    // -- Validation --

    #[test]
    fn validate_rejects_bad_database_id() {
        let errors = complete().notion_database_id("not-an-id").build().validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "notion.database_id");
    }

    #[test]
    fn validate_rejects_bad_enums() {
        let errors = complete()
            .conflicts_strategy("coin_flip")
            .logging_level("loud")
            .logging_format("xml")
            .build()
            .validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["conflicts.strategy", "logging.level", "logging.format"]
        );
    }

    #[test]
    fn validate_rejects_empty_tag_and_zero_timeout() {
        let errors = complete()
            .reminders_tag("#")
            .reminders_access_timeout_secs(0)
            .build()
            .validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["reminders.tag", "reminders.access_timeout_secs"]
        );
    }

    #[test]
    fn validate_rejects_duplicate_statuses() {
        let mut cfg = complete().build();
        cfg.statuses.canceled = "Done".to_string();
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "statuses");
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "notion.api_key".into(),
            message: "is required".into(),
        };
        assert_eq!(err.to_string(), "notion.api_key: is required");
    }

    #[test]
    fn config_yaml_roundtrip() {
        let cfg = complete().build();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.notion.database_id, DB);
        assert_eq!(back.reminders.tag, "#Notion");
    }
}
