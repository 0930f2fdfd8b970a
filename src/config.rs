use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Where account data is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Contents of the decorative home screen cards
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HomeConfig {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_temperature")]
    pub temperature: i32,
    #[serde(default = "default_built_using")]
    pub built_using: String,
}

fn default_city() -> String {
    "Chennai".to_string()
}
fn default_temperature() -> i32 {
    23
}
fn default_built_using() -> String {
    "Rust".to_string()
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            temperature: default_temperature(),
            built_using: default_built_using(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding storage.json and the journal; defaults to ~/.dayplan
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default = "default_true")]
    pub journal: bool,
    #[serde(default = "default_true")]
    pub confirm_remove: bool,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default)]
    pub home: HomeConfig,
}

fn default_true() -> bool {
    true
}
fn default_prompt() -> String {
    "dayplan> ".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage: StorageKind::default(),
            journal: true,
            confirm_remove: true,
            prompt: default_prompt(),
            home: HomeConfig::default(),
        }
    }
}

/// A config file as written on disk: every key optional, so that merging
/// only overrides what a file actually sets
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    data_dir: Option<PathBuf>,
    storage: Option<StorageKind>,
    journal: Option<bool>,
    confirm_remove: Option<bool>,
    prompt: Option<String>,
    #[serde(default)]
    home: PartialHomeConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialHomeConfig {
    city: Option<String>,
    temperature: Option<i32>,
    built_using: Option<String>,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.dayplan/config.local.toml) > project (.dayplan/config.toml) > user (~/.dayplan/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".dayplan").join("config.toml");
            if user_config.exists() {
                config.merge(read_partial(&user_config)?);
            }
        }

        let project_config = Path::new(".dayplan").join("config.toml");
        if project_config.exists() {
            config.merge(read_partial(&project_config)?);
        }

        // Should be gitignored
        let local_config = Path::new(".dayplan").join("config.local.toml");
        if local_config.exists() {
            config.merge(read_partial(&local_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Merge a config file into this one; keys set in `other` win
    fn merge(&mut self, other: PartialConfig) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if let Some(storage) = other.storage {
            self.storage = storage;
        }
        if let Some(journal) = other.journal {
            self.journal = journal;
        }
        if let Some(confirm) = other.confirm_remove {
            self.confirm_remove = confirm;
        }
        if let Some(prompt) = other.prompt {
            self.prompt = prompt;
        }
        if let Some(city) = other.home.city {
            self.home.city = city;
        }
        if let Some(temperature) = other.home.temperature {
            self.home.temperature = temperature;
        }
        if let Some(built_using) = other.home.built_using {
            self.home.built_using = built_using;
        }
    }

    /// Resolve the data directory: explicit setting, else ~/.dayplan, else ./.dayplan
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .map(|h| h.join(".dayplan"))
            .unwrap_or_else(|| PathBuf::from(".dayplan"))
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.prompt.trim().is_empty() {
            errors.push(ValidationError {
                field: "prompt".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if self.home.city.trim().is_empty() {
            errors.push(ValidationError {
                field: "home.city".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: "data_dir".to_string(),
                    message: "Must not be an empty path".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn read_partial(path: &Path) -> Result<PartialConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}
