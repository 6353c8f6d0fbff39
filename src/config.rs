use crate::analysis::LevelStrategy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pypeline.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub levels: LevelsConfig,
    pub settings: SettingsConfig,
    pub output: OutputConfig,
}

/// Project directory scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Source file extension, without the dot
    pub extension: String,
    /// Descend into subdirectories
    pub recursive: bool,
    pub exclude: Vec<String>,
    pub follow_links: bool,
}

/// Import level assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsConfig {
    pub strategy: LevelMode,
    /// Only used by the legacy strategy
    pub max_visits_per_file: usize,
}

/// Annotation settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub file_name: String,
    /// Fail a load when a recorded source file is gone
    pub strict: bool,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub direction: String,
}

/// How import levels are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LevelMode {
    #[default]
    BreadthFirst,
    Legacy,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Mermaid,
    Dot,
}

impl OutputFormat {
    /// Parse a CLI format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "mermaid" | "mmd" => Some(OutputFormat::Mermaid),
            "dot" => Some(OutputFormat::Dot),
            _ => None,
        }
    }
}

impl LevelMode {
    /// Parse a CLI strategy name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "breadth-first" | "bfs" => Some(LevelMode::BreadthFirst),
            "legacy" => Some(LevelMode::Legacy),
            _ => None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            recursive: false,
            exclude: vec![
                "__pycache__/**".to_string(),
                ".venv/**".to_string(),
                "venv/**".to_string(),
                ".git/**".to_string(),
            ],
            follow_links: true,
        }
    }
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            strategy: LevelMode::default(),
            max_visits_per_file: 64,
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            file_name: "pypeline.json".to_string(),
            strict: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            direction: "LR".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("ignoring config {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence). Unknown
    /// format or strategy names are rejected.
    pub fn merge_cli(
        &mut self,
        recursive: bool,
        exclude: Vec<String>,
        format: Option<String>,
        strategy: Option<String>,
    ) -> Result<()> {
        if recursive {
            self.scan.recursive = true;
        }

        if !exclude.is_empty() {
            self.scan.exclude.extend(exclude);
        }

        if let Some(name) = format {
            self.output.format = OutputFormat::from_name(&name).ok_or_else(|| {
                Error::config_validation(format!(
                    "unknown output format '{}' (expected text, json, mermaid or dot)",
                    name
                ))
            })?;
        }

        if let Some(name) = strategy {
            self.levels.strategy = LevelMode::from_name(&name).ok_or_else(|| {
                Error::config_validation(format!(
                    "unknown level strategy '{}' (expected breadth-first or legacy)",
                    name
                ))
            })?;
        }

        Ok(())
    }

    /// The level strategy these settings describe
    pub fn level_strategy(&self) -> LevelStrategy {
        match self.levels.strategy {
            LevelMode::BreadthFirst => LevelStrategy::BreadthFirst,
            LevelMode::Legacy => LevelStrategy::Legacy {
                max_visits_per_file: self.levels.max_visits_per_file,
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scan.extension.is_empty() {
            return Err(Error::config_validation("scan extension must not be empty"));
        }

        if self.scan.extension.starts_with('.') {
            return Err(Error::config_validation(
                "scan extension is given without the leading dot",
            ));
        }

        for pattern in &self.scan.exclude {
            glob::Pattern::new(pattern)?;
        }

        if self.levels.max_visits_per_file == 0 {
            return Err(Error::config_validation("max_visits_per_file must be at least 1"));
        }

        if self.settings.file_name.trim().is_empty() {
            return Err(Error::config_validation("settings file_name must not be empty"));
        }

        if !matches!(self.output.direction.as_str(), "TB" | "TD" | "BT" | "LR" | "RL") {
            return Err(Error::config_validation(format!(
                "unknown diagram direction '{}'",
                self.output.direction
            )));
        }

        Ok(())
    }
}
