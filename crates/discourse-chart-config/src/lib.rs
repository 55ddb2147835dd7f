use discourse_chart_engine::{ChartSettings, TemplateNode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config at {config_path} defines no chart columns")]
    NoColumns { config_path: PathBuf },
}

/// User settings for charting. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Leaf column names of the chart template, in display order.
    pub columns: Vec<String>,
    /// Columns that are often empty on purpose and never offer a missing marker.
    pub auto_missing_columns: Vec<String>,
    pub max_ribbon_context: usize,
    pub rows_in_sentence_limit: usize,
    pub right_to_left: bool,
    /// Where notes from rows deleted by the consistency sweep are saved. Defaults to
    /// `SavedNotes.txt` beside the charted text.
    pub notes_recovery_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = ChartSettings::default();
        Self {
            columns: ["Prenuclear", "Subject", "Verb", "Object", "Postnuclear"]
                .into_iter()
                .map(String::from)
                .collect(),
            auto_missing_columns: settings.auto_missing_columns,
            max_ribbon_context: settings.max_ribbon_context,
            rows_in_sentence_limit: settings.rows_in_sentence_limit,
            right_to_left: settings.right_to_left,
            notes_recovery_path: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if config.columns.is_empty() {
            return Err(ConfigError::NoColumns {
                config_path: config_path.to_path_buf(),
            });
        }

        // Expand shell variables and tilde in the recovery path
        config.notes_recovery_path = config
            .notes_recovery_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The saved config, or the defaults when there is none yet.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/discourse-chart");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn chart_settings(&self) -> ChartSettings {
        ChartSettings {
            max_ribbon_context: self.max_ribbon_context,
            rows_in_sentence_limit: self.rows_in_sentence_limit,
            auto_missing_columns: self.auto_missing_columns.clone(),
            right_to_left: self.right_to_left,
        }
    }

    pub fn template(&self) -> TemplateNode {
        TemplateNode::flat(self.columns.as_slice())
    }

    /// Recovery file for notes, falling back to `SavedNotes.txt` next to `text_path`.
    pub fn notes_recovery_path_for(&self, text_path: &Path) -> PathBuf {
        match &self.notes_recovery_path {
            Some(path) => path.clone(),
            None => text_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("SavedNotes.txt"),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
