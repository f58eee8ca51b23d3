//! CLI configuration.
//!
//! A small YAML file under the platform config dir, with environment
//! overrides applied on top. Missing file means defaults; a malformed
//! file is an error so a typo does not silently disable rendering.

use etcetera::{choose_app_strategy, AppStrategy, AppStrategyArgs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};
use thiserror::Error;

pub static APP_STRATEGY: LazyLock<AppStrategyArgs> = LazyLock::new(|| AppStrategyArgs {
    top_level_domain: "io".to_string(),
    author: "cascade".to_string(),
    app_name: "cascade".to_string(),
});

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Malformed(#[from] serde_yaml::Error),
}

/// Color theme for rendered Markdown.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    Ansi,
}

impl TryFrom<&str> for Theme {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "ansi" => Ok(Theme::Ansi),
            _ => Err(format!("invalid theme: {} (expected light, dark, or ansi)", value)),
        }
    }
}

impl Theme {
    /// The bat theme this maps onto.
    pub fn as_bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
            Theme::Ansi => "base16",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme used for Markdown rendering.
    pub theme: Theme,
    /// Whether to render Markdown at all; false falls back to plain text.
    pub markdown: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            markdown: true,
        }
    }
}

static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    /// The process-wide config: file, then environment overrides.
    ///
    /// A malformed file is reported once on stderr and replaced with
    /// defaults; the CLI should keep working even with a broken config.
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(|| {
            let mut config = match Self::load(&Self::path()) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("Warning: {err}, using defaults");
                    Config::default()
                }
            };
            config.apply_env_overrides();
            config
        })
    }

    /// Default location: `<config dir>/cascade/config.yaml`.
    pub fn path() -> PathBuf {
        choose_app_strategy(APP_STRATEGY.clone())
            .map(|strategy| strategy.config_dir().join("config.yaml"))
            .unwrap_or_else(|_| PathBuf::from("config.yaml"))
    }

    /// Load from a file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_yaml::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("CASCADE_THEME") {
            match Theme::try_from(value.as_str()) {
                Ok(theme) => self.theme = theme,
                Err(err) => eprintln!("Warning: CASCADE_THEME: {err}"),
            }
        }
        if let Ok(value) = std::env::var("CASCADE_MARKDOWN") {
            self.markdown = !matches!(value.as_str(), "0" | "false" | "no");
        }
    }
}
