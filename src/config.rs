use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{ArtisticStyle, AspectRatio, GenerationSettings, ImageQuality};

/// Environment variables checked for the API key, in order
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(skip)]
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    /// Key from a paid project, used for 2K/4K output
    #[serde(default)]
    pub high_tier_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_standard_model")]
    pub standard_model: String,
    #[serde(default = "default_high_tier_model")]
    pub high_tier_model: String,
}

/// Initial compose settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_style")]
    pub style: ArtisticStyle,
    #[serde(default = "default_lighting")]
    pub lighting: u8,
    #[serde(default = "default_complexity")]
    pub complexity: u8,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: AspectRatio,
    #[serde(default = "default_quality")]
    pub quality: ImageQuality,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub auto_download: bool,
    #[serde(default = "default_display")]
    pub display: DisplayMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Terminal,
    None,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Terminal => "terminal",
            DisplayMode::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "terminal" => Some(DisplayMode::Terminal),
            "none" => Some(DisplayMode::None),
            _ => None,
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_standard_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_high_tier_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

fn default_style() -> ArtisticStyle {
    GenerationSettings::default().style
}

fn default_lighting() -> u8 {
    GenerationSettings::default().lighting
}

fn default_complexity() -> u8 {
    GenerationSettings::default().complexity
}

fn default_aspect_ratio() -> AspectRatio {
    GenerationSettings::default().aspect_ratio
}

fn default_quality() -> ImageQuality {
    GenerationSettings::default().quality
}

fn default_output_directory() -> String {
    "./p2l-output".to_string()
}

fn default_true() -> bool {
    true
}

fn default_display() -> DisplayMode {
    DisplayMode::Terminal
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            high_tier_key: None,
            base_url: default_base_url(),
            standard_model: default_standard_model(),
            high_tier_model: default_high_tier_model(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            lighting: default_lighting(),
            complexity: default_complexity(),
            aspect_ratio: default_aspect_ratio(),
            quality: default_quality(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            auto_download: true,
            display: DisplayMode::Terminal,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            defaults: DefaultsConfig::default(),
            output: OutputConfig::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "p2l", "p2l-studio")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Load config from the platform location, creating it on first run
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_dir()?.join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_key(env_api_key());
        Ok(config)
    }

    /// Load config from a file, writing defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&content).context("Failed to parse config file")?;
            config.config_path = path.to_path_buf();
            config.defaults.lighting = config.defaults.lighting.min(10);
            config.defaults.complexity = config.defaults.complexity.min(10);
            Ok(config)
        } else {
            let config = Config {
                config_path: path.to_path_buf(),
                ..Config::default()
            };
            config.save()?;
            tracing::info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Environment variable takes precedence over the file
    pub fn apply_env_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api.key = Some(key);
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get API key (from config or environment)
    pub fn api_key(&self) -> Option<&str> {
        self.api.key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn high_tier_key(&self) -> Option<&str> {
        self.api.high_tier_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Compose settings the studio starts with
    pub fn initial_settings(&self) -> GenerationSettings {
        GenerationSettings::default()
            .with_style(self.defaults.style)
            .with_lighting(self.defaults.lighting)
            .with_complexity(self.defaults.complexity)
            .with_aspect_ratio(self.defaults.aspect_ratio)
            .with_quality(self.defaults.quality)
    }

    /// Set a config value by key path (e.g., "api.key", "defaults.style")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.key" => self.api.key = optional(value),
            "api.high_tier_key" => self.api.high_tier_key = optional(value),
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.standard_model" => self.api.standard_model = value.to_string(),
            "api.high_tier_model" => self.api.high_tier_model = value.to_string(),
            "defaults.style" => self.defaults.style = value.parse()?,
            "defaults.lighting" => self.defaults.lighting = parse_level(value)?,
            "defaults.complexity" => self.defaults.complexity = parse_level(value)?,
            "defaults.aspect_ratio" => self.defaults.aspect_ratio = value.parse()?,
            "defaults.quality" => self.defaults.quality = value.parse()?,
            "output.directory" => self.output.directory = value.to_string(),
            "output.auto_download" => {
                self.output.auto_download = value.parse().context("Invalid boolean value")?;
            }
            "output.display" => {
                self.output.display = DisplayMode::parse(value)
                    .context("Invalid display mode. Valid values: terminal, none")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            // Mask API keys
            "api.key" => self.api_key().map(|_| "****".to_string()),
            "api.high_tier_key" => self.high_tier_key().map(|_| "****".to_string()),
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.standard_model" => Some(self.api.standard_model.clone()),
            "api.high_tier_model" => Some(self.api.high_tier_model.clone()),
            "defaults.style" => Some(self.defaults.style.to_string()),
            "defaults.lighting" => Some(self.defaults.lighting.to_string()),
            "defaults.complexity" => Some(self.defaults.complexity.to_string()),
            "defaults.aspect_ratio" => Some(self.defaults.aspect_ratio.to_string()),
            "defaults.quality" => Some(self.defaults.quality.to_string()),
            "output.directory" => Some(self.output.directory.clone()),
            "output.auto_download" => Some(self.output.auto_download.to_string()),
            "output.display" => Some(self.output.display.as_str().to_string()),
            _ => None,
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "api.key",
            "api.high_tier_key",
            "api.base_url",
            "api.standard_model",
            "api.high_tier_model",
            "defaults.style",
            "defaults.lighting",
            "defaults.complexity",
            "defaults.aspect_ratio",
            "defaults.quality",
            "output.directory",
            "output.auto_download",
            "output.display",
        ]
    }
}

/// First non-empty API key found in the environment
pub fn env_api_key() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_level(value: &str) -> Result<u8> {
    let level: u8 = value.trim().parse().context("Level must be a number from 0 to 10")?;
    if level > 10 {
        anyhow::bail!("Level must be a number from 0 to 10");
    }
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.api.standard_model, "gemini-2.5-flash-image");
        assert_eq!(config.api.high_tier_model, "gemini-3-pro-image-preview");
        assert_eq!(config.initial_settings(), GenerationSettings::default());
    }

    #[test]
    fn values_round_trip_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::load_from(&path).unwrap();
        config.set("defaults.style", "gta-6").unwrap();
        config.set("defaults.quality", "4K").unwrap();
        config.set("defaults.aspect_ratio", "16:9").unwrap();
        config.set("defaults.lighting", "3").unwrap();
        config.set("api.high_tier_key", "paid").unwrap();
        config.save().unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        let settings = reloaded.initial_settings();
        assert_eq!(settings.style, ArtisticStyle::Gta6);
        assert_eq!(settings.quality, ImageQuality::FourK);
        assert_eq!(settings.aspect_ratio, AspectRatio::Landscape);
        assert_eq!(settings.lighting, 3);
        assert_eq!(reloaded.high_tier_key(), Some("paid"));
        assert_eq!(reloaded.get("api.high_tier_key").as_deref(), Some("****"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        assert!(config.set("defaults.lighting", "11").is_err());
        assert!(config.set("defaults.aspect_ratio", "21:9").is_err());
        assert!(config.set("defaults.style", "watercolour").is_err());
        assert!(config.set("output.display", "viewer").is_err());
        assert!(config.set("tui.theme", "dark").is_err());
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut config = Config::default();
        config.set("api.key", "from-file").unwrap();

        config.apply_env_key(Some(" ".into()));
        assert_eq!(config.api_key(), Some("from-file"));

        config.apply_env_key(Some("from-env".into()));
        assert_eq!(config.api_key(), Some("from-env"));
    }

    #[test]
    fn every_key_is_readable() {
        let config = Config::default();
        for key in Config::keys() {
            if !key.starts_with("api.") || !key.ends_with("key") {
                assert!(config.get(key).is_some(), "{} has no value", key);
            }
        }
    }
}
