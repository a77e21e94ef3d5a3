//! Configuration file support for periodize.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/periodize/config.toml`.
//! The engine itself never reads it: the CLI turns it into
//! [`GenerationSettings`] and passes those in.

use crate::onerm::OneRmMethod;
use crate::rounding::DEFAULT_INCREMENT_KG;
use crate::{Equipment, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub equipment: EquipmentConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Equipment availability configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EquipmentConfig {
    #[serde(default = "default_equipment")]
    pub available: Vec<String>,
}

impl Default for EquipmentConfig {
    fn default() -> Self {
        Self {
            available: default_equipment(),
        }
    }
}

/// Generation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_rounding_increment")]
    pub rounding_increment: f64,

    #[serde(default = "default_deload_interval")]
    pub deload_interval: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_max_sets_per_day")]
    pub max_sets_per_day: u32,

    #[serde(default)]
    pub one_rm_method: OneRmMethod,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rounding_increment: default_rounding_increment(),
            deload_interval: default_deload_interval(),
            batch_size: default_batch_size(),
            max_sets_per_day: default_max_sets_per_day(),
            one_rm_method: OneRmMethod::default(),
        }
    }
}

/// Methodology template sources
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TemplatesConfig {
    /// Directory of additional `*.json` templates loaded next to the built-ins
    #[serde(default)]
    pub extra_dir: Option<PathBuf>,
}

/// Plain engine parameters derived from [`Config`]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationSettings {
    pub rounding_increment: f64,
    pub deload_interval: u32,
    pub max_sets_per_day: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            rounding_increment: DEFAULT_INCREMENT_KG,
            deload_interval: default_deload_interval(),
            max_sets_per_day: default_max_sets_per_day(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("periodize")
}

fn default_equipment() -> Vec<String> {
    Equipment::ALL.iter().map(|e| e.as_str().to_string()).collect()
}

fn default_rounding_increment() -> f64 {
    DEFAULT_INCREMENT_KG
}

fn default_deload_interval() -> u32 {
    4
}

fn default_batch_size() -> u32 {
    4
}

fn default_max_sets_per_day() -> u32 {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("periodize").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let g = &self.generation;
        if !(g.rounding_increment.is_finite() && g.rounding_increment > 0.0) {
            return Err(Error::Config(format!(
                "rounding_increment must be positive, got {}",
                g.rounding_increment
            )));
        }
        if g.deload_interval < 2 {
            return Err(Error::Config(format!(
                "deload_interval must be at least 2, got {}",
                g.deload_interval
            )));
        }
        if g.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        self.equipment_set()?;
        Ok(())
    }

    /// Parse the configured equipment names
    pub fn equipment_set(&self) -> Result<BTreeSet<Equipment>> {
        self.equipment
            .available
            .iter()
            .map(|name| {
                name.parse::<Equipment>()
                    .map_err(|e| Error::Config(format!("equipment: {e}")))
            })
            .collect()
    }

    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            rounding_increment: self.generation.rounding_increment,
            deload_interval: self.generation.deload_interval,
            max_sets_per_day: self.generation.max_sets_per_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.equipment.available.len(), Equipment::ALL.len());
        assert_eq!(config.generation.rounding_increment, 2.5);
        assert_eq!(config.generation.deload_interval, 4);
        assert_eq!(config.generation.batch_size, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.generation.deload_interval,
            parsed.generation.deload_interval
        );
        assert_eq!(config.equipment.available, parsed.equipment.available);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[generation]
rounding_increment = 1.25
one_rm_method = "epley"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.rounding_increment, 1.25);
        assert_eq!(config.generation.one_rm_method, OneRmMethod::Epley);
        assert_eq!(config.generation.deload_interval, 4); // default
        assert_eq!(config.settings().rounding_increment, 1.25);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[generation]\ndeload_interval = 1\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        std::fs::write(&path, "[equipment]\navailable = [\"hovercraft\"]\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.equipment.available = vec!["barbell".into(), "rack".into(), "bench".into()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        let equipment = loaded.equipment_set().unwrap();
        assert_eq!(equipment.len(), 3);
        assert!(equipment.contains(&Equipment::Rack));
    }
}
