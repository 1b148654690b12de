use crate::core::log::LogLevel;
use crate::core::rateio::Recalculation;
use crate::core::unit::UnitType;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_MS: u64 = 7000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CalculatorConfig {
    #[serde(default)]
    pub recalculation: Recalculation,
    #[serde(default)]
    pub default_type: UnitType,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub calculator: CalculatorConfig,
    #[serde(default)]
    pub log_level: LogLevel,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "rateio", "rateio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("br", "rateio", "rateio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api:
  base_url: "https://condominio.example.com"
  timeout_ms: 3000
calculator:
  recalculation: on_submit
  default_type: LOJA
data_path: "/tmp/rateio"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "https://condominio.example.com");
        assert_eq!(config.api.timeout_ms, 3000);
        assert_eq!(config.calculator.recalculation, Recalculation::OnSubmit);
        assert_eq!(config.calculator.default_type, UnitType::Store);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.data_path.as_deref(), Some("/tmp/rateio"));
        assert_eq!(config.data_path().unwrap(), PathBuf::from("/tmp/rateio"));
    }

    #[test]
    fn test_config_defaults() {
        let yaml_str = r#"
api:
  base_url: "http://example.com"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.api.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.calculator.recalculation, Recalculation::Reactive);
        assert_eq!(config.calculator.default_type, UnitType::Apartment);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_load_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from_path(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
