//! Startup settings, read from an optional JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::model::{snap_top_k, Dataset, MediaType, TOP_K_DEFAULT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub window_size: [f32; 2],
    pub default_media_type: MediaType,
    pub default_dataset: Dataset,
    pub default_top_k: u32,
    /// Delay before the mock backend answers.
    pub mock_latency_ms: u64,
    /// Share of mock searches that fail, 0.0 to 1.0.
    pub mock_failure_rate: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            window_size: [1400.0, 900.0],
            default_media_type: MediaType::default(),
            default_dataset: Dataset::default(),
            default_top_k: TOP_K_DEFAULT,
            mock_latency_ms: 300,
            mock_failure_rate: 0.0,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(data).map_err(|source| ConfigError::Parse {
            path: Default::default(),
            source,
        })?;
        config.validated()
    }

    /// Rejects values the UI cannot honor and snaps top-K onto the slider.
    fn validated(mut self) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&self.mock_failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "mock_failure_rate must be within 0..=1, got {}",
                self.mock_failure_rate
            )));
        }
        if self.window_size.iter().any(|v| !v.is_finite() || *v < 200.0) {
            return Err(ConfigError::Invalid(format!(
                "window_size must be at least 200x200, got {:?}",
                self.window_size
            )));
        }
        self.default_top_k = snap_top_k(self.default_top_k);
        Ok(self)
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.mock_latency(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = AppConfig::from_json(
            r#"{"default_media_type": "video", "default_dataset": "msr-vtt", "log_level": "debug", "default_top_k": 33}"#,
        )
        .unwrap();
        assert_eq!(config.default_media_type, MediaType::Video);
        assert_eq!(config.default_dataset, Dataset::MsrVtt);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
        assert_eq!(config.default_top_k, 30);
        assert_eq!(config.mock_latency_ms, 300);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AppConfig::from_json(r#"{"mock_failure_rate": 1.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"window_size": [100.0, 900.0]}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"default_dataset": "imagenet"}"#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/vbs-search.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/vbs-search.json"));
    }
}
