//! Configuration management for the trendline editor.
//!
//! Loads configuration from TOML files. Every section is optional; missing
//! sections and keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Directory name used under the platform config/data directories.
pub const APP_DIR: &str = "trendline";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub data: DataConfig,
    pub api: ApiConfig,
    pub chart: ChartConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default locations.
    ///
    /// Searches in order:
    /// 1. `./config.toml`
    /// 2. `~/.config/trendline/config.toml`
    ///
    /// Returns default config if no file found.
    pub fn load_default() -> Self {
        if let Ok(config) = Self::load(Self::default_path()) {
            return config;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join("config.toml");
            if let Ok(config) = Self::load(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Save configuration to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from("config.toml")
    }
}

/// General application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Trading symbol to load on startup.
    pub default_symbol: String,
    /// Symbols offered by the symbol switcher.
    pub symbols: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_symbol: "BTCUSDT".to_string(),
            symbols: [
                "BTCUSDT", "ETHUSDT", "ADAUSDT", "DOTUSDT", "LINKUSDT", "MATICUSDT", "SOLUSDT",
                "AVAXUSDT",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl GeneralConfig {
    /// Whether the symbol switcher offers `symbol`. An empty list accepts any symbol.
    pub fn is_known_symbol(&self, symbol: &str) -> bool {
        self.symbols.is_empty() || self.symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol))
    }
}

/// Which upstream provides price bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// Binance public klines endpoint.
    #[default]
    Binance,
    /// The backend `/api/ohlc` endpoint.
    Backend,
    /// Locally generated random walk.
    Synthetic,
}

/// Market data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSourceKind,
    /// Binance REST base URL.
    pub binance_url: String,
    /// Kline interval requested from Binance.
    pub interval: String,
    /// Number of bars requested per refresh.
    pub limit: u32,
    /// Seconds between price refreshes.
    pub refresh_interval_secs: u64,
    /// Fall back to synthetic bars when the upstream fails.
    pub synthetic_fallback: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Binance,
            binance_url: "https://api.binance.com".to_string(),
            interval: "5m".to_string(),
            limit: 100,
            refresh_interval_secs: 30,
            synthetic_fallback: true,
        }
    }
}

impl DataConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

/// Backend REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the trendline backend.
    pub base_url: String,
    /// Mirror local trendline mutations to the backend.
    pub remote_sync: bool,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            remote_sync: false,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Chart geometry and interaction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Plot area width in pixels.
    pub width: f64,
    /// Plot area height in pixels.
    pub height: f64,
    /// Radius in pixels within which a pointer hits a trendline endpoint.
    pub hit_tolerance_px: f64,
    /// Fraction of the close range added above and below the price axis.
    pub price_padding: f64,
    /// Color assigned to newly drawn trendlines.
    pub default_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            hit_tolerance_px: 8.0,
            price_padding: 0.1,
            default_color: "#2962FF".to_string(),
        }
    }
}

/// Local trendline storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding stored entries.
    /// Defaults to ~/.local/share/trendline
    pub dir: Option<PathBuf>,
    /// Key of the entry holding the trendline array.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: "tradingTrendlines".to_string(),
        }
    }
}

impl StorageConfig {
    /// Get the storage directory, using default if not specified.
    pub fn get_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.default_symbol, "BTCUSDT");
        assert_eq!(config.general.symbols.len(), 8);
        assert_eq!(config.data.source, DataSourceKind::Binance);
        assert_eq!(config.data.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.chart.hit_tolerance_px, 8.0);
        assert_eq!(config.storage.key, "tradingTrendlines");
        assert!(!config.api.remote_sync);
    }

    #[test]
    fn test_known_symbols() {
        let mut general = GeneralConfig::default();
        assert!(general.is_known_symbol("ETHUSDT"));
        assert!(general.is_known_symbol("adausdt"));
        assert!(!general.is_known_symbol("DOGEUSDT"));

        general.symbols.clear();
        assert!(general.is_known_symbol("DOGEUSDT"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[general]
default_symbol = "ETHUSDT"

[data]
source = "synthetic"
refresh_interval_secs = 5

[chart]
hit_tolerance_px = 12.0

[api]
remote_sync = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.general.default_symbol, "ETHUSDT");
        assert_eq!(config.data.source, DataSourceKind::Synthetic);
        assert_eq!(config.data.refresh_interval_secs, 5);
        assert_eq!(config.chart.hit_tolerance_px, 12.0);
        assert!(config.api.remote_sync);
        // Untouched keys keep their defaults
        assert_eq!(config.chart.default_color, "#2962FF");
        assert_eq!(config.data.limit, 100);
    }

    #[test]
    fn test_zero_refresh_interval_is_clamped() {
        let config: Config = toml::from_str("[data]\nrefresh_interval_secs = 0\n").unwrap();
        assert_eq!(config.data.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.general.default_symbol = "SOLUSDT".to_string();
        config.storage.dir = Some(dir.path().join("store"));
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.general.default_symbol, "SOLUSDT");
        assert_eq!(loaded.storage.get_dir(), dir.path().join("store"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[general\ndefault_symbol = ").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::ParseError(_))));
    }
}
