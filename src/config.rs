// src/config.rs
//! Configuration management with platform-specific storage

use crate::error::{LocationError, Result};
use crate::location::{GpsSource, Priority, UpdateConfig};
use crate::location::request::{DEFAULT_UPDATE_INTERVAL, FAST_UPDATE_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "location-display";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("LocationDisplay/{} (Rust location display)", env!("CARGO_PKG_VERSION")),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source_type: String, // "serial", "gpsd", "replay", "windows"
    pub serial_port: Option<String>,
    pub serial_baudrate: Option<u32>,
    pub gpsd_host: Option<String>,
    pub gpsd_port: Option<u16>,
    pub replay_file: Option<PathBuf>,
    pub replay_interval_ms: Option<u64>,
    pub windows_accuracy: Option<u32>,
    pub windows_interval: Option<u64>,
    pub update_interval_ms: u64,
    pub fastest_update_interval_ms: u64,
    pub high_accuracy: bool,
    pub geocoder: GeocoderConfig,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl AppConfig {
    /// Get platform-specific default configuration
    pub fn platform_default() -> Self {
        let source_type = if cfg!(windows) { "windows" } else { "gpsd" };

        Self {
            source_type: source_type.to_string(),
            serial_port: None,
            serial_baudrate: Some(9600),
            gpsd_host: Some("localhost".to_string()),
            gpsd_port: Some(2947),
            replay_file: None,
            replay_interval_ms: Some(1000),
            windows_accuracy: Some(10),
            windows_interval: Some(1),
            update_interval_ms: 1000 * DEFAULT_UPDATE_INTERVAL,
            fastest_update_interval_ms: 1000 * FAST_UPDATE_INTERVAL,
            high_accuracy: false,
            geocoder: GeocoderConfig::default(),
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::platform_default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| LocationError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| LocationError::Config(format!("Failed to parse config file {}: {}", path.display(), e)))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LocationError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(path, contents)
            .map_err(|e| LocationError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Per-user directory holding the config, permission and log files
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(windows)]
        {
            let appdata = std::env::var("APPDATA")
                .map_err(|_| LocationError::Config("APPDATA environment variable not set".to_string()))?;
            Ok(PathBuf::from(appdata).join(APP_DIR))
        }

        #[cfg(not(windows))]
        {
            let home = std::env::var("HOME")
                .map_err(|_| LocationError::Config("HOME environment variable not set".to_string()))?;
            Ok(PathBuf::from(home).join(".config").join(APP_DIR))
        }
    }

    /// Directory for the permission and log files: next to an explicit
    /// config file, otherwise [`Self::config_dir`]
    pub fn data_dir(config_path: Option<&Path>) -> Result<PathBuf> {
        match config_path.map(Path::parent) {
            Some(Some(parent)) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
            Some(_) => Ok(PathBuf::from(".")),
            None => Self::config_dir(),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Update configuration with new source settings
    pub fn update_source(&mut self, source_type: &str) {
        self.source_type = source_type.to_string();
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.source_type = "serial".to_string();
        self.serial_port = Some(port);
        self.serial_baudrate = Some(baudrate);
    }

    /// Update gpsd settings
    pub fn update_gpsd(&mut self, host: String, port: u16) {
        self.source_type = "gpsd".to_string();
        self.gpsd_host = Some(host);
        self.gpsd_port = Some(port);
    }

    /// Update replay settings
    pub fn update_replay(&mut self, path: PathBuf, interval_ms: u64) {
        self.source_type = "replay".to_string();
        self.replay_file = Some(path);
        self.replay_interval_ms = Some(interval_ms);
    }

    /// Update request parameters the screen starts with
    pub fn update_config(&self) -> UpdateConfig {
        UpdateConfig::new(
            self.update_interval_ms,
            self.fastest_update_interval_ms,
            Priority::from_high_accuracy(self.high_accuracy),
        )
    }

    /// Resolve the configured source into a connectable [`GpsSource`]
    pub fn to_source(&self) -> Result<GpsSource> {
        match self.source_type.as_str() {
            "serial" => {
                let port = self
                    .serial_port
                    .clone()
                    .ok_or_else(|| LocationError::Config("serial source needs a serial_port".to_string()))?;
                Ok(GpsSource::Serial {
                    port,
                    baudrate: self.serial_baudrate.unwrap_or(9600),
                })
            }
            "gpsd" => Ok(GpsSource::Gpsd {
                host: self.gpsd_host.clone().unwrap_or_else(|| "localhost".to_string()),
                port: self.gpsd_port.unwrap_or(2947),
            }),
            "replay" => {
                let path = self
                    .replay_file
                    .clone()
                    .ok_or_else(|| LocationError::Config("replay source needs a replay_file".to_string()))?;
                Ok(GpsSource::Replay {
                    path,
                    interval: Duration::from_millis(self.replay_interval_ms.unwrap_or(1000)),
                })
            }
            #[cfg(windows)]
            "windows" => Ok(GpsSource::Windows {
                accuracy: self.windows_accuracy.unwrap_or(10),
                interval: self.windows_interval.unwrap_or(1),
            }),
            #[cfg(not(windows))]
            "windows" => Err(LocationError::Config(
                "Windows Location Service is only available on Windows".to_string(),
            )),
            other => Err(LocationError::Config(format!("Unknown source type: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("location-display-config-{}-{}", std::process::id(), name))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        #[cfg(windows)]
        assert_eq!(config.source_type, "windows");

        #[cfg(not(windows))]
        assert_eq!(config.source_type, "gpsd");

        let update = config.update_config();
        assert_eq!(update, UpdateConfig::default());
    }

    #[test]
    fn test_update_serial() {
        let mut config = AppConfig::default();
        config.update_serial("/dev/ttyUSB0".to_string(), 115200);
        assert_eq!(config.source_type, "serial");

        match config.to_source().unwrap() {
            GpsSource::Serial { port, baudrate } => {
                assert_eq!(port, "/dev/ttyUSB0");
                assert_eq!(baudrate, 115200);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_serial_without_port_is_rejected() {
        let mut config = AppConfig::default();
        config.update_source("serial");
        assert!(matches!(config.to_source(), Err(LocationError::Config(_))));
    }

    #[test]
    fn test_unknown_source() {
        let mut config = AppConfig::default();
        config.update_source("carrier-pigeon");
        assert!(matches!(config.to_source(), Err(LocationError::Config(_))));
    }

    #[test]
    fn test_high_accuracy_sets_priority() {
        let mut config = AppConfig::default();
        config.high_accuracy = true;
        assert_eq!(config.update_config().priority, Priority::HighAccuracy);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load_from(&temp_path("missing")).unwrap();
        assert_eq!(config, AppConfig::platform_default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"source_type":"replay","replay_file":"/tmp/log.nmea","geocoder":{"enabled":false}}"#)
            .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(config.source_type, "replay");
        assert!(!config.geocoder.enabled);
        assert_eq!(config.geocoder.timeout_secs, 5);
        assert_eq!(config.update_interval_ms, 30_000);
        assert!(matches!(config.to_source().unwrap(), GpsSource::Replay { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("roundtrip");
        let mut config = AppConfig::default();
        config.update_gpsd("gps.local".to_string(), 3000);

        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded.gpsd_host.as_deref(), Some("gps.local"));
        assert_eq!(loaded.gpsd_port, Some(3000));
    }

    #[test]
    fn test_data_dir_follows_explicit_config_file() {
        let dir = AppConfig::data_dir(Some(Path::new("/srv/gps/location.json"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/gps"));

        let bare = AppConfig::data_dir(Some(Path::new("location.json"))).unwrap();
        assert_eq!(bare, PathBuf::from("."));
    }
}
