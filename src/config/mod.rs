//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/lunatrack/config.toml
//!
//! API keys may also come from the environment, which wins over the file.

pub mod defaults;

use crate::constants::api::{GEOCODE_URL, IP_API_URL, MOON_API_HOST, MOON_API_URL};
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Starting location and geolocation settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Moon-phase API settings
    #[serde(default)]
    pub moon: MoonConfig,

    /// Geocoding API settings
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude the session starts at
    #[serde(default = "default_lat")]
    pub lat: f64,

    /// Longitude the session starts at
    #[serde(default = "default_lon")]
    pub lon: f64,

    /// Display name for the starting location
    #[serde(default = "default_city")]
    pub city: String,

    /// If false, current-location lookups fail as unsupported
    #[serde(default = "default_true")]
    pub geolocation: bool,

    /// IP geolocation endpoint used to locate this host
    #[serde(default = "default_ip_api_url")]
    pub ip_api_url: String,
}

/// Moon API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonConfig {
    #[serde(default = "default_moon_url")]
    pub base_url: String,

    /// Value of the x-rapidapi-host header
    #[serde(default = "default_moon_host")]
    pub host: String,

    /// Wait before the single retry after a 429, milliseconds
    #[serde(default = "default_throttle_backoff")]
    pub throttle_backoff_ms: u64,

    /// Drop the displayed moon data as soon as a refresh starts
    #[serde(default)]
    pub clear_stale_on_refresh: bool,
}

/// Geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    #[serde(default = "default_geocode_url")]
    pub base_url: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// RapidAPI key for the moon-phase service
    #[serde(default)]
    pub moon: String,

    /// geocode.maps.co key
    #[serde(default)]
    pub geocode: String,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_lat() -> f64 {
    DEFAULT_LAT
}
fn default_lon() -> f64 {
    DEFAULT_LON
}
fn default_city() -> String {
    DEFAULT_CITY.to_string()
}
fn default_true() -> bool {
    true
}
fn default_ip_api_url() -> String {
    IP_API_URL.to_string()
}
fn default_moon_url() -> String {
    MOON_API_URL.to_string()
}
fn default_moon_host() -> String {
    MOON_API_HOST.to_string()
}
fn default_throttle_backoff() -> u64 {
    DEFAULT_THROTTLE_BACKOFF_MS
}
fn default_geocode_url() -> String {
    GEOCODE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            lat: default_lat(),
            lon: default_lon(),
            city: default_city(),
            geolocation: true,
            ip_api_url: default_ip_api_url(),
        }
    }
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            base_url: default_moon_url(),
            host: default_moon_host(),
            throttle_backoff_ms: default_throttle_backoff(),
            clear_stale_on_refresh: false,
        }
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocode_url(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load the file alone, without env overrides
    ///
    /// Creates default config if file doesn't exist
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        let config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Override API keys from environment lookups
    ///
    /// Empty values are ignored so a blank variable cannot erase a key
    /// from the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(MOON_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.api_keys.moon = key;
        }
        if let Some(key) = lookup(GEOCODE_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.api_keys.geocode = key;
        }
    }

    /// Log a warning for each missing API key
    ///
    /// Requests still go out with an empty key and fail upstream.
    pub fn warn_missing_keys(&self) {
        if self.api_keys.moon.is_empty() {
            warn!("No moon API key configured (api_keys.moon or {})", MOON_API_KEY_ENV);
        }
        if self.api_keys.geocode.is_empty() {
            warn!(
                "No geocode API key configured (api_keys.geocode or {})",
                GEOCODE_API_KEY_ENV
            );
        }
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["location", "lat"] => Some(self.location.lat.to_string()),
            ["location", "lon"] => Some(self.location.lon.to_string()),
            ["location", "city"] => Some(self.location.city.clone()),
            ["location", "geolocation"] => Some(self.location.geolocation.to_string()),
            ["location", "ip_api_url"] => Some(self.location.ip_api_url.clone()),

            ["moon", "base_url"] => Some(self.moon.base_url.clone()),
            ["moon", "host"] => Some(self.moon.host.clone()),
            ["moon", "throttle_backoff_ms"] => Some(self.moon.throttle_backoff_ms.to_string()),
            ["moon", "clear_stale_on_refresh"] => {
                Some(self.moon.clear_stale_on_refresh.to_string())
            }

            ["geocode", "base_url"] => Some(self.geocode.base_url.clone()),

            ["api_keys", "moon"] => Some(self.api_keys.moon.clone()),
            ["api_keys", "geocode"] => Some(self.api_keys.geocode.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["location", "lat"] => {
                let lat: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid latitude value: {}", value))
                })?;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(Error::Config(format!("Latitude out of range: {}", value)));
                }
                self.location.lat = lat;
            }
            ["location", "lon"] => {
                let lon: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid longitude value: {}", value))
                })?;
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(Error::Config(format!("Longitude out of range: {}", value)));
                }
                self.location.lon = lon;
            }
            ["location", "city"] => {
                self.location.city = value.to_string();
            }
            ["location", "geolocation"] => {
                self.location.geolocation = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }
            ["location", "ip_api_url"] => {
                self.location.ip_api_url = value.to_string();
            }

            ["moon", "base_url"] => {
                self.moon.base_url = value.to_string();
            }
            ["moon", "host"] => {
                self.moon.host = value.to_string();
            }
            ["moon", "throttle_backoff_ms"] => {
                self.moon.throttle_backoff_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid backoff value: {}", value))
                })?;
            }
            ["moon", "clear_stale_on_refresh"] => {
                self.moon.clear_stale_on_refresh = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }

            ["geocode", "base_url"] => {
                self.geocode.base_url = value.to_string();
            }

            ["api_keys", "moon"] => {
                self.api_keys.moon = value.to_string();
            }
            ["api_keys", "geocode"] => {
                self.api_keys.geocode = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "location.lat",
            "location.lon",
            "location.city",
            "location.geolocation",
            "location.ip_api_url",
            "moon.base_url",
            "moon.host",
            "moon.throttle_backoff_ms",
            "moon.clear_stale_on_refresh",
            "geocode.base_url",
            "api_keys.moon",
            "api_keys.geocode",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
