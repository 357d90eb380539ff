//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Map display configuration.
    #[serde(default)]
    pub map: MapConfig,
    /// Geolocation configuration.
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// Session cache configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Translation configuration.
    #[serde(default)]
    pub translation: TranslationSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Map display configuration.
///
/// The default center points at Tacna, used when a visitor cannot be
/// located.
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Latitude of the fallback map center.
    #[serde(default = "default_map_latitude")]
    pub default_latitude: f64,
    /// Longitude of the fallback map center.
    #[serde(default = "default_map_longitude")]
    pub default_longitude: f64,
    /// Zoom level used with the fallback center.
    #[serde(default = "default_map_zoom")]
    pub default_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: default_map_latitude(),
            default_longitude: default_map_longitude(),
            default_zoom: default_map_zoom(),
        }
    }
}

/// Geolocation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeolocationConfig {
    /// IP lookup endpoint used to approximate a visitor position.
    #[serde(default = "default_geolocation_url")]
    pub provider_url: String,
    /// Seconds to wait for the locator before giving up.
    #[serde(default = "default_geolocation_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            provider_url: default_geolocation_url(),
            timeout_seconds: default_geolocation_timeout(),
        }
    }
}

/// Session cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds of inactivity after which a session entry is dropped.
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
        }
    }
}

/// Translation configuration as read from files and environment.
///
/// The translation service interprets `provider` and falls back to its
/// own defaults for anything left unset.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationSettings {
    /// Whether the translation endpoint is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Provider name (`openai` or `ollama`).
    #[serde(default = "default_translation_provider")]
    pub provider: String,
    /// API key for hosted providers.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL override for self-hosted providers.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Seconds a cached translation stays valid.
    #[serde(default = "default_translation_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: default_translation_provider(),
            api_key: None,
            model: None,
            base_url: None,
            cache_ttl_seconds: default_translation_cache_ttl(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_map_latitude() -> f64 {
    -18.0066
}

const fn default_map_longitude() -> f64 {
    -70.2463
}

const fn default_map_zoom() -> u8 {
    13
}

fn default_geolocation_url() -> String {
    "http://ip-api.com/json".to_string()
}

const fn default_geolocation_timeout() -> u64 {
    10
}

const fn default_session_ttl() -> u64 {
    3600
}

fn default_translation_provider() -> String {
    "openai".to_string()
}

const fn default_translation_cache_ttl() -> u64 {
    3600
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PULSO_ENV`)
    /// 3. Environment variables with `PULSO_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("PULSO_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PULSO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PULSO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
