use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub network: NetworkConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the hosted backend, without the `/rest/v1` suffix.
    pub url: String,
    /// Anonymous or service key sent as `apikey` and bearer token.
    pub api_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present - production uses env vars directly)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("venue-availability");

        let defaults = BackendConfig::default();
        let builder = Config::builder()
            // 1. Default values
            .set_default("backend.url", defaults.url)?
            .set_default("backend.api_key", defaults.api_key)?
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            .set_default("watch.interval_secs", 60)?

            // 2. Local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. User config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Environment variables (CGI__BACKEND__URL=...)
            .add_source(Environment::with_prefix("CGI").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}
