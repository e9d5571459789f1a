use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RelayError, Result};

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.pandotate.com/api/inference";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub url: String,
    pub api_key: Option<String>,
    /// Per-attempt timeout, seconds.
    pub timeout_secs: u64,
    pub slow_threshold_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
            slow_threshold_ms: 1500,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Defaults, then the first config file found, then the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from_dir(Path::new("."), |k| std::env::var(k).ok())
    }

    pub fn load_from_dir<F>(dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_content = match Self::find_config_file(dir) {
            Some(path) => {
                tracing::info!("Loading configuration file {}", path.display());
                Some(std::fs::read_to_string(path)?)
            }
            None => None,
        };
        Self::from_sources(file_content.as_deref(), env)
    }

    pub fn from_sources<F>(file_content: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings: Settings = match file_content {
            Some(content) => toml::from_str(content)
                .map_err(|e| RelayError::Config(format!("invalid config file: {}", e)))?,
            None => Settings::default(),
        };
        settings.apply_env(env)?;
        settings.upstream.url = settings.upstream.url.trim().to_string();
        Ok(settings)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("PANDOTATE_URL") {
            self.upstream.url = url;
        }
        if let Some(key) = env("PANDOTATE_API_KEY") {
            self.upstream.api_key = Some(key);
        }
        if let Some(v) = env("PANDOTATE_TIMEOUT") {
            self.upstream.timeout_secs = parse_env_number("PANDOTATE_TIMEOUT", &v)?;
        }
        if let Some(v) = env("SLOW_THRESHOLD_MS") {
            self.upstream.slow_threshold_ms = parse_env_number("SLOW_THRESHOLD_MS", &v)?;
        }
        if let Some(host) = env("RELAY_HOST") {
            self.server.host = host;
        }
        if let Some(v) = env("RELAY_PORT") {
            self.server.port = parse_env_number("RELAY_PORT", &v)?;
        }
        Ok(())
    }

    fn find_config_file(dir: &Path) -> Option<PathBuf> {
        let possible_names = ["custom-config.toml", "config.toml"];
        possible_names
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }
}

fn parse_env_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        RelayError::Config(format!("{} must be a valid integer, got: '{}'", name, value))
    })
}
