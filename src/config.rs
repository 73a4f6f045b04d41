use serde::Deserialize;

use crate::status::history::DEFAULT_CAPACITY;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            history_capacity: default_history_capacity(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_history_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file if it exists; otherwise run with defaults.
    pub fn load_or_default(path: &str) -> eyre::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> eyre::Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(eyre::eyre!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(eyre::eyre!("api.timeout_secs must be positive"));
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(eyre::eyre!("watch.poll_interval_ms must be positive"));
        }
        if self.watch.history_capacity == 0 {
            return Err(eyre::eyre!("watch.history_capacity must be positive"));
        }
        Ok(())
    }
}
